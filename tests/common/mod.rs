//! Wire fixtures shared by the integration suites.

#![allow(dead_code)]

use serde_json::{json, Value};

pub fn position(id: u64, symbol: &str) -> Value {
    json!({
        "cost_basis": 1014.5,
        "date_acquired": "2019-01-31T17:05:05.000Z",
        "id": id,
        "quantity": 10.00000000,
        "symbol": symbol
    })
}

fn order_base(id: u64, class: &str, order_type: &str) -> Value {
    json!({
        "id": id,
        "type": order_type,
        "symbol": "SPY",
        "quantity": 1.00000000,
        "status": "filled",
        "duration": "day",
        "avg_fill_price": 1.2,
        "exec_quantity": 1.00000000,
        "last_fill_price": 1.2,
        "last_fill_quantity": 1.00000000,
        "remaining_quantity": 0.00000000,
        "create_date": "2024-01-05T15:00:00.000Z",
        "transaction_date": "2024-01-05T15:00:01.000Z",
        "class": class
    })
}

pub fn equity_market(id: u64) -> Value {
    let mut order = order_base(id, "equity", "market");
    order["side"] = json!("buy");
    order
}

pub fn option_stop(id: u64) -> Value {
    let mut order = order_base(id, "option", "stop");
    order["side"] = json!("sell_to_close");
    order["stop_price"] = json!(0.85);
    order["option_symbol"] = json!("SPY240119P00440000");
    order
}

pub fn multileg_leg(id: u64, order_type: &str, option_symbol: &str, side: &str) -> Value {
    let mut leg = order_base(id, "option", order_type);
    leg["price"] = json!(1.25);
    leg["side"] = json!(side);
    leg["option_symbol"] = json!(option_symbol);
    leg
}

pub fn multileg_debit(id: u64, legs: Vec<Value>) -> Value {
    let mut order = order_base(id, "multileg", "debit");
    order["price"] = json!(1.25);
    order["side"] = json!("buy");
    order["num_legs"] = json!(legs.len());
    order["strategy"] = json!("spread");
    order["leg"] = Value::Array(legs);
    order
}

pub fn vertical_spread(id: u64) -> Value {
    multileg_debit(
        id,
        vec![
            multileg_leg(id + 1, "debit", "SPY240119C00450000", "buy_to_open"),
            multileg_leg(id + 2, "debit", "SPY240119C00460000", "sell_to_open"),
        ],
    )
}

pub fn option_quote(with_greeks: bool) -> Value {
    let mut quote = json!({
        "symbol": "SPY240119C00450000",
        "description": "SPY Jan 19 2024 $450.00 Call",
        "exch": "Z",
        "type": "option",
        "last": 25.1,
        "change": 0.35,
        "volume": 42,
        "open": 24.9,
        "high": 25.3,
        "low": 24.8,
        "close": null,
        "bid": 25.05,
        "ask": 25.2,
        "underlying": "SPY",
        "strike": 450.0,
        "change_percentage": 1.41,
        "average_volume": 0,
        "last_volume": 1,
        "trade_date": 1704384000000i64,
        "prevclose": 24.75,
        "week_52_high": 0.0,
        "week_52_low": 0.0,
        "bidsize": 30,
        "bidexch": "X",
        "bid_date": 1704384000000i64,
        "asksize": 55,
        "askexch": "C",
        "ask_date": 1704384000000i64,
        "open_interest": 18220,
        "contract_size": 100,
        "expiration_date": "2024-01-19",
        "expiration_type": "standard",
        "option_type": "call",
        "root_symbol": "SPY"
    });
    if with_greeks {
        quote["greeks"] = json!({
            "delta": 0.82,
            "gamma": 0.011,
            "theta": -0.12,
            "vega": 0.31,
            "rho": 0.22,
            "phi": -0.37,
            "bid_iv": 0.14,
            "mid_iv": 0.145,
            "ask_iv": 0.15,
            "smv_vol": 0.146,
            "updated_at": "2024-01-04 20:59:54"
        });
    }
    quote
}

pub fn index_quote() -> Value {
    json!({
        "symbol": "SPX",
        "description": "S&P 500 Index",
        "exch": "I",
        "type": "index",
        "last": 4688.68,
        "change": -15.13,
        "volume": 0,
        "open": 4697.42,
        "high": 4726.78,
        "low": 4687.53,
        "close": null,
        "bid": null,
        "ask": null,
        "change_percentage": -0.33,
        "average_volume": 0,
        "last_volume": 0,
        "trade_date": 1704405600000i64,
        "prevclose": 4704.81,
        "week_52_high": 4793.3,
        "week_52_low": 3794.33,
        "bidsize": 0,
        "bidexch": null,
        "bid_date": 0,
        "asksize": 0,
        "askexch": null,
        "ask_date": 0,
        "root_symbols": "SPX,SPXW"
    })
}
