//! Ragged collection shapes and record resolution on full response bodies.

mod common;

use rstest::rstest;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use tradierwire::account::GetPositionsResponse;
use tradierwire::order::response::{GetOrdersResponse, OrderResponse};
use tradierwire::order::{OrderClass, OrderType};
use tradierwire::quote::{GetQuotesResponse, OptionType, Quote};
use tradierwire::{Decode, ErrorKind, WireError};

use common::*;

#[rstest]
#[case(json!({"positions": "null"}), vec![])]
#[case(json!({"positions": {"position": position(7, "AAPL")}}), vec![7])]
#[case(json!({"positions": {"position": [position(7, "AAPL"), position(8, "MSFT")]}}), vec![7, 8])]
fn positions_every_shape_is_a_list(#[case] body: Value, #[case] ids: Vec<u64>) {
    let res = GetPositionsResponse::decode(body).unwrap();
    assert_eq!(res.positions.iter().map(|p| p.id.get()).collect::<Vec<_>>(), ids);
    if let Some(first) = res.positions.first() {
        assert_eq!(first.cost_basis, dec!(1014.5));
        assert_eq!(first.quantity, 10);
    }
}

#[rstest]
#[case(json!({"orders": "null"}), 0)]
#[case(json!({"orders": {"order": equity_market(1)}}), 1)]
#[case(json!({"orders": {"order": [equity_market(1), option_stop(2), vertical_spread(3)]}}), 3)]
fn orders_every_shape_is_a_list(#[case] body: Value, #[case] expected: usize) {
    let res = GetOrdersResponse::decode(body).unwrap();
    assert_eq!(res.orders.len(), expected);
}

#[test]
fn orders_resolve_on_class() {
    let body = json!({"orders": {"order": [equity_market(1), option_stop(2), vertical_spread(3)]}});
    let res = GetOrdersResponse::decode(body).unwrap();
    let classes: Vec<OrderClass> = res.orders.iter().map(OrderResponse::class).collect();
    assert_eq!(classes, vec![OrderClass::Equity, OrderClass::Option, OrderClass::Multileg]);

    match &res.orders[2] {
        OrderResponse::Multileg(order) => {
            assert_eq!(order.legs.len(), 2);
            assert_eq!(order.num_legs, 2);
            assert_eq!(order.legs[1].option_symbol, "SPY240119C00460000");
        }
        other => panic!("expected multileg, got {other:?}"),
    }
    assert_eq!(res.orders[1].order_type(), OrderType::Stop);
}

#[rstest]
#[case(json!({"orders": {}}))]
#[case(json!({"orders": {"order": null}}))]
#[case(json!({"orders": {"order": false}}))]
fn orders_without_wrapper_key_is_cardinality_error(#[case] body: Value) {
    let err = GetOrdersResponse::decode(body).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cardinality);
    assert_eq!(
        err.to_string(),
        "orders must be \"null\" or a mapping containing a 'order' key"
    );
}

#[test]
fn one_bad_order_fails_the_whole_listing() {
    let mut bad = equity_market(2);
    bad["class"] = json!("bond");
    let err = GetOrdersResponse::decode(json!({"orders": {"order": [equity_market(1), bad]}})).unwrap_err();
    match err {
        WireError::Structural { tag, .. } => assert_eq!(tag.as_deref(), Some("bond")),
        other => panic!("unexpected {other:?}"),
    }
}

#[rstest]
#[case(json!({}))]
#[case(json!({"quotes": null}))]
#[case(json!({"quotes": "null"}))]
fn quotes_absent_is_empty(#[case] body: Value) {
    let res = GetQuotesResponse::decode(body).unwrap();
    assert!(res.quotes.is_empty());
    assert!(res.unmatched_symbols.is_empty());
}

#[test]
fn quotes_single_and_many() {
    let one = GetQuotesResponse::decode(json!({"quotes": {"quote": index_quote()}})).unwrap();
    assert_eq!(one.quotes.len(), 1);
    assert!(matches!(one.quotes[0], Quote::Index(_)));

    let many = GetQuotesResponse::decode(json!({
        "quotes": {
            "quote": [index_quote(), option_quote(false)],
            "unmatched_symbols": {"symbol": ["XXXX", "YYYY"]}
        }
    }))
    .unwrap();
    assert_eq!(many.quotes.iter().map(Quote::symbol).collect::<Vec<_>>(), vec!["SPX", "SPY240119C00450000"]);
    assert_eq!(many.unmatched_symbols, vec!["XXXX", "YYYY"]);
}

#[test]
fn option_quote_without_greeks() {
    let quote = Quote::from_value(option_quote(false)).unwrap();
    let Quote::Option(option) = quote else {
        panic!("expected an option quote");
    };
    assert!(option.greeks.is_none());
    assert_eq!(option.strike, Some(dec!(450)));
    assert_eq!(option.option_type, OptionType::Call);
    assert_eq!(option.expiration_date.to_string(), "2024-01-19");
}

#[test]
fn option_quote_with_greeks() {
    let Quote::Option(option) = Quote::from_value(option_quote(true)).unwrap() else {
        panic!("expected an option quote");
    };
    let greeks = option.greeks.unwrap();
    assert_eq!(greeks.delta, 0.82);
    assert_eq!(greeks.phi, -0.37);
    assert_eq!(greeks.smv_vol, 0.146);
    assert_eq!(greeks.updated_at.to_rfc3339(), "2024-01-04T20:59:54+00:00");
}

#[test]
fn partial_greeks_are_rejected() {
    let mut raw = option_quote(true);
    raw["greeks"].as_object_mut().unwrap().remove("rho");
    let err = Quote::from_value(raw).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structural);
    assert!(err.to_string().contains("'option'"));
}

#[test]
fn index_quote_with_exchange_is_rejected() {
    let mut raw = index_quote();
    raw["askexch"] = json!("Q");
    let err = Quote::from_value(raw).unwrap_err();
    assert!(err.to_string().contains("askexch"), "{err}");
}

#[test]
fn quote_counts_accept_integral_floats() {
    let mut raw = option_quote(false);
    raw["volume"] = json!(42.0);
    raw["bidsize"] = json!(30.00000000);
    raw["open_interest"] = json!(18220.0);
    let Quote::Option(option) = Quote::from_value(raw).unwrap() else {
        panic!("expected an option quote");
    };
    assert_eq!(option.base.volume, 42);
    assert_eq!(option.base.bidsize, 30);
    assert_eq!(option.open_interest, 18220);

    let mut fractional = option_quote(false);
    fractional["volume"] = json!(42.5);
    assert_eq!(Quote::from_value(fractional).unwrap_err().kind(), ErrorKind::Structural);
}
