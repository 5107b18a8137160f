//! Order records as the API reports them, resolved on the `class` tag.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::{
    Duration, EquitySide, MultilegSide, MultilegType, OptionSide, OrderClass, OrderStatus, OrderType,
    PriceField, PricedOrder, SingleLegType, StopField, Strategy, CLASS_FIELD,
};
use crate::error::{InvariantError, WireError};
use crate::wire::constrained::OrderTag;
use crate::wire::{self, integral, timestamp, Decode};

const RECORD: &str = "order";

/// Fields every order record carries.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderBase {
    pub id: u64,
    pub symbol: String,
    #[serde(deserialize_with = "integral::deserialize")]
    pub quantity: i64,
    pub status: OrderStatus,
    pub duration: Duration,
    #[serde(default)]
    pub price: Option<Decimal>,
    pub avg_fill_price: Decimal,
    #[serde(deserialize_with = "integral::deserialize")]
    pub exec_quantity: i64,
    pub last_fill_price: Decimal,
    #[serde(deserialize_with = "integral::deserialize")]
    pub last_fill_quantity: i64,
    #[serde(deserialize_with = "integral::deserialize")]
    pub remaining_quantity: i64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub create_date: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub transaction_date: DateTime<Utc>,
    #[serde(default)]
    pub reason_description: Option<String>,
    #[serde(default)]
    pub tag: Option<OrderTag>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EquityOrderResponse {
    #[serde(flatten)]
    pub base: OrderBase,
    #[serde(rename = "type")]
    pub order_type: SingleLegType,
    pub side: EquitySide,
    #[serde(default)]
    pub stop_price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OptionOrderResponse {
    #[serde(flatten)]
    pub base: OrderBase,
    #[serde(rename = "type")]
    pub order_type: SingleLegType,
    pub side: OptionSide,
    #[serde(default)]
    pub stop_price: Option<Decimal>,
    pub option_symbol: String,
}

/// One leg of a multileg order.
///
/// The API duplicates the group's type and price onto each leg; per-leg fill
/// prices are in `avg_fill_price` and `last_fill_price`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OptionLeg {
    #[serde(flatten)]
    pub base: OrderBase,
    #[serde(rename = "type")]
    pub order_type: MultilegType,
    pub side: OptionSide,
    #[serde(default)]
    pub stop_price: Option<Decimal>,
    pub option_symbol: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultilegOrderResponse {
    pub base: OrderBase,
    pub order_type: MultilegType,
    pub side: MultilegSide,
    pub num_legs: u32,
    pub strategy: Strategy,
    pub legs: Vec<OptionLeg>,
}

#[derive(Deserialize)]
struct MultilegWire {
    #[serde(flatten)]
    base: OrderBase,
    #[serde(rename = "type")]
    order_type: MultilegType,
    side: MultilegSide,
    num_legs: u32,
    strategy: Strategy,
    leg: Vec<Value>,
}

impl PricedOrder for EquityOrderResponse {
    fn order_type(&self) -> OrderType {
        self.order_type.into()
    }

    fn has_price_field(&self, field: PriceField) -> bool {
        match field {
            PriceField::Price => self.base.price.is_some(),
            PriceField::Stop => self.stop_price.is_some(),
        }
    }
}

impl PricedOrder for OptionOrderResponse {
    fn order_type(&self) -> OrderType {
        self.order_type.into()
    }

    fn has_price_field(&self, field: PriceField) -> bool {
        match field {
            PriceField::Price => self.base.price.is_some(),
            PriceField::Stop => self.stop_price.is_some(),
        }
    }
}

impl PricedOrder for OptionLeg {
    fn order_type(&self) -> OrderType {
        self.order_type.into()
    }

    fn has_price_field(&self, field: PriceField) -> bool {
        match field {
            PriceField::Price => self.base.price.is_some(),
            PriceField::Stop => self.stop_price.is_some(),
        }
    }
}

impl PricedOrder for MultilegOrderResponse {
    fn order_type(&self) -> OrderType {
        self.order_type.into()
    }

    // Multileg records have no stop field at all.
    fn has_price_field(&self, field: PriceField) -> bool {
        match field {
            PriceField::Price => self.base.price.is_some(),
            PriceField::Stop => false,
        }
    }
}

fn decode_variant<T: DeserializeOwned>(tag: &str, value: Value) -> Result<T, WireError> {
    serde_json::from_value(value).map_err(|e| WireError::tagged(RECORD, tag, e))
}

impl MultilegOrderResponse {
    fn from_wire(tag: &str, value: Value) -> Result<Self, WireError> {
        let wire: MultilegWire = decode_variant(tag, value)?;

        // Every leg must decode before any cross-field check runs.
        let legs = wire
            .leg
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                serde_json::from_value::<OptionLeg>(raw)
                    .map_err(|e| WireError::tagged(RECORD, tag, format!("leg[{index}]: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        for leg in &legs {
            leg.check_price_fields(StopField::StopPrice)?;
        }

        let order = Self {
            base: wire.base,
            order_type: wire.order_type,
            side: wire.side,
            num_legs: wire.num_legs,
            strategy: wire.strategy,
            legs,
        };
        order.check_leg_types()?;
        order.check_price_fields(StopField::StopPrice)?;
        Ok(order)
    }

    /// Every leg must repeat the group's type.
    pub fn check_leg_types(&self) -> Result<(), InvariantError> {
        match self
            .legs
            .iter()
            .position(|leg| leg.order_type != self.order_type)
        {
            Some(index) => Err(InvariantError::LegTypeMismatch {
                index,
                leg_type: self.legs[index].order_type.into(),
                order_type: self.order_type.into(),
            }),
            None => Ok(()),
        }
    }
}

/// An order record of any class.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderResponse {
    Equity(EquityOrderResponse),
    Option(OptionOrderResponse),
    Multileg(MultilegOrderResponse),
}

impl OrderResponse {
    /// Resolve the `class` tag, decode the selected shape and check its price fields.
    pub fn from_value(value: Value) -> Result<Self, WireError> {
        let tag = wire::tag_of(RECORD, CLASS_FIELD, &value)?.to_string();
        let class = OrderClass::from_tag(&tag).ok_or_else(|| {
            WireError::tagged(RECORD, &tag, "unknown class, expected one of equity, option, multileg")
        })?;

        match class {
            OrderClass::Equity => {
                let order: EquityOrderResponse = decode_variant(&tag, value)?;
                order.check_price_fields(StopField::StopPrice)?;
                Ok(OrderResponse::Equity(order))
            }
            OrderClass::Option => {
                let order: OptionOrderResponse = decode_variant(&tag, value)?;
                order.check_price_fields(StopField::StopPrice)?;
                Ok(OrderResponse::Option(order))
            }
            OrderClass::Multileg => MultilegOrderResponse::from_wire(&tag, value).map(OrderResponse::Multileg),
        }
    }

    pub fn class(&self) -> OrderClass {
        match self {
            OrderResponse::Equity(_) => OrderClass::Equity,
            OrderResponse::Option(_) => OrderClass::Option,
            OrderResponse::Multileg(_) => OrderClass::Multileg,
        }
    }

    pub fn base(&self) -> &OrderBase {
        match self {
            OrderResponse::Equity(o) => &o.base,
            OrderResponse::Option(o) => &o.base,
            OrderResponse::Multileg(o) => &o.base,
        }
    }

    pub fn order_type(&self) -> OrderType {
        match self {
            OrderResponse::Equity(o) => o.order_type.into(),
            OrderResponse::Option(o) => o.order_type.into(),
            OrderResponse::Multileg(o) => o.order_type.into(),
        }
    }
}

/// Body of the account orders endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct GetOrdersResponse {
    pub orders: Vec<OrderResponse>,
}

impl Decode for GetOrdersResponse {
    fn decode(value: Value) -> Result<Self, WireError> {
        let raw = wire::take_field("orders response", "orders", value)?;
        let orders = wire::wrapped("orders", "order", raw)?
            .into_vec()
            .into_iter()
            .map(OrderResponse::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { orders })
    }
}

/// Body of the single-order endpoint: `{"order": {..}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct GetOrderResponse {
    pub order: OrderResponse,
}

impl Decode for GetOrderResponse {
    fn decode(value: Value) -> Result<Self, WireError> {
        let raw = wire::take_field("order response", "order", value)?;
        Ok(Self {
            order: OrderResponse::from_value(raw)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    Ok,
}

/// `{"order": {"id": .., "status": "ok", "partner_id": ..}}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaceOrderResponse {
    pub id: u64,
    pub status: AckStatus,
    pub partner_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModifyOrderResponse {
    pub id: u64,
    pub status: AckStatus,
    pub partner_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CancelOrderResponse {
    pub id: u64,
    pub status: AckStatus,
}

#[derive(Deserialize)]
struct AckEnvelope<T> {
    order: T,
}

fn decode_ack<T: DeserializeOwned>(record: &'static str, value: Value) -> Result<T, WireError> {
    wire::decode_record::<AckEnvelope<T>>(record, value).map(|envelope| envelope.order)
}

impl Decode for PlaceOrderResponse {
    fn decode(value: Value) -> Result<Self, WireError> {
        decode_ack("place order response", value)
    }
}

impl Decode for ModifyOrderResponse {
    fn decode(value: Value) -> Result<Self, WireError> {
        decode_ack("modify order response", value)
    }
}

impl Decode for CancelOrderResponse {
    fn decode(value: Value) -> Result<Self, WireError> {
        decode_ack("cancel order response", value)
    }
}
