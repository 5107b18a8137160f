//! Order requests and their flat form encoding.
//!
//! Multileg legs live in a `Vec` in memory and as indexed keys on the wire:
//! `option_symbol[0]`, `side[0]`, `quantity[0]`, `option_symbol[1]`, ...

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use super::{
    Duration, EquitySide, MultilegType, OptionSide, OrderClass, OrderType, PriceField, PricedOrder,
    SingleLegType, StopField, CLASS_FIELD,
};
use crate::error::{InvariantError, WireError};
use crate::logging::{log, obj, v_num, v_str, Domain, Level};
use crate::wire::constrained::{OrderTag, PriceStr, QuantityStr, StopStr};
use crate::wire::{self, FormFields};

const RECORD: &str = "order request";

pub const MIN_LEGS: usize = 2;
pub const MAX_LEGS: usize = 4;

/// Dashboard page that opens an order ticket prefilled from its query.
pub const TRADELINK_BASE: &str = "https://dash.tradier.com/tradelink";

const LEG_ATTRIBUTES: [&str; 3] = ["option_symbol", "side", "quantity"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityPlaceOrderRequest {
    pub symbol: String,
    #[serde(rename = "type")]
    pub order_type: SingleLegType,
    pub duration: Duration,
    pub side: EquitySide,
    pub quantity: QuantityStr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<StopStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<OrderTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionPlaceOrderRequest {
    pub symbol: String,
    pub option_symbol: String,
    #[serde(rename = "type")]
    pub order_type: SingleLegType,
    pub duration: Duration,
    pub side: OptionSide,
    pub quantity: QuantityStr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<StopStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<OrderTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceMultilegOrderLeg {
    pub option_symbol: String,
    pub side: OptionSide,
    pub quantity: QuantityStr,
}

/// A 2 to 4 leg option order. Legs are addressed by their position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultilegPlaceOrderRequest {
    pub symbol: String,
    #[serde(rename = "type")]
    pub order_type: MultilegType,
    pub duration: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<OrderTag>,
    #[serde(skip)]
    pub legs: Vec<PlaceMultilegOrderLeg>,
}

impl PricedOrder for EquityPlaceOrderRequest {
    fn order_type(&self) -> OrderType {
        self.order_type.into()
    }

    fn has_price_field(&self, field: PriceField) -> bool {
        match field {
            PriceField::Price => self.price.is_some(),
            PriceField::Stop => self.stop.is_some(),
        }
    }
}

impl PricedOrder for OptionPlaceOrderRequest {
    fn order_type(&self) -> OrderType {
        self.order_type.into()
    }

    fn has_price_field(&self, field: PriceField) -> bool {
        match field {
            PriceField::Price => self.price.is_some(),
            PriceField::Stop => self.stop.is_some(),
        }
    }
}

impl PricedOrder for MultilegPlaceOrderRequest {
    fn order_type(&self) -> OrderType {
        self.order_type.into()
    }

    fn has_price_field(&self, field: PriceField) -> bool {
        match field {
            PriceField::Price => self.price.is_some(),
            PriceField::Stop => false,
        }
    }
}

fn leg_key(attribute: &str, index: usize) -> String {
    format!("{attribute}[{index}]")
}

/// Collect indexed leg keys into positional legs.
///
/// A position with all three attributes is a leg, one with none is empty,
/// anything in between is incomplete. Legs must fill a prefix of `0..4`.
pub fn gather_legs(fields: &FormFields) -> Result<Vec<PlaceMultilegOrderLeg>, WireError> {
    let mut legs = Vec::new();
    let mut seen_empty = false;

    for index in 0..MAX_LEGS {
        let mut leg = Map::new();
        for attribute in LEG_ATTRIBUTES {
            if let Some(value) = fields.get(&leg_key(attribute, index)) {
                leg.insert(attribute.to_string(), Value::String(value.to_string()));
            }
        }

        if leg.is_empty() {
            seen_empty = true;
            continue;
        }
        if leg.len() != LEG_ATTRIBUTES.len() {
            return Err(InvariantError::IncompleteLeg { index }.into());
        }
        if seen_empty {
            return Err(InvariantError::LegGap { missing: index - 1 }.into());
        }

        let leg = serde_json::from_value(Value::Object(leg))
            .map_err(|e| WireError::tagged(RECORD, "multileg", format!("leg[{index}]: {e}")))?;
        legs.push(leg);
    }

    check_leg_count(legs.len())?;
    Ok(legs)
}

/// Expand legs into `attribute[i]` keys.
pub fn flatten_legs(legs: &[PlaceMultilegOrderLeg], fields: &mut FormFields) {
    for (index, leg) in legs.iter().enumerate() {
        fields.insert(leg_key("option_symbol", index), leg.option_symbol.clone());
        fields.insert(leg_key("side", index), side_str(leg.side));
        fields.insert(leg_key("quantity", index), leg.quantity.as_str());
    }
}

fn side_str(side: OptionSide) -> &'static str {
    match side {
        OptionSide::BuyToOpen => "buy_to_open",
        OptionSide::BuyToClose => "buy_to_close",
        OptionSide::SellToOpen => "sell_to_open",
        OptionSide::SellToClose => "sell_to_close",
    }
}

fn check_leg_count(count: usize) -> Result<(), InvariantError> {
    if (MIN_LEGS..=MAX_LEGS).contains(&count) {
        Ok(())
    } else {
        Err(InvariantError::LegCount { count })
    }
}

impl MultilegPlaceOrderRequest {
    pub fn validate(&self) -> Result<(), InvariantError> {
        check_leg_count(self.legs.len())?;
        self.check_price_fields(StopField::Stop)
    }
}

/// An order placement of any class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceOrderRequest {
    Equity(EquityPlaceOrderRequest),
    Option(OptionPlaceOrderRequest),
    Multileg(MultilegPlaceOrderRequest),
}

fn serialize_fields<T: Serialize>(request: &T) -> Result<FormFields, WireError> {
    let value = serde_json::to_value(request).map_err(|e| WireError::structural(RECORD, e))?;
    FormFields::from_serialized(RECORD, value)
}

fn decode_variant<T: serde::de::DeserializeOwned>(tag: &str, fields: &FormFields) -> Result<T, WireError> {
    serde_json::from_value(fields.to_json()).map_err(|e| WireError::tagged(RECORD, tag, e))
}

impl PlaceOrderRequest {
    pub fn class(&self) -> OrderClass {
        match self {
            PlaceOrderRequest::Equity(_) => OrderClass::Equity,
            PlaceOrderRequest::Option(_) => OrderClass::Option,
            PlaceOrderRequest::Multileg(_) => OrderClass::Multileg,
        }
    }

    pub fn validate(&self) -> Result<(), InvariantError> {
        match self {
            PlaceOrderRequest::Equity(r) => r.check_price_fields(StopField::Stop),
            PlaceOrderRequest::Option(r) => r.check_price_fields(StopField::Stop),
            PlaceOrderRequest::Multileg(r) => r.validate(),
        }
    }

    /// Validate, then encode as the flat field set the placement endpoint expects.
    pub fn to_form(&self) -> Result<FormFields, WireError> {
        if let Err(e) = self.validate() {
            log(
                Level::Warn,
                Domain::Validate,
                "order.rejected",
                obj(&[("class", v_str(self.class().as_str())), ("msg", v_str(&e.to_string()))]),
            );
            return Err(e.into());
        }
        let mut fields = match self {
            PlaceOrderRequest::Equity(r) => serialize_fields(r)?,
            PlaceOrderRequest::Option(r) => serialize_fields(r)?,
            PlaceOrderRequest::Multileg(r) => {
                let mut fields = serialize_fields(r)?;
                flatten_legs(&r.legs, &mut fields);
                fields
            }
        };
        fields.insert(CLASS_FIELD, self.class().as_str());
        log(
            Level::Debug,
            Domain::Encode,
            "order.encoded",
            obj(&[("class", v_str(self.class().as_str())), ("fields", v_num(fields.len() as f64))]),
        );
        Ok(fields)
    }

    /// Link to a prefilled order ticket, for staging an order by hand.
    pub fn tradelink_url(&self) -> Result<Url, WireError> {
        let fields = self.to_form()?;
        Url::parse_with_params(TRADELINK_BASE, fields.iter()).map_err(|e| WireError::structural("tradelink", e))
    }

    /// Rebuild a request from its flat field set, resolving on `class`.
    pub fn from_form(fields: &FormFields) -> Result<Self, WireError> {
        let tag = wire::tag_of(RECORD, CLASS_FIELD, &fields.to_json())?.to_string();
        let class = OrderClass::from_tag(&tag).ok_or_else(|| {
            WireError::tagged(RECORD, &tag, "unknown class, expected one of equity, option, multileg")
        })?;

        let request = match class {
            OrderClass::Equity => PlaceOrderRequest::Equity(decode_variant(&tag, fields)?),
            OrderClass::Option => PlaceOrderRequest::Option(decode_variant(&tag, fields)?),
            OrderClass::Multileg => {
                let mut request: MultilegPlaceOrderRequest = decode_variant(&tag, fields)?;
                request.legs = gather_legs(fields)?;
                PlaceOrderRequest::Multileg(request)
            }
        };
        request.validate()?;
        Ok(request)
    }
}

/// Change type, duration or prices of a working order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModifyOrderRequest {
    #[serde(skip)]
    pub order_id: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub order_type: Option<OrderType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceStr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<StopStr>,
}

impl ModifyOrderRequest {
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            order_type: None,
            duration: None,
            price: None,
            stop: None,
        }
    }

    /// Body fields. The order id travels in the path.
    pub fn to_form(&self) -> Result<FormFields, WireError> {
        serialize_fields(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelOrderRequest {
    pub order_id: String,
}

impl CancelOrderRequest {
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn leg(symbol: &str, side: OptionSide, qty: &str) -> PlaceMultilegOrderLeg {
        PlaceMultilegOrderLeg {
            option_symbol: symbol.to_string(),
            side,
            quantity: QuantityStr::try_from(qty).unwrap(),
        }
    }

    fn spread() -> MultilegPlaceOrderRequest {
        MultilegPlaceOrderRequest {
            symbol: "SPY".to_string(),
            order_type: MultilegType::Debit,
            duration: Duration::Day,
            price: Some(PriceStr::try_from("1.25").unwrap()),
            tag: None,
            legs: vec![
                leg("SPY240119C00450000", OptionSide::BuyToOpen, "1"),
                leg("SPY240119C00460000", OptionSide::SellToOpen, "1"),
            ],
        }
    }

    #[test]
    fn test_flatten_emits_indexed_keys() {
        let fields = PlaceOrderRequest::Multileg(spread()).to_form().unwrap();
        assert_eq!(fields.get("class"), Some("multileg"));
        assert_eq!(fields.get("type"), Some("debit"));
        assert_eq!(fields.get("option_symbol[0]"), Some("SPY240119C00450000"));
        assert_eq!(fields.get("side[1]"), Some("sell_to_open"));
        assert_eq!(fields.get("quantity[1]"), Some("1"));
        assert!(!fields.contains_key("tag"));
        assert!(!fields.contains_key("option_symbol[2]"));
        assert!(!fields.contains_key("legs"));
    }

    #[test]
    fn test_equity_form_omits_unset() {
        let request = PlaceOrderRequest::Equity(EquityPlaceOrderRequest {
            symbol: "AAPL".to_string(),
            order_type: SingleLegType::Market,
            duration: Duration::Gtc,
            side: EquitySide::SellShort,
            quantity: QuantityStr::try_from("10").unwrap(),
            price: None,
            stop: None,
            tag: None,
        });
        let fields = request.to_form().unwrap();
        assert_eq!(fields.len(), 6);
        assert_eq!(fields.get("side"), Some("sell_short"));
        assert_eq!(fields.get("class"), Some("equity"));
        assert_eq!(PlaceOrderRequest::from_form(&fields).unwrap(), request);
    }

    #[test]
    fn test_place_validates_before_encoding() {
        let mut request = spread();
        request.price = None;
        let err = PlaceOrderRequest::Multileg(request).to_form().unwrap_err();
        assert_eq!(err.to_string(), "debit order should have price field");

        let mut request = spread();
        request.legs.truncate(1);
        let err = PlaceOrderRequest::Multileg(request).to_form().unwrap_err();
        assert!(matches!(err, WireError::Invariant(InvariantError::LegCount { count: 1 })));
    }

    #[test]
    fn test_gather_incomplete_leg() {
        let mut fields = PlaceOrderRequest::Multileg(spread()).to_form().unwrap();
        fields.insert("option_symbol[2]", "SPY240119C00470000");
        let err = PlaceOrderRequest::from_form(&fields).unwrap_err();
        assert!(matches!(err, WireError::Invariant(InvariantError::IncompleteLeg { index: 2 })));
    }

    #[test]
    fn test_gather_bad_leg_side_is_structural() {
        let mut fields = PlaceOrderRequest::Multileg(spread()).to_form().unwrap();
        fields.insert("side[1]", "sideways");
        let err = PlaceOrderRequest::from_form(&fields).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert!(err.to_string().contains("leg[1]"));
    }

    #[test]
    fn test_tradelink_carries_form() {
        let url = PlaceOrderRequest::Multileg(spread()).tradelink_url().unwrap();
        assert!(url.as_str().starts_with("https://dash.tradier.com/tradelink?"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("option_symbol[0]".to_string(), "SPY240119C00450000".to_string())));
        assert!(pairs.contains(&("class".to_string(), "multileg".to_string())));
    }

    #[test]
    fn test_modify_form() {
        let mut request = ModifyOrderRequest::new("123456");
        request.order_type = Some(OrderType::StopLimit);
        request.stop = Some(StopStr::try_from("9.5").unwrap());
        let fields = request.to_form().unwrap();
        assert_eq!(fields.get("type"), Some("stop_limit"));
        assert_eq!(fields.get("stop"), Some("9.5"));
        assert!(!fields.contains_key("order_id"));
        assert!(!fields.contains_key("price"));
    }
}
