//! Order vocabularies and the price-field rules shared by both directions.
//!
//! Placing an order names its stop trigger `stop`; reading it back names the
//! same value `stop_price`. One table drives both, parameterized by
//! [`StopField`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InvariantError;

pub mod request;
pub mod response;

/// Wire key of the order discriminator.
pub const CLASS_FIELD: &str = "class";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderClass {
    Equity,
    Option,
    Multileg,
}

impl OrderClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderClass::Equity => "equity",
            OrderClass::Option => "option",
            OrderClass::Multileg => "multileg",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "equity" => Some(OrderClass::Equity),
            "option" => Some(OrderClass::Option),
            "multileg" => Some(OrderClass::Multileg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Open,
    PartiallyFilled,
    Filled,
    Expired,
    Canceled,
    Pending,
    Rejected,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Duration {
    Day,
    Pre,
    Post,
    Gtc,
}

/// Every order type the API knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    StopLimit,
    Debit,
    Credit,
    Even,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "market",
            OrderType::Limit => "limit",
            OrderType::Stop => "stop",
            OrderType::StopLimit => "stop_limit",
            OrderType::Debit => "debit",
            OrderType::Credit => "credit",
            OrderType::Even => "even",
        }
    }

    /// Price-like fields this type must carry. All others must be absent.
    pub fn required_price_fields(&self) -> &'static [PriceField] {
        match self {
            OrderType::Market | OrderType::Even => &[],
            OrderType::Limit | OrderType::Debit | OrderType::Credit => &[PriceField::Price],
            OrderType::Stop => &[PriceField::Stop],
            OrderType::StopLimit => &[PriceField::Price, PriceField::Stop],
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order types valid for equity and single-leg option orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingleLegType {
    Market,
    Limit,
    Stop,
    StopLimit,
}

impl From<SingleLegType> for OrderType {
    fn from(value: SingleLegType) -> Self {
        match value {
            SingleLegType::Market => OrderType::Market,
            SingleLegType::Limit => OrderType::Limit,
            SingleLegType::Stop => OrderType::Stop,
            SingleLegType::StopLimit => OrderType::StopLimit,
        }
    }
}

/// Order types valid for multileg orders and their legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultilegType {
    Market,
    Debit,
    Even,
    Credit,
}

impl From<MultilegType> for OrderType {
    fn from(value: MultilegType) -> Self {
        match value {
            MultilegType::Market => OrderType::Market,
            MultilegType::Debit => OrderType::Debit,
            MultilegType::Even => OrderType::Even,
            MultilegType::Credit => OrderType::Credit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquitySide {
    Buy,
    BuyToCover,
    Sell,
    SellShort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionSide {
    BuyToOpen,
    BuyToClose,
    SellToOpen,
    SellToClose,
}

/// Multileg orders are always reported as `buy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultilegSide {
    Buy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Freeform,
    CoveredCall,
    ProtectivePut,
    Strangle,
    Straddle,
    Spread,
    Collar,
    Butterfly,
    Condor,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceField {
    Price,
    Stop,
}

/// Which wire name the stop trigger has in a given direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopField {
    /// Outbound placement requests.
    Stop,
    /// Inbound order records.
    StopPrice,
}

impl StopField {
    pub fn wire_name(&self) -> &'static str {
        match self {
            StopField::Stop => "stop",
            StopField::StopPrice => "stop_price",
        }
    }
}

impl PriceField {
    const ALL: [PriceField; 2] = [PriceField::Price, PriceField::Stop];

    pub fn wire_name(&self, dialect: StopField) -> &'static str {
        match self {
            PriceField::Price => "price",
            PriceField::Stop => dialect.wire_name(),
        }
    }
}

/// An order record whose price-like fields are governed by its type.
pub trait PricedOrder {
    fn order_type(&self) -> OrderType;

    fn has_price_field(&self, field: PriceField) -> bool;

    fn check_price_fields(&self, dialect: StopField) -> Result<(), InvariantError> {
        check_price_fields(self.order_type(), dialect, |field| self.has_price_field(field))
    }
}

/// Enforce the requirement table for `order_type`.
///
/// Required fields are checked before forbidden ones, `price` before the stop.
pub fn check_price_fields(
    order_type: OrderType,
    dialect: StopField,
    present: impl Fn(PriceField) -> bool,
) -> Result<(), InvariantError> {
    let required = order_type.required_price_fields();
    for field in required {
        if !present(*field) {
            return Err(InvariantError::MissingPriceField {
                order_type,
                field: field.wire_name(dialect),
            });
        }
    }
    for field in PriceField::ALL.iter().filter(|f| !required.contains(f)) {
        if present(*field) {
            return Err(InvariantError::ForbiddenPriceField {
                order_type,
                field: field.wire_name(dialect),
            });
        }
    }
    Ok(())
}
