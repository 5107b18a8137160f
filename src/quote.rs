//! Quote records, resolved on the `type` tag.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::WireError;
use crate::wire::{self, integral, timestamp, Decode};

const RECORD: &str = "quote";
const TYPE_FIELD: &str = "type";

/// Fields shared by every quote.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuoteBase {
    pub symbol: String,
    pub description: String,
    pub exch: String,
    pub last: Option<Decimal>,
    pub change: Option<Decimal>,
    #[serde(deserialize_with = "integral::deserialize")]
    pub volume: i64,
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Option<Decimal>,
    pub bid: Option<Decimal>,
    pub ask: Option<Decimal>,
    pub change_percentage: Option<Decimal>,
    #[serde(deserialize_with = "integral::deserialize")]
    pub average_volume: i64,
    #[serde(deserialize_with = "integral::deserialize")]
    pub last_volume: i64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub trade_date: DateTime<Utc>,
    pub prevclose: Option<Decimal>,
    pub week_52_high: Decimal,
    pub week_52_low: Decimal,
    #[serde(deserialize_with = "integral::deserialize")]
    pub bidsize: i64,
    pub bidexch: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub bid_date: DateTime<Utc>,
    #[serde(deserialize_with = "integral::deserialize")]
    pub asksize: i64,
    pub askexch: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub ask_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexQuote {
    #[serde(flatten)]
    pub base: QuoteBase,
    pub root_symbols: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StockQuote {
    #[serde(flatten)]
    pub base: QuoteBase,
    pub root_symbols: Option<String>,
}

/// Option sensitivities. All fields are required when the block is present.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
    pub phi: f64,
    pub bid_iv: f64,
    pub mid_iv: f64,
    pub ask_iv: f64,
    pub smv_vol: f64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpirationType {
    Standard,
    Quarterlys,
    Weeklys,
    Eom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Put,
    Call,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OptionQuote {
    #[serde(flatten)]
    pub base: QuoteBase,
    #[serde(deserialize_with = "integral::deserialize")]
    pub open_interest: i64,
    #[serde(deserialize_with = "integral::deserialize")]
    pub contract_size: i64,
    pub expiration_date: NaiveDate,
    pub expiration_type: ExpirationType,
    pub option_type: OptionType,
    pub root_symbol: String,
    #[serde(default)]
    pub underlying: Option<String>,
    #[serde(default)]
    pub strike: Option<Decimal>,
    #[serde(default)]
    pub greeks: Option<Greeks>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Quote {
    Index(IndexQuote),
    Stock(StockQuote),
    Option(OptionQuote),
}

fn decode_variant<T: DeserializeOwned>(tag: &str, value: Value) -> Result<T, WireError> {
    serde_json::from_value(value).map_err(|e| WireError::tagged(RECORD, tag, e))
}

impl Quote {
    pub fn from_value(value: Value) -> Result<Self, WireError> {
        let tag = wire::tag_of(RECORD, TYPE_FIELD, &value)?.to_string();
        match tag.as_str() {
            "index" => {
                let quote: IndexQuote = decode_variant(&tag, value)?;
                // Indices are not traded on an exchange book.
                for (field, exch) in [("bidexch", &quote.base.bidexch), ("askexch", &quote.base.askexch)] {
                    if exch.is_some() {
                        return Err(WireError::tagged(RECORD, &tag, format!("`{field}` must be null")));
                    }
                }
                Ok(Quote::Index(quote))
            }
            "stock" => decode_variant(&tag, value).map(Quote::Stock),
            "option" => decode_variant(&tag, value).map(Quote::Option),
            _ => Err(WireError::tagged(
                RECORD,
                &tag,
                "unknown type, expected one of index, stock, option",
            )),
        }
    }

    pub fn base(&self) -> &QuoteBase {
        match self {
            Quote::Index(q) => &q.base,
            Quote::Stock(q) => &q.base,
            Quote::Option(q) => &q.base,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.base().symbol
    }
}

/// Body of the quotes endpoint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GetQuotesResponse {
    pub quotes: Vec<Quote>,
    pub unmatched_symbols: Vec<String>,
}

impl Decode for GetQuotesResponse {
    fn decode(value: Value) -> Result<Self, WireError> {
        let root = wire::as_object("quotes response", &value)?;
        let Some(section) = root.get("quotes").filter(|v| !v.is_null()) else {
            return Ok(Self::default());
        };
        let section = match section {
            Value::String(s) if s == "null" => return Ok(Self::default()),
            other => wire::as_object("quotes", other)?,
        };

        let quotes = wire::bare("quote", section.get("quote").cloned())?
            .into_vec()
            .into_iter()
            .map(Quote::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        let symbols = match section.get("unmatched_symbols") {
            None | Some(Value::Null) => None,
            Some(unmatched) => wire::as_object("unmatched_symbols", unmatched)?
                .get("symbol")
                .cloned(),
        };
        let unmatched_symbols = wire::scalar_or_list("unmatched_symbols", symbols)?
            .into_vec()
            .into_iter()
            .map(|s| match s {
                Value::String(s) => Ok(s),
                other => Err(WireError::structural(
                    "unmatched_symbols",
                    format!("expected a string, got {}", wire::describe(&other)),
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            quotes,
            unmatched_symbols,
        })
    }
}
