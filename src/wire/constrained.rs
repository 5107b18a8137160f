//! String values the API validates by pattern.
//!
//! Prices, stops and quantities travel as decimal text on the request side,
//! and tags are restricted to a small alphabet. Each newtype is checked once
//! at construction and is otherwise an ordinary string.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A string rejected by one of the constrained newtypes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} {value:?} does not match {pattern}")]
pub struct PatternError {
    pub kind: &'static str,
    pub value: String,
    pub pattern: &'static str,
}

pub const TAG_MAX_LEN: usize = 255;

const PRICE_PATTERN: &str = r"^-?\d+(?:\.\d{1,2})?$";
const STOP_PATTERN: &str = r"^\d+(?:\.\d{1,2})?$";
const QUANTITY_PATTERN: &str = r"^\d+$";
const TAG_PATTERN: &str = r"^[a-zA-Z0-9\-]+$";

static PRICE_RE: OnceLock<Regex> = OnceLock::new();
static STOP_RE: OnceLock<Regex> = OnceLock::new();
static QUANTITY_RE: OnceLock<Regex> = OnceLock::new();
static TAG_RE: OnceLock<Regex> = OnceLock::new();

fn compiled(cell: &'static OnceLock<Regex>, pattern: &'static str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("pattern literal compiles"))
}

fn check(
    kind: &'static str,
    cell: &'static OnceLock<Regex>,
    pattern: &'static str,
    value: String,
) -> Result<String, PatternError> {
    if compiled(cell, pattern).is_match(&value) {
        Ok(value)
    } else {
        Err(PatternError { kind, value, pattern })
    }
}

macro_rules! constrained_string {
    ($(#[$meta:meta])* $name:ident, $kind:literal, $cell:ident, $pattern:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = PatternError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                check($kind, &$cell, $pattern, value).map(Self)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = PatternError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::try_from(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

constrained_string!(
    /// Limit price with at most two decimals. Negative values are credits.
    PriceStr, "price", PRICE_RE, PRICE_PATTERN
);
constrained_string!(
    /// Stop trigger price, non-negative, at most two decimals.
    StopStr, "stop", STOP_RE, STOP_PATTERN
);
constrained_string!(
    /// Whole number of shares or contracts.
    QuantityStr, "quantity", QUANTITY_RE, QUANTITY_PATTERN
);

/// Client-supplied order tag: `[A-Za-z0-9-]`, 1 to 255 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderTag(String);

impl OrderTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OrderTag {
    type Error = PatternError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.len() > TAG_MAX_LEN {
            return Err(PatternError {
                kind: "tag",
                value,
                pattern: "at most 255 characters",
            });
        }
        check("tag", &TAG_RE, TAG_PATTERN, value).map(Self)
    }
}

impl TryFrom<&str> for OrderTag {
    type Error = PatternError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_string())
    }
}

impl From<OrderTag> for String {
    fn from(value: OrderTag) -> String {
        value.0
    }
}

impl fmt::Display for OrderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", true)]
    #[case("1.5", true)]
    #[case("-0.25", true)]
    #[case("1.234", false)]
    #[case("1.", false)]
    #[case("abc", false)]
    fn test_price_pattern(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(PriceStr::try_from(raw).is_ok(), ok);
    }

    #[rstest]
    #[case("10.05", true)]
    #[case("-1", false)]
    fn test_stop_pattern(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(StopStr::try_from(raw).is_ok(), ok);
    }

    #[rstest]
    #[case("100", true)]
    #[case("1.0", false)]
    #[case("", false)]
    fn test_quantity_pattern(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(QuantityStr::try_from(raw).is_ok(), ok);
    }

    #[test]
    fn test_tag_limits() {
        assert!(OrderTag::try_from("my-tag-01").is_ok());
        assert!(OrderTag::try_from("under_score").is_err());
        assert!(OrderTag::try_from("").is_err());
        assert!(OrderTag::try_from("a".repeat(255)).is_ok());
        let err = OrderTag::try_from("a".repeat(256)).unwrap_err();
        assert_eq!(err.kind, "tag");
    }

    #[test]
    fn test_serde_rejects_bad_value() {
        let err = serde_json::from_str::<PriceStr>("\"1.999\"").unwrap_err();
        assert!(err.to_string().contains("does not match"));
        let ok: QuantityStr = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(ok.as_str(), "7");
    }
}
