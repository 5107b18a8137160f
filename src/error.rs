//! Error taxonomy for decoding, validating and encoding wire payloads.
//!
//! Logical errors reported by the API (embedded error lists, client errors,
//! finalized orders) are not here: they are ordinary outcomes, see
//! [`crate::classify::Outcome`].

use thiserror::Error;

use crate::order::OrderType;

/// Coarse classification of a [`WireError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The payload does not have any expected shape.
    Structural,
    /// A ragged collection was missing its wrapper key.
    Cardinality,
    /// A decoded record violates a cross-field rule.
    CrossField,
}

/// Failure to turn a wire payload into a typed value (or back).
#[derive(Debug, Error)]
pub enum WireError {
    /// Body is not valid JSON.
    #[error("response body is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    /// Value does not match the record shape selected for it.
    #[error("{}", structural_message(.record, .tag.as_deref(), .detail))]
    Structural {
        record: &'static str,
        tag: Option<String>,
        detail: String,
    },

    /// A collection field was neither the empty marker nor a mapping holding `key`.
    #[error("{field} must be \"null\" or a mapping containing a '{key}' key")]
    Cardinality {
        field: &'static str,
        key: &'static str,
    },

    #[error(transparent)]
    Invariant(#[from] InvariantError),
}

fn structural_message(record: &str, tag: Option<&str>, detail: &str) -> String {
    match tag {
        Some(tag) => format!("failed to decode {record} '{tag}': {detail}"),
        None => format!("failed to decode {record}: {detail}"),
    }
}

impl WireError {
    pub fn structural(record: &'static str, detail: impl ToString) -> Self {
        Self::Structural {
            record,
            tag: None,
            detail: detail.to_string(),
        }
    }

    pub fn tagged(record: &'static str, tag: &str, detail: impl ToString) -> Self {
        Self::Structural {
            record,
            tag: Some(tag.to_string()),
            detail: detail.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WireError::Json(_) | WireError::Structural { .. } => ErrorKind::Structural,
            WireError::Cardinality { .. } => ErrorKind::Cardinality,
            WireError::Invariant(_) => ErrorKind::CrossField,
        }
    }
}

/// Cross-field rule violations on orders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    #[error("{order_type} order should have {field} field")]
    MissingPriceField {
        order_type: OrderType,
        field: &'static str,
    },

    #[error("{order_type} order should not have {field} field")]
    ForbiddenPriceField {
        order_type: OrderType,
        field: &'static str,
    },

    #[error("leg {index} type {leg_type} does not match multileg order type {order_type}")]
    LegTypeMismatch {
        index: usize,
        leg_type: OrderType,
        order_type: OrderType,
    },

    #[error("gap in leg indices (missing index {missing})")]
    LegGap { missing: usize },

    #[error("leg {index} missing value(s)")]
    IncompleteLeg { index: usize },

    #[error("multileg order needs 2 to 4 legs, got {count}")]
    LegCount { count: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_message_names_tag() {
        let err = WireError::tagged("order", "combo", "unknown class");
        assert_eq!(err.to_string(), "failed to decode order 'combo': unknown class");
        assert_eq!(err.kind(), ErrorKind::Structural);
    }

    #[test]
    fn test_invariant_is_cross_field() {
        let err: WireError = InvariantError::MissingPriceField {
            order_type: OrderType::Limit,
            field: "price",
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::CrossField);
        assert_eq!(err.to_string(), "limit order should have price field");
    }

    #[test]
    fn test_cardinality_names_key() {
        let err = WireError::Cardinality {
            field: "orders",
            key: "order",
        };
        assert!(err.to_string().contains("'order'"));
        assert_eq!(err.kind(), ErrorKind::Cardinality);
    }
}
