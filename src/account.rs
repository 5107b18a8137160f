use std::num::NonZeroU64;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::error::WireError;
use crate::wire::{self, integral, timestamp, Decode};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Position {
    pub cost_basis: Decimal,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub date_acquired: DateTime<Utc>,
    pub id: NonZeroU64,
    #[serde(deserialize_with = "integral::deserialize")]
    pub quantity: i64,
    pub symbol: String,
}

/// Body of the account positions endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct GetPositionsResponse {
    pub positions: Vec<Position>,
}

impl Decode for GetPositionsResponse {
    fn decode(value: Value) -> Result<Self, WireError> {
        let raw = wire::take_field("positions response", "positions", value)?;
        let positions = wire::wrapped("positions", "position", raw)?
            .into_vec()
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value(item)
                    .map_err(|e| WireError::structural("position", format!("positions[{index}]: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { positions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn position(id: u64) -> Value {
        json!({
            "cost_basis": 207.01,
            "date_acquired": "2018-08-08T14:41:11.405Z",
            "id": id,
            "quantity": 1.00000000,
            "symbol": "AAPL"
        })
    }

    #[test]
    fn test_empty_marker() {
        let res = GetPositionsResponse::decode(json!({"positions": "null"})).unwrap();
        assert!(res.positions.is_empty());
    }

    #[test]
    fn test_single_and_many() {
        let one = GetPositionsResponse::decode(json!({"positions": {"position": position(130089)}})).unwrap();
        assert_eq!(one.positions.len(), 1);
        assert_eq!(one.positions[0].cost_basis, dec!(207.01));
        assert_eq!(one.positions[0].quantity, 1);

        let many = GetPositionsResponse::decode(json!({
            "positions": {"position": [position(1), position(2)]}
        }))
        .unwrap();
        assert_eq!(many.positions.iter().map(|p| p.id.get()).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_zero_id_rejected() {
        let err = GetPositionsResponse::decode(json!({"positions": {"position": position(0)}})).unwrap_err();
        assert!(err.to_string().contains("positions[0]"));
    }
}
