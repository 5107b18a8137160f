use serde::Deserialize;
use serde_json::Value;

use crate::error::WireError;
use crate::wire::{self, Decode};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OptionSymbols {
    #[serde(rename = "rootSymbol")]
    pub root_symbol: String,
    pub options: Vec<String>,
}

/// Body of the option symbol lookup. `symbols` is `None` when the underlying is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetOptionSymbolsResponse {
    pub symbols: Option<Vec<OptionSymbols>>,
}

impl Decode for GetOptionSymbolsResponse {
    fn decode(value: Value) -> Result<Self, WireError> {
        wire::decode_record("option symbols response", value)
    }
}
