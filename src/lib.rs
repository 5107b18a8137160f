//! Wire normalization and validation for the Tradier brokerage REST API.
//!
//! Responses come in through [`classify::classify`], which picks the success
//! or error channel and decodes the body into typed records. Requests go out
//! through [`wire::FormFields`], after cross-field validation.

pub mod account;
pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod option_symbols;
pub mod order;
pub mod quote;
pub mod wire;

pub use classify::{classify, CallKind, Outcome};
pub use client::{ClientError, TradierClient, Transport};
pub use config::Config;
pub use error::{ErrorKind, InvariantError, WireError};
pub use wire::{Decode, FormFields};
