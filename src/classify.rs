//! Sorting a raw response into success or one of the API's error channels.
//!
//! The API reports failure three ways: an embedded error list on a 200, a
//! `{code, message}` body on a 4xx, and a plain-text sentence on a 400 to a
//! cancel or modify. Status alone does not tell them apart, so shapes are
//! tried in a fixed order: embedded errors, client error, expected success.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::WireError;
use crate::logging::{body_digest, log, obj, v_num, v_str, Domain, Level};
use crate::wire::{self, Decode};

/// Whether the call mutates an existing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Read,
    /// Cancel or modify; a 400 here carries a plain-text body.
    Mutation,
}

/// Logical failure embedded in a 200 body, e.g. insufficient buying power.
///
/// `{"errors": {"error": "one"}}` or `{"errors": {"error": ["one", "two"]}}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownstreamErrorResponse {
    pub errors: Vec<String>,
}

impl DownstreamErrorResponse {
    /// `None` unless `value` has a non-empty list of error strings.
    pub fn from_value(value: &Value) -> Option<Self> {
        let errors = value.get("errors")?.as_object()?.get("error")?.clone();
        let errors = wire::scalar_or_list("errors", Some(errors))
            .ok()?
            .into_vec()
            .into_iter()
            .map(|e| match e {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?
            .into_iter()
            .filter(|e| !e.is_empty())
            .collect::<Vec<_>>();
        if errors.is_empty() {
            return None;
        }
        Some(Self { errors })
    }
}

/// Structured 4xx body: the request itself was wrong.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientErrorResponse {
    pub code: i64,
    pub message: String,
}

impl ClientErrorResponse {
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        if !(map.contains_key("code") && map.contains_key("message")) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

/// Plain-text 400 to a cancel or modify of an order in a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderAlreadyFinalized {
    pub message: String,
}

impl fmt::Display for DownstreamErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API rejected the request: {}", self.errors.join("; "))
    }
}

impl fmt::Display for ClientErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API client error {}: {}", self.code, self.message)
    }
}

impl fmt::Display for OrderAlreadyFinalized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order already finalized: {}", self.message)
    }
}

/// The three logical error channels, for callers that want them as an `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogicalError {
    #[error("{0}")]
    Downstream(DownstreamErrorResponse),
    #[error("{0}")]
    Client(ClientErrorResponse),
    #[error("{0}")]
    AlreadyFinalized(OrderAlreadyFinalized),
}

/// Exactly one of the ways a well-formed exchange can end.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Downstream(DownstreamErrorResponse),
    Client(ClientErrorResponse),
    AlreadyFinalized(OrderAlreadyFinalized),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_result(self) -> Result<T, LogicalError> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Downstream(e) => Err(LogicalError::Downstream(e)),
            Outcome::Client(e) => Err(LogicalError::Client(e)),
            Outcome::AlreadyFinalized(e) => Err(LogicalError::AlreadyFinalized(e)),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Downstream(e) => Outcome::Downstream(e),
            Outcome::Client(e) => Outcome::Client(e),
            Outcome::AlreadyFinalized(e) => Outcome::AlreadyFinalized(e),
        }
    }

    fn channel(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::Downstream(_) => "downstream_error",
            Outcome::Client(_) => "client_error",
            Outcome::AlreadyFinalized(_) => "already_finalized",
        }
    }
}

/// Classify one response. Decode failures are errors, never swallowed.
pub fn classify<T: Decode>(call: CallKind, status: u16, body: &[u8]) -> Result<Outcome<T>, WireError> {
    if call == CallKind::Mutation && status == 400 {
        let outcome = Outcome::AlreadyFinalized(OrderAlreadyFinalized {
            message: String::from_utf8_lossy(body).into_owned(),
        });
        trace_outcome(&outcome, status);
        return Ok(outcome);
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| {
        trace_failure("json", status, body, &e.to_string());
        WireError::Json(e)
    })?;

    let outcome = if let Some(errors) = DownstreamErrorResponse::from_value(&value) {
        Outcome::Downstream(errors)
    } else if let Some(error) = ClientErrorResponse::from_value(&value) {
        Outcome::Client(error)
    } else {
        match T::decode(value) {
            Ok(decoded) => Outcome::Success(decoded),
            Err(e) => {
                trace_failure("decode", status, body, &e.to_string());
                return Err(e);
            }
        }
    };
    trace_outcome(&outcome, status);
    Ok(outcome)
}

fn trace_outcome<T>(outcome: &Outcome<T>, status: u16) {
    log(
        Level::Debug,
        Domain::Classify,
        "classify.outcome",
        obj(&[
            ("channel", v_str(outcome.channel())),
            ("status", v_num(status as f64)),
        ]),
    );
}

fn trace_failure(stage: &str, status: u16, body: &[u8], error: &str) {
    log(
        Level::Warn,
        Domain::Classify,
        "classify.failed",
        obj(&[
            ("stage", v_str(stage)),
            ("status", v_num(status as f64)),
            ("body_sha256", v_str(&body_digest(body))),
            ("body_len", v_num(body.len() as f64)),
            ("msg", v_str(error)),
        ]),
    );
}
