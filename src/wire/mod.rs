//! Normalization of the upstream wire format's inconsistent shapes.
//!
//! The API encodes "a list of things" three different ways: the literal string
//! `"null"` for zero, a bare mapping for one and an array for many. Every such
//! field is first classified into a [`Ragged`] and only then decoded.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::WireError;
use crate::logging::{log, obj, v_num, v_str, Domain, Level};

pub mod constrained;
pub mod integral;
pub mod timestamp;

const EMPTY_MARKER: &str = "null";

/// Shape of a logically list-valued wire field.
#[derive(Debug, Clone, PartialEq)]
pub enum Ragged {
    Null,
    One(Value),
    Many(Vec<Value>),
}

impl Ragged {
    pub fn into_vec(self) -> Vec<Value> {
        match self {
            Ragged::Null => Vec::new(),
            Ragged::One(value) => vec![value],
            Ragged::Many(values) => values,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Ragged::Null => 0,
            Ragged::One(_) => 1,
            Ragged::Many(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn shape(&self) -> &'static str {
        match self {
            Ragged::Null => "null",
            Ragged::One(_) => "one",
            Ragged::Many(_) => "many",
        }
    }
}

fn trace_shape(field: &str, ragged: &Ragged) {
    log(
        Level::Trace,
        Domain::Decode,
        "wire.coerced",
        obj(&[
            ("field", v_str(field)),
            ("shape", v_str(ragged.shape())),
            ("members", v_num(ragged.len() as f64)),
        ]),
    );
}

/// Coerce a field that wraps its members under a singular key.
///
/// `"null"` is empty, `{key: {..}}` is one member, `{key: [..]}` is many. Any
/// other mapping (or a falsy value under `key`) is a cardinality error.
pub fn wrapped(field: &'static str, key: &'static str, raw: Value) -> Result<Ragged, WireError> {
    if is_empty_marker(&raw) {
        trace_shape(field, &Ragged::Null);
        return Ok(Ragged::Null);
    }
    let inner = match raw {
        Value::Object(mut map) => map.remove(key),
        _ => None,
    };
    let ragged = match inner {
        Some(value) if !is_falsy(&value) => member_shape(field, value)?,
        _ => return Err(WireError::Cardinality { field, key }),
    };
    trace_shape(field, &ragged);
    Ok(ragged)
}

/// Coerce a field whose single member appears as a bare mapping.
///
/// Absence, JSON null and the `"null"` marker are all empty.
pub fn bare(field: &'static str, raw: Option<Value>) -> Result<Ragged, WireError> {
    match raw {
        None | Some(Value::Null) => Ok(Ragged::Null),
        Some(value) if is_empty_marker(&value) => Ok(Ragged::Null),
        Some(value) => {
            let ragged = member_shape(field, value)?;
            trace_shape(field, &ragged);
            Ok(ragged)
        }
    }
}

/// Coerce a string field that may also be an array of strings.
pub fn scalar_or_list(field: &'static str, raw: Option<Value>) -> Result<Ragged, WireError> {
    match raw {
        None | Some(Value::Null) => Ok(Ragged::Null),
        Some(value @ Value::String(_)) => Ok(Ragged::One(value)),
        Some(Value::Array(values)) => Ok(Ragged::Many(values)),
        Some(other) => Err(WireError::structural(
            field,
            format!("expected a string or a list, got {}", describe(&other)),
        )),
    }
}

fn member_shape(field: &'static str, value: Value) -> Result<Ragged, WireError> {
    match value {
        Value::Object(_) => Ok(Ragged::One(value)),
        Value::Array(values) => Ok(Ragged::Many(values)),
        other => Err(WireError::structural(
            field,
            format!("expected a mapping or a list, got {}", describe(&other)),
        )),
    }
}

fn is_empty_marker(value: &Value) -> bool {
    matches!(value, Value::String(s) if s == EMPTY_MARKER)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(m) => m.is_empty(),
    }
}

pub(crate) fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

/// A response body shape that can be decoded from parsed JSON.
pub trait Decode: Sized {
    fn decode(value: Value) -> Result<Self, WireError>;
}

/// Plain serde decode, with failures reported against `record`.
pub(crate) fn decode_record<T: DeserializeOwned>(record: &'static str, value: Value) -> Result<T, WireError> {
    serde_json::from_value(value).map_err(|e| WireError::structural(record, e))
}

/// Remove a required top-level field from a response body.
pub(crate) fn take_field(
    record: &'static str,
    field: &'static str,
    value: Value,
) -> Result<Value, WireError> {
    match value {
        Value::Object(mut map) => map
            .remove(field)
            .ok_or_else(|| WireError::structural(record, format!("missing field `{field}`"))),
        other => Err(WireError::structural(
            record,
            format!("expected a mapping, got {}", describe(&other)),
        )),
    }
}

/// Borrow `value` as a mapping or fail naming `record`.
pub(crate) fn as_object<'a>(
    record: &'static str,
    value: &'a Value,
) -> Result<&'a Map<String, Value>, WireError> {
    value
        .as_object()
        .ok_or_else(|| WireError::structural(record, format!("expected a mapping, got {}", describe(value))))
}

/// Read the string discriminator `field` of a record.
pub(crate) fn tag_of<'a>(
    record: &'static str,
    field: &'static str,
    value: &'a Value,
) -> Result<&'a str, WireError> {
    match as_object(record, value)?.get(field) {
        Some(Value::String(tag)) => Ok(tag),
        Some(other) => Err(WireError::structural(
            record,
            format!("tag field `{field}` must be a string, got {}", describe(other)),
        )),
        None => Err(WireError::structural(record, format!("missing tag field `{field}`"))),
    }
}

/// Flat string key/value pairs, as sent in a form-encoded request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields(BTreeMap<String, String>);

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `application/x-www-form-urlencoded` body.
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }

    /// Build from a serialized record. Nulls are dropped; scalars are stringified.
    pub(crate) fn from_serialized(record: &'static str, value: Value) -> Result<Self, WireError> {
        let Value::Object(map) = value else {
            return Err(WireError::structural(record, "serialized request is not a mapping"));
        };
        let mut fields = FormFields::new();
        for (key, value) in map {
            match value {
                Value::Null => {}
                Value::String(s) => fields.insert(key, s),
                Value::Number(n) => fields.insert(key, n.to_string()),
                Value::Bool(b) => fields.insert(key, b.to_string()),
                other => {
                    return Err(WireError::structural(
                        record,
                        format!("field `{key}` cannot be form encoded ({})", describe(&other)),
                    ))
                }
            }
        }
        Ok(fields)
    }

    /// The fields as a JSON mapping of strings, for serde-driven decoding.
    pub(crate) fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = FormFields::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}
