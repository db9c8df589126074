//! Stored Value Types
//!
//! This module defines [`Value`], the shape of everything the storage layer
//! accepts and returns. It is the JSON data model plus `Undefined`, so any
//! value a browser script could hand to the store has a faithful
//! representation here.
//!
//! ## Conversions
//!
//! - From primitives (`&str`, `String`, `bool`, integers, floats)
//! - From `Vec<T>` and `Option<T>` (where `None` becomes `Null`)
//! - From and to `serde_json::Value`
//!
//! ## JSON Mapping
//!
//! Converting to JSON follows the rules a browser's `JSON.stringify` uses:
//! non-finite numbers become `null`, `Undefined` inside an array becomes
//! `null`, and `Undefined` object members are dropped.

use std::collections::BTreeMap;
use std::fmt;

/// Largest integer an `f64` represents exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A value that can be stored under a key.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// The absence of a value that was still explicitly stored.
    #[default]
    Undefined,

    Null,

    Bool(bool),

    /// All numbers are double precision, as in the browser.
    Number(f64),

    String(String),

    Array(Vec<Value>),

    /// Object members, kept sorted by key.
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Creates a string value.
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Creates an object value from key/value pairs.
    ///
    /// # Example
    /// ```
    /// use stashkv::Value;
    /// let obj = Value::object([("two", Value::from(2))]);
    /// assert_eq!(obj, Value::from(serde_json::json!({"two": 2})));
    /// ```
    pub fn object<K, I>(members: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(members.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Converts the value to JSON.
    ///
    /// Returns `None` only for a top-level `Undefined`, which has no JSON
    /// representation.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        use serde_json::Value as Json;

        let json = match self {
            Value::Undefined => return None,
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => Json::String(s.clone()),
            Value::Array(items) => Json::Array(
                items
                    .iter()
                    .map(|item| item.to_json().unwrap_or(Json::Null))
                    .collect(),
            ),
            Value::Object(members) => Json::Object(
                members
                    .iter()
                    .filter_map(|(k, v)| v.to_json().map(|json| (k.clone(), json)))
                    .collect(),
            ),
        };

        Some(json)
    }

    /// Converts the value to a plain string the way a browser's `String(v)`
    /// does. This is the codec's fallback when structured encoding fails.
    pub fn cast_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Undefined | Value::Null => String::new(),
                    other => other.cast_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
        }
    }
}

/// Integral numbers inside the safe range are emitted without a fraction,
/// so `1` is written as `1` and not `1.0`.
fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(super::encode(self).as_str())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Json::Object(members) => Value::Object(
                members
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

macro_rules! impl_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Number(n as f64)
                }
            }
        )*
    };
}

impl_from_number!(f32, i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(members: BTreeMap<String, Value>) -> Self {
        Value::Object(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_nested() {
        let value = Value::from(json!([{"three": ["one", "two", {"three": 3}]}]));

        let expected = Value::Array(vec![Value::object([(
            "three",
            Value::Array(vec![
                Value::from("one"),
                Value::from("two"),
                Value::object([("three", Value::from(3))]),
            ]),
        )])]);

        assert_eq!(value, expected);
    }

    #[test]
    fn test_to_json_drops_undefined_members() {
        let value = Value::object([("a", Value::from(1)), ("b", Value::Undefined)]);
        assert_eq!(value.to_json(), Some(json!({"a": 1})));

        let array = Value::Array(vec![Value::Undefined, Value::from(true)]);
        assert_eq!(array.to_json(), Some(json!([null, true])));

        assert_eq!(Value::Undefined.to_json(), None);
    }

    #[test]
    fn test_to_json_non_finite_is_null() {
        assert_eq!(Value::Number(f64::NAN).to_json(), Some(json!(null)));
        assert_eq!(Value::Number(f64::INFINITY).to_json(), Some(json!(null)));
    }

    #[test]
    fn test_integral_numbers_have_no_fraction() {
        assert_eq!(Value::from(42).to_json(), Some(json!(42)));
        assert_eq!(Value::from(1.5).to_json(), Some(json!(1.5)));
    }

    #[test]
    fn test_cast_string() {
        assert_eq!(Value::Undefined.cast_string(), "undefined");
        assert_eq!(Value::Number(f64::NAN).cast_string(), "NaN");
        assert_eq!(Value::Number(f64::NEG_INFINITY).cast_string(), "-Infinity");
        assert_eq!(Value::from(vec![1, 2]).cast_string(), "1,2");
        assert_eq!(Value::object([("a", Value::Null)]).cast_string(), "[object Object]");
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }
}
