//! String Codec
//!
//! Every driver stores plain strings, so values pass through this codec on
//! their way in and out. Encoding and decoding follow an explicit fallback
//! policy instead of failing:
//!
//! ```text
//! encode:  structured (JSON)  ──fail──>  string cast
//! decode:  structured (JSON)  ──fail──>  raw passthrough
//! ```
//!
//! A raw passthrough means the stored text is returned as a string value,
//! which is how data written by other tools (plain strings that are not JSON)
//! stays readable.
//!
//! `Undefined` has no JSON form. It is written as the bare word `undefined`
//! and read back as `Undefined`; a *string* "undefined" is written quoted,
//! so the two never collide.

use super::Value;
use tracing::trace;

/// The stored form of a top-level `Undefined`.
pub const UNDEFINED_SENTINEL: &str = "undefined";

/// The result of encoding a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
    /// JSON text.
    Structured(String),
    /// The value's generic string conversion.
    Cast(String),
}

impl Encoded {
    pub fn as_str(&self) -> &str {
        match self {
            Encoded::Structured(s) | Encoded::Cast(s) => s,
        }
    }

    /// Returns true if structured encoding was not possible.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Encoded::Cast(_))
    }
}

/// The result of decoding a stored string.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// The text parsed as JSON (or was the `undefined` sentinel).
    Structured(Value),
    /// The text was not JSON and is returned unchanged.
    Raw(String),
}

impl Decoded {
    pub fn into_value(self) -> Value {
        match self {
            Decoded::Structured(value) => value,
            Decoded::Raw(raw) => Value::String(raw),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Decoded::Raw(_))
    }
}

/// Encodes a value to its stored string form. Never fails.
pub fn encode(value: &Value) -> Encoded {
    let Some(json) = value.to_json() else {
        return Encoded::Cast(value.cast_string());
    };

    match serde_json::to_string(&json) {
        Ok(text) => Encoded::Structured(text),
        Err(err) => {
            trace!(error = %err, "structured encoding failed, casting to string");
            Encoded::Cast(value.cast_string())
        }
    }
}

/// Decodes a stored string back to a value. Never fails.
pub fn decode(raw: &str) -> Decoded {
    if raw == UNDEFINED_SENTINEL {
        return Decoded::Structured(Value::Undefined);
    }

    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => Decoded::Structured(Value::from(json)),
        Err(err) => {
            trace!(error = %err, "stored text is not JSON, passing through raw");
            Decoded::Raw(raw.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn roundtrip(value: Value) -> Value {
        decode(encode(&value).as_str()).into_value()
    }

    #[test]
    fn test_encode_primitives() {
        assert_eq!(encode(&Value::from("hi")).as_str(), "\"hi\"");
        assert_eq!(encode(&Value::from(12)).as_str(), "12");
        assert_eq!(encode(&Value::from(false)).as_str(), "false");
        assert_eq!(encode(&Value::Null).as_str(), "null");
    }

    #[test]
    fn test_undefined_uses_sentinel() {
        let encoded = encode(&Value::Undefined);
        assert!(encoded.is_fallback());
        assert_eq!(encoded.as_str(), UNDEFINED_SENTINEL);
        assert_eq!(roundtrip(Value::Undefined), Value::Undefined);
    }

    #[test]
    fn test_string_undefined_stays_a_string() {
        assert_eq!(roundtrip(Value::from("undefined")), Value::from("undefined"));
    }

    #[test]
    fn test_decode_raw_passthrough() {
        let decoded = decode("plain text, not json");
        assert!(decoded.is_fallback());
        assert_eq!(decoded.into_value(), Value::from("plain text, not json"));
    }

    #[test]
    fn test_unicode_roundtrip() {
        assert_eq!(roundtrip(Value::from("Ключ и значение")), Value::from("Ключ и значение"));
        assert_eq!(roundtrip(Value::from("⦶")), Value::from("⦶"));
    }

    #[test]
    fn test_nested_roundtrip() {
        let nested = Value::from(json!([{"three": ["one", "two", {"three": 3}]}]));
        assert_eq!(roundtrip(nested.clone()), nested);
    }

    #[test]
    fn test_nan_degrades_to_null() {
        assert_eq!(roundtrip(Value::Number(f64::NAN)), Value::Null);
    }
}
