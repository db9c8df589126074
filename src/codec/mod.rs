//! Value Codec
//!
//! Serializes [`Value`]s to strings and back so they can travel through the
//! string-only media (name/value stores and cookies).
//!
//! ## Modules
//!
//! - `types`: Defines the `Value` enum and its conversions
//! - `json`: The encode/decode fallback policy
//!
//! ## Example
//!
//! ```
//! use stashkv::codec::{decode, encode, Value};
//!
//! let stored = encode(&Value::from(vec![1, 2, 3]));
//! assert_eq!(stored.as_str(), "[1,2,3]");
//!
//! let value = decode("not json").into_value();
//! assert_eq!(value, Value::from("not json"));
//! ```

pub mod json;
pub mod types;

pub use json::{decode, encode, Decoded, Encoded, UNDEFINED_SENTINEL};
pub use types::Value;
