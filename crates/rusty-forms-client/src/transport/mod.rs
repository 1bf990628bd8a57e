//! HTTP collaborator
//!
//! [`Transport`] posts the collected payload and hands back the raw response
//! body. [`encode_form_body`] renders a payload the way `$.param` does, for
//! transports that speak `application/x-www-form-urlencoded`.

use crate::error::TransportError;
use crate::Payload;
use async_trait::async_trait;
use serde_json::Value;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::HttpTransport;

/// Sends form payloads to a server endpoint
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `payload` to `url`, returning the raw response body
    async fn post(&self, url: &str, payload: &Payload) -> Result<String, TransportError>;
}

/// Encode a payload as an urlencoded body
///
/// Nested objects become `a[b][c]=v`, arrays of scalars `a[]=v` and arrays
/// of containers `a[0][b]=v`. `null` encodes as an empty value and spaces
/// as `+`.
pub fn encode_form_body(payload: &Payload) -> String {
    let mut pairs = Vec::new();
    for (key, value) in payload {
        push_pairs(&mut pairs, key, value);
    }
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn push_pairs(pairs: &mut Vec<(String, String)>, prefix: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                push_pairs(pairs, &format!("{}[{}]", prefix, key), inner);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                if item.is_object() || item.is_array() {
                    push_pairs(pairs, &format!("{}[{}]", prefix, index), item);
                } else {
                    push_pairs(pairs, &format!("{}[]", prefix), item);
                }
            }
        }
        Value::Null => pairs.push((prefix.to_string(), String::new())),
        Value::String(s) => pairs.push((prefix.to_string(), s.clone())),
        other => pairs.push((prefix.to_string(), other.to_string())),
    }
}

fn encode_component(raw: &str) -> String {
    urlencoding::encode(raw).replace("%20", "+")
}
