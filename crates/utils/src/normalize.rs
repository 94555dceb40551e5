//! Number-preserving JSON decode and key-name renormalisation. The
//! Evaluator decodes guest output with a deferred-number JSON parser
//! (arbitrary-precision numbers) and then walks the tree once, resolving
//! each number to `Int` or `Float` based on the map key it is attached to.
//! This module implements that single walk.

use serde_json::{Number, Value as Json};
use shared_types::Value;

/// Decodes a raw `serde_json::Value` (as produced by a number-preserving
/// parse) into a [`Value`] tree, applying the key-name integer rule as it
/// goes: a map entry whose key is `count`, or ends with `_count`, `_id`, or
/// `Id`, and whose value is a deferred number convertible to an integer,
/// becomes [`Value::Int`]; every other number becomes [`Value::Float`].
#[must_use]
pub fn json_to_value(json: Json) -> Value {
  decode(json, None)
}

fn decode(json: Json, key_hint: Option<&str>) -> Value {
  match json {
    Json::Null => Value::None,
    Json::Bool(b) => Value::Bool(b),
    Json::Number(n) => classify_number(key_hint, &n),
    Json::String(s) => Value::String(s),
    Json::Array(items) => Value::List(items.into_iter().map(|v| decode(v, None)).collect()),
    Json::Object(map) => Value::Map(
      map
        .into_iter()
        .map(|(k, v)| {
          let decoded = decode(v, Some(&k));
          (k, decoded)
        })
        .collect(),
    ),
  }
}

fn classify_number(key_hint: Option<&str>, n: &Number) -> Value {
  if key_hint.is_some_and(looks_like_integer_key) {
    if let Some(i) = n.as_i64() {
      return Value::Int(i);
    }
  }
  Value::Float(n.as_f64().unwrap_or(0.0))
}

/// The key-name renormalisation rule, exposed standalone so it can be
/// tested and reused without a full JSON round trip.
#[must_use]
pub fn looks_like_integer_key(key: &str) -> bool {
  key == "count" || key.ends_with("_count") || key.ends_with("_id") || key.ends_with("Id")
}
