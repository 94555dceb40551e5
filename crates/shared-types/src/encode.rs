//! Conversions between [`Value`](crate::value::Value) and `serde_json::Value`.
//!
//! Used by the Compiler/Evaluator to encode an Input Map into the guest wire
//! protocol: a canonical JSON object, integers stay integers, nested
//! structures recurse. Number-preserving decode and the key-name
//! renormalisation rule live in `utils`, which depends on this crate rather
//! than the other way around.

use crate::value::{InputMap, Value};
use serde_json::{Map, Number, Value as Json};

/// Encodes a [`Value`] as canonical JSON. Integers are encoded as JSON
/// integers (never widened to float); `Function`/`Error` have no wire
/// representation and are encoded as their textual `inspect()` form, since
/// an Input Map is never expected to legitimately carry them.
#[must_use]
pub fn value_to_json(value: &Value) -> Json {
  match value {
    Value::None => Json::Null,
    Value::Bool(b) => Json::Bool(*b),
    Value::Int(i) => Json::Number(Number::from(*i)),
    Value::Float(f) => Number::from_f64(*f).map(Json::Number).unwrap_or(Json::Null),
    Value::String(s) => Json::String(s.clone()),
    Value::List(items) | Value::Tuple(items) | Value::Set(items) => {
      Json::Array(items.iter().map(value_to_json).collect())
    }
    Value::Map(entries) => {
      let mut map = Map::new();
      for (k, v) in entries {
        map.insert(k.clone(), value_to_json(v));
      }
      Json::Object(map)
    }
    Value::Function(name) => Json::String(format!("<function {}>", name)),
    Value::Error(msg) => Json::String(format!("<error {}>", msg)),
  }
}

/// Encodes an [`InputMap`] as a canonical JSON object. An empty map encodes
/// to `{}`; callers that want an empty payload to be the empty byte sequence
/// check emptiness before calling this and skip the call entirely.
#[must_use]
pub fn input_map_to_json(map: &InputMap) -> Json {
  let mut object = Map::new();
  for (k, v) in map {
    object.insert(k.clone(), value_to_json(v));
  }
  Json::Object(object)
}
