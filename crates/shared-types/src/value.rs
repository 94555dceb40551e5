use std::fmt;

/// Closed enumeration of value kinds a guest evaluation can produce.
///
/// Classification is by-value on the decoded result (see [`Value::data_type`]);
/// `Error` is reserved for values the runtime cannot otherwise classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
  None,
  Bool,
  Int,
  Float,
  String,
  List,
  Map,
  Tuple,
  Set,
  Function,
  Error,
}

impl fmt::Display for DataType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      DataType::None => "none",
      DataType::Bool => "bool",
      DataType::Int => "int",
      DataType::Float => "float",
      DataType::String => "string",
      DataType::List => "list",
      DataType::Map => "map",
      DataType::Tuple => "tuple",
      DataType::Set => "set",
      DataType::Function => "function",
      DataType::Error => "error",
    };
    f.write_str(name)
  }
}

/// A recursively typed value tree.
///
/// Leaves are scalars (bool, integer, float, string, null); internal nodes
/// are ordered sequences or string-keyed mappings. Map keys are unique;
/// insertion order is preserved (not semantically meaningful, but kept
/// stable for encodings that care, e.g. `Inspect()`).
///
/// `Tuple` and `Set` exist for backends other than WebAssembly that can
/// natively distinguish them from `List`; the WASM/JSON wire protocol never
/// produces them, but the taxonomy must still be able to name them.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  None,
  Bool(bool),
  Int(i64),
  Float(f64),
  String(String),
  List(Vec<Value>),
  Map(Vec<(String, Value)>),
  Tuple(Vec<Value>),
  Set(Vec<Value>),
  Function(String),
  /// A value the runtime could not otherwise classify, carrying a
  /// human-readable description of what it held.
  Error(String),
}

impl Value {
  /// Classifies this value according to the Data Taxonomy.
  #[must_use]
  pub fn data_type(&self) -> DataType {
    match self {
      Value::None => DataType::None,
      Value::Bool(_) => DataType::Bool,
      Value::Int(_) => DataType::Int,
      Value::Float(_) => DataType::Float,
      Value::String(_) => DataType::String,
      Value::List(_) => DataType::List,
      Value::Map(_) => DataType::Map,
      Value::Tuple(_) => DataType::Tuple,
      Value::Set(_) => DataType::Set,
      Value::Function(_) => DataType::Function,
      Value::Error(_) => DataType::Error,
    }
  }

  /// Looks up a key in a `Map` value. Returns `None` for any other variant
  /// or a missing key.
  #[must_use]
  pub fn get(&self, key: &str) -> Option<&Value> {
    match self {
      Value::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
      _ => None,
    }
  }

  /// Textual representation: a stable JSON encoding for maps and lists,
  /// a language-neutral debug form otherwise.
  #[must_use]
  pub fn inspect(&self) -> String {
    match self {
      Value::Map(_) | Value::List(_) | Value::Tuple(_) | Value::Set(_) => {
        serde_json::to_string(&crate::encode::value_to_json(self))
          .unwrap_or_else(|_| format!("{:?}", self))
      }
      Value::String(s) => s.clone(),
      Value::Bool(b) => b.to_string(),
      Value::Int(i) => i.to_string(),
      Value::Float(f) => f.to_string(),
      Value::None => "null".to_string(),
      Value::Function(name) => format!("<function {}>", name),
      Value::Error(msg) => format!("<error {}>", msg),
    }
  }
}

/// A mapping from string keys to [`Value`]s, passed to the guest as a JSON
/// object. Top-level key order is unspecified (shallow-overlay merges do
/// not need to preserve it); use [`Value::Map`] when nested order matters.
pub type InputMap = std::collections::HashMap<String, Value>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn data_type_classifies_every_variant() {
    assert_eq!(Value::None.data_type(), DataType::None);
    assert_eq!(Value::Bool(true).data_type(), DataType::Bool);
    assert_eq!(Value::Int(3).data_type(), DataType::Int);
    assert_eq!(Value::Float(3.5).data_type(), DataType::Float);
    assert_eq!(Value::String("x".into()).data_type(), DataType::String);
    assert_eq!(Value::List(vec![]).data_type(), DataType::List);
    assert_eq!(Value::Map(vec![]).data_type(), DataType::Map);
    assert_eq!(Value::Tuple(vec![]).data_type(), DataType::Tuple);
    assert_eq!(Value::Set(vec![]).data_type(), DataType::Set);
    assert_eq!(
      Value::Function("f".into()).data_type(),
      DataType::Function
    );
    assert_eq!(Value::Error("boom".into()).data_type(), DataType::Error);
  }

  #[test]
  fn get_reads_map_entries_and_ignores_non_maps() {
    let m = Value::Map(vec![("greeting".to_string(), Value::String("hi".into()))]);
    assert_eq!(m.get("greeting"), Some(&Value::String("hi".into())));
    assert_eq!(m.get("missing"), None);
    assert_eq!(Value::Int(1).get("x"), None);
  }

  #[test]
  fn inspect_renders_maps_as_stable_json() {
    let m = Value::Map(vec![("count".to_string(), Value::Int(3))]);
    assert_eq!(m.inspect(), r#"{"count":3}"#);
    assert_eq!(Value::Int(3).inspect(), "3");
    assert_eq!(Value::None.inspect(), "null");
  }
}
