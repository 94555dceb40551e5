use std::collections::HashMap;

use crate::value::Value;

/// An HTTP-request projection, materialised into the reserved `request`
/// Input Map key. The body is fully buffered ahead of time so projecting
/// it never consumes the caller's original reader.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
  pub method: String,
  pub url: String,
  pub url_string: String,
  pub url_host: String,
  pub url_scheme: String,
  pub url_path: String,
  pub proto: String,
  pub headers: HashMap<String, Vec<String>>,
  pub body: String,
  pub content_length: i64,
  pub host: String,
  pub remote_addr: String,
  pub query_params: HashMap<String, Vec<String>>,
}

impl HttpRequest {
  /// Projects this request into a field-per-table [`Value::Map`] shape.
  /// Pure function of `&self`: calling it twice yields equal maps, and
  /// `self.body` remains readable afterwards.
  #[must_use]
  pub fn to_value(&self) -> Value {
    let multimap = |m: &HashMap<String, Vec<String>>| -> Value {
      Value::Map(
        m.iter()
          .map(|(k, vs)| {
            (
              k.clone(),
              Value::List(vs.iter().cloned().map(Value::String).collect()),
            )
          })
          .collect(),
      )
    };

    Value::Map(vec![
      ("Method".to_string(), Value::String(self.method.clone())),
      ("URL".to_string(), Value::String(self.url.clone())),
      (
        "URL_String".to_string(),
        Value::String(self.url_string.clone()),
      ),
      (
        "URL_Host".to_string(),
        Value::String(self.url_host.clone()),
      ),
      (
        "URL_Scheme".to_string(),
        Value::String(self.url_scheme.clone()),
      ),
      (
        "URL_Path".to_string(),
        Value::String(self.url_path.clone()),
      ),
      ("Proto".to_string(), Value::String(self.proto.clone())),
      ("Headers".to_string(), multimap(&self.headers)),
      ("Body".to_string(), Value::String(self.body.clone())),
      (
        "ContentLength".to_string(),
        Value::Int(self.content_length),
      ),
      ("Host".to_string(), Value::String(self.host.clone())),
      (
        "RemoteAddr".to_string(),
        Value::String(self.remote_addr.clone()),
      ),
      ("QueryParams".to_string(), multimap(&self.query_params)),
    ])
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> HttpRequest {
    HttpRequest {
      method: "GET".to_string(),
      url: "https://example.com/a?b=1".to_string(),
      url_string: "https://example.com/a?b=1".to_string(),
      url_host: "example.com".to_string(),
      url_scheme: "https".to_string(),
      url_path: "/a".to_string(),
      proto: "HTTP/1.1".to_string(),
      headers: HashMap::from([("Accept".to_string(), vec!["*/*".to_string()])]),
      body: "hello".to_string(),
      content_length: 5,
      host: "example.com".to_string(),
      remote_addr: "127.0.0.1:1234".to_string(),
      query_params: HashMap::from([("b".to_string(), vec!["1".to_string()])]),
    }
  }

  #[test]
  fn projection_is_idempotent_and_body_stays_readable() {
    let req = sample();
    let first = req.to_value();
    let second = req.to_value();
    assert_eq!(first, second);
    assert_eq!(req.body, "hello");
  }

  #[test]
  fn projection_carries_every_spec_field() {
    let value = sample().to_value();
    for key in [
      "Method",
      "URL",
      "URL_String",
      "URL_Host",
      "URL_Scheme",
      "URL_Path",
      "Proto",
      "Headers",
      "Body",
      "ContentLength",
      "Host",
      "RemoteAddr",
      "QueryParams",
    ] {
      assert!(value.get(key).is_some(), "missing field {key}");
    }
  }
}
