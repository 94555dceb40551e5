//! Provider Chain (C3): the read/write data plane an evaluation draws its
//! Input Map from. `StaticProvider`, `ContextProvider`, and
//! `CompositeProvider` are the three required shapes; callers can implement
//! [`DataProvider`] directly for anything else.

use std::collections::HashMap;

use shared_types::{ContextItem, DataError, InputMap, Value, join_data_errors};

use crate::context::EvalContext;

/// Reserved sub-key an HTTP-request `ContextItem` is materialised under.
pub const REQUEST_KEY: &str = "request";
/// Reserved sub-key an Input-Map `ContextItem` is merged under.
pub const INPUT_DATA_KEY: &str = "input_data";

/// A source (and optional sink) of Input Map data for an evaluation.
///
/// `get_data` must not mutate `ctx`; `add_data_to_context` takes `ctx` by
/// value and returns the (possibly unchanged) successor, mirroring how a Go
/// `context.Context` is threaded by returning a derived value rather than
/// mutated in place.
pub trait DataProvider: Send + Sync {
  fn get_data(&self, ctx: &EvalContext) -> Result<InputMap, DataError>;

  fn add_data_to_context(
    &self,
    ctx: EvalContext,
    items: &[ContextItem],
  ) -> (EvalContext, Option<DataError>);
}

/// A fixed, read-only snapshot. Never mutated; any write attempt is
/// rejected with the [`DataError::StaticProviderNoRuntimeUpdates`] sentinel.
pub struct StaticProvider {
  snapshot: InputMap,
}

impl StaticProvider {
  #[must_use]
  pub fn new(snapshot: InputMap) -> Self {
    Self { snapshot }
  }
}

impl DataProvider for StaticProvider {
  fn get_data(&self, _ctx: &EvalContext) -> Result<InputMap, DataError> {
    Ok(self.snapshot.clone())
  }

  fn add_data_to_context(
    &self,
    ctx: EvalContext,
    _items: &[ContextItem],
  ) -> (EvalContext, Option<DataError>) {
    (ctx, Some(DataError::StaticProviderNoRuntimeUpdates))
  }
}

/// Reads and writes a per-key slot of an [`EvalContext`]. Construction fails
/// for an empty key since an empty key cannot name a distinct slot.
pub struct ContextProvider {
  key: String,
}

impl ContextProvider {
  pub fn new(key: impl Into<String>) -> Result<Self, DataError> {
    let key = key.into();
    if key.is_empty() {
      return Err(DataError::EmptyContextKey);
    }
    Ok(Self { key })
  }

  #[must_use]
  pub fn key(&self) -> &str {
    &self.key
  }
}

impl DataProvider for ContextProvider {
  fn get_data(&self, ctx: &EvalContext) -> Result<InputMap, DataError> {
    Ok(ctx.get_map(&self.key))
  }

  fn add_data_to_context(
    &self,
    mut ctx: EvalContext,
    items: &[ContextItem],
  ) -> (EvalContext, Option<DataError>) {
    let mut map = ctx.get_map(&self.key);
    let mut errors = Vec::new();
    let mut request_already_seen = false;

    for item in items {
      match item {
        ContextItem::InputMap(incoming) => merge_input_data(&mut map, incoming),
        ContextItem::Request(request) => {
          if request_already_seen {
            errors.push(DataError::RequestAlreadySet);
            continue;
          }
          request_already_seen = true;
          map.insert(REQUEST_KEY.to_string(), request.to_value());
        }
        ContextItem::Other(kind) => {
          errors.push(DataError::UnsupportedDataKind((*kind).to_string()));
        }
      }
    }

    ctx.set_map(&self.key, map);
    (ctx, join_data_errors(errors))
  }
}

/// Merges `incoming` into the `input_data` sub-key of `map`, overwriting
/// existing keys with the same name and leaving the rest untouched.
fn merge_input_data(map: &mut InputMap, incoming: &InputMap) {
  let mut entries: Vec<(String, Value)> = match map.get(INPUT_DATA_KEY) {
    Some(Value::Map(existing)) => existing.clone(),
    _ => Vec::new(),
  };

  for (key, value) in incoming {
    if let Some(slot) = entries.iter_mut().find(|(k, _)| k == key) {
      slot.1 = value.clone();
    } else {
      entries.push((key.clone(), value.clone()));
    }
  }

  map.insert(INPUT_DATA_KEY.to_string(), Value::Map(entries));
}

/// Fans a single `get_data`/`add_data_to_context` call out across children.
///
/// `get_data` overlays each child's map on top of the previous one
/// (shallow: later top-level keys win, nested maps are not merged) and
/// fails fast on the first child error. `add_data_to_context` fans the same
/// item list out to every child, absorbing
/// [`DataError::StaticProviderNoRuntimeUpdates`] whenever at least one
/// child accepted the write (so a composite of one static and one dynamic
/// child never fails purely because the static half predictably declined).
/// A nil entry in `children` is skipped during composition.
#[derive(Default)]
pub struct CompositeProvider {
  children: Vec<Option<Box<dyn DataProvider>>>,
}

impl CompositeProvider {
  #[must_use]
  pub fn new(children: Vec<Option<Box<dyn DataProvider>>>) -> Self {
    Self { children }
  }

  #[must_use]
  pub fn empty() -> Self {
    Self::default()
  }

  pub fn push(&mut self, child: Box<dyn DataProvider>) {
    self.children.push(Some(child));
  }
}

impl DataProvider for CompositeProvider {
  fn get_data(&self, ctx: &EvalContext) -> Result<InputMap, DataError> {
    let mut merged: InputMap = HashMap::new();
    for child in self.children.iter().flatten() {
      let data = child.get_data(ctx)?;
      merged.extend(data);
    }
    Ok(merged)
  }

  fn add_data_to_context(
    &self,
    ctx: EvalContext,
    items: &[ContextItem],
  ) -> (EvalContext, Option<DataError>) {
    let original = ctx.clone();
    let mut current = ctx;
    let mut any_success = false;
    let mut errors = Vec::new();

    for child in self.children.iter().flatten() {
      let (updated, err) = child.add_data_to_context(current.clone(), items);
      match err {
        None => {
          current = updated;
          any_success = true;
        }
        Some(e) => errors.push(e),
      }
    }

    if any_success {
      errors.retain(|e| !e.is_static_no_runtime_updates());
      (current, join_data_errors(errors))
    } else {
      (original, join_data_errors(errors))
    }
  }
}

/// Recursively merges `incoming` into `base`, descending into nested
/// `Value::Map` pairs instead of overwriting them wholesale. Exists only to
/// document, and let tests pin down, the deliberate difference from
/// [`CompositeProvider::get_data`]'s shallow `HashMap::extend`: real
/// Provider Chains never call this, since a later child silently absorbing
/// only part of an earlier child's nested map would be a surprising,
/// hard-to-audit form of precedence.
#[cfg(test)]
fn deep_merge(base: &mut InputMap, incoming: &InputMap) {
  for (key, incoming_value) in incoming {
    match (base.get_mut(key), incoming_value) {
      (Some(Value::Map(base_entries)), Value::Map(incoming_entries)) => {
        let mut base_map: InputMap = base_entries.iter().cloned().collect();
        let incoming_map: InputMap = incoming_entries.iter().cloned().collect();
        deep_merge(&mut base_map, &incoming_map);
        let mut merged: Vec<(String, Value)> = base_map.into_iter().collect();
        merged.sort_by(|a, b| a.0.cmp(&b.0));
        base.insert(key.clone(), Value::Map(merged));
      }
      _ => {
        base.insert(key.clone(), incoming_value.clone());
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use shared_types::HttpRequest;

  fn sample_request() -> HttpRequest {
    HttpRequest {
      method: "GET".to_string(),
      url: "https://example.com/".to_string(),
      url_string: "https://example.com/".to_string(),
      url_host: "example.com".to_string(),
      url_scheme: "https".to_string(),
      url_path: "/".to_string(),
      proto: "HTTP/1.1".to_string(),
      headers: HashMap::new(),
      body: String::new(),
      content_length: 0,
      host: "example.com".to_string(),
      remote_addr: "127.0.0.1:1".to_string(),
      query_params: HashMap::new(),
    }
  }

  #[test]
  fn static_provider_returns_a_clone_of_its_snapshot() {
    let snapshot = InputMap::from([("greeting".to_string(), Value::String("hi".into()))]);
    let provider = StaticProvider::new(snapshot);
    let data = provider.get_data(&EvalContext::new()).unwrap();
    assert_eq!(data.get("greeting"), Some(&Value::String("hi".into())));
  }

  #[test]
  fn static_provider_rejects_writes() {
    let provider = StaticProvider::new(InputMap::new());
    let (_ctx, err) = provider.add_data_to_context(EvalContext::new(), &[]);
    assert_eq!(err, Some(DataError::StaticProviderNoRuntimeUpdates));
  }

  #[test]
  fn context_provider_rejects_empty_key() {
    assert_eq!(ContextProvider::new(""), Err(DataError::EmptyContextKey));
  }

  #[test]
  fn context_provider_merges_input_data_overwriting_shared_keys() {
    let provider = ContextProvider::new("slot").unwrap();
    let first = InputMap::from([
      ("a".to_string(), Value::Int(1)),
      ("b".to_string(), Value::Int(2)),
    ]);
    let (ctx, err) = provider.add_data_to_context(
      EvalContext::new(),
      &[ContextItem::InputMap(first)],
    );
    assert!(err.is_none());

    let second = InputMap::from([("b".to_string(), Value::Int(20))]);
    let (ctx, err) =
      provider.add_data_to_context(ctx, &[ContextItem::InputMap(second)]);
    assert!(err.is_none());

    let data = provider.get_data(&ctx).unwrap();
    let Some(Value::Map(entries)) = data.get(INPUT_DATA_KEY) else {
      panic!("expected input_data map");
    };
    let as_map: HashMap<_, _> = entries.iter().cloned().collect();
    assert_eq!(as_map.get("a"), Some(&Value::Int(1)));
    assert_eq!(as_map.get("b"), Some(&Value::Int(20)));
  }

  #[test]
  fn context_provider_rejects_second_request_in_same_call() {
    let provider = ContextProvider::new("slot").unwrap();
    let items = [
      ContextItem::Request(sample_request()),
      ContextItem::Request(sample_request()),
    ];
    let (_ctx, err) = provider.add_data_to_context(EvalContext::new(), &items);
    assert_eq!(err, Some(DataError::RequestAlreadySet));
  }

  #[test]
  fn context_provider_reports_unsupported_kind() {
    let provider = ContextProvider::new("slot").unwrap();
    let (_ctx, err) =
      provider.add_data_to_context(EvalContext::new(), &[ContextItem::Other("blob")]);
    assert_eq!(
      err,
      Some(DataError::UnsupportedDataKind("blob".to_string()))
    );
  }

  #[test]
  fn composite_overlays_children_shallowly_later_wins() {
    let mut composite = CompositeProvider::empty();
    composite.push(Box::new(StaticProvider::new(InputMap::from([(
      "k".to_string(),
      Value::Int(1),
    )]))));
    composite.push(Box::new(StaticProvider::new(InputMap::from([(
      "k".to_string(),
      Value::Int(2),
    )]))));

    let data = composite.get_data(&EvalContext::new()).unwrap();
    assert_eq!(data.get("k"), Some(&Value::Int(2)));
  }

  #[test]
  fn composite_absorbs_static_sentinel_when_a_sibling_succeeds() {
    let mut composite = CompositeProvider::empty();
    composite.push(Box::new(StaticProvider::new(InputMap::new())));
    composite.push(Box::new(ContextProvider::new("slot").unwrap()));

    let (_ctx, err) = composite.add_data_to_context(EvalContext::new(), &[]);
    assert!(err.is_none());
  }

  #[test]
  fn composite_absorbs_a_nested_all_static_composite_when_a_sibling_succeeds() {
    let mut inner = CompositeProvider::empty();
    inner.push(Box::new(StaticProvider::new(InputMap::new())));
    inner.push(Box::new(StaticProvider::new(InputMap::new())));

    let mut outer = CompositeProvider::empty();
    outer.push(Box::new(inner));
    outer.push(Box::new(ContextProvider::new("slot").unwrap()));

    let (_ctx, err) = outer.add_data_to_context(EvalContext::new(), &[]);
    assert!(err.is_none());
  }

  #[test]
  fn composite_surfaces_all_errors_when_every_child_fails() {
    let mut composite = CompositeProvider::empty();
    composite.push(Box::new(StaticProvider::new(InputMap::new())));
    composite.push(Box::new(StaticProvider::new(InputMap::new())));

    let (ctx, err) = composite.add_data_to_context(EvalContext::new(), &[]);
    assert!(err.is_some());
    assert!(ctx.get_map("anything").is_empty());
  }

  #[test]
  fn composite_get_data_is_shallow_not_deep() {
    let mut composite = CompositeProvider::empty();
    composite.push(Box::new(StaticProvider::new(InputMap::from([(
      "nested".to_string(),
      Value::Map(vec![
        ("a".to_string(), Value::Int(1)),
        ("b".to_string(), Value::Int(2)),
      ]),
    )]))));
    composite.push(Box::new(StaticProvider::new(InputMap::from([(
      "nested".to_string(),
      Value::Map(vec![("b".to_string(), Value::Int(20))]),
    )]))));

    let data = composite.get_data(&EvalContext::new()).unwrap();
    // The second child's "nested" map replaces the first's entirely: "a"
    // does not survive, unlike a deep merge.
    assert_eq!(
      data.get("nested"),
      Some(&Value::Map(vec![("b".to_string(), Value::Int(20))]))
    );
  }

  #[test]
  fn deep_merge_descends_into_nested_maps_instead_of_replacing_them() {
    let mut base = InputMap::from([(
      "nested".to_string(),
      Value::Map(vec![
        ("a".to_string(), Value::Int(1)),
        ("b".to_string(), Value::Int(2)),
      ]),
    )]);
    let incoming = InputMap::from([(
      "nested".to_string(),
      Value::Map(vec![("b".to_string(), Value::Int(20))]),
    )]);

    deep_merge(&mut base, &incoming);

    let Some(Value::Map(entries)) = base.get("nested") else {
      panic!("expected a nested map");
    };
    let as_map: HashMap<_, _> = entries.iter().cloned().collect();
    assert_eq!(as_map.get("a"), Some(&Value::Int(1)));
    assert_eq!(as_map.get("b"), Some(&Value::Int(20)));
  }

  #[test]
  fn composite_skips_nil_children() {
    let mut composite = CompositeProvider::new(vec![None]);
    composite.push(Box::new(StaticProvider::new(InputMap::from([(
      "k".to_string(),
      Value::Int(7),
    )]))));
    let data = composite.get_data(&EvalContext::new()).unwrap();
    assert_eq!(data.get("k"), Some(&Value::Int(7)));
  }
}
