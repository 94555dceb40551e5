use crate::request::HttpRequest;
use crate::value::InputMap;

/// A heterogeneous item passed to a Provider Chain's `AddDataToContext`.
/// `Other` exists for forward-compatibility and for tests that
/// need to drive the `UnsupportedDataKind` path deterministically; no
/// production caller constructs it.
#[derive(Debug, Clone)]
pub enum ContextItem {
  /// Merged into the Input Map stored under the provider's context key,
  /// under the `input_data` sub-key; existing `input_data` keys are
  /// overwritten by incoming keys.
  InputMap(InputMap),
  /// Materialised into the reserved `request` sub-key.
  Request(HttpRequest),
  /// A kind no context provider recognises.
  Other(&'static str),
}
