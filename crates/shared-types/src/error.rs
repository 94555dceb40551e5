use std::fmt;

use thiserror::Error;

/// Errors surfaced by the data plane (Provider Chain).
///
/// `StaticProviderNoRuntimeUpdates` is a sentinel: it must stay identifiable
/// by equality so a composite provider can distinguish "a static child
/// politely declined a write" from a genuine failure (see
/// [`JoinedDataError`] and the composite's absorption rule).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
  #[error("context key must not be empty")]
  EmptyContextKey,

  #[error("unsupported data kind: {0}")]
  UnsupportedDataKind(String),

  #[error("request already set for this evaluation")]
  RequestAlreadySet,

  #[error("static provider does not accept runtime updates")]
  StaticProviderNoRuntimeUpdates,

  #[error(transparent)]
  Joined(#[from] JoinedDataError),
}

impl DataError {
  /// True for the sentinel static-provider write-rejection error, whether
  /// bare or nested inside a [`JoinedDataError`] whose every element is
  /// itself that sentinel (recursively, so a composite of composites of
  /// only static children still absorbs).
  #[must_use]
  pub fn is_static_no_runtime_updates(&self) -> bool {
    match self {
      DataError::StaticProviderNoRuntimeUpdates => true,
      DataError::Joined(JoinedDataError(errors)) => {
        errors.iter().all(DataError::is_static_no_runtime_updates)
      }
      _ => false,
    }
  }
}

/// A non-empty collection of [`DataError`]s accumulated while distributing
/// an item list across a Provider Chain's children via
/// `AddDataToContext`. Mirrors Go's `errors.Join`: never constructed empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedDataError(pub Vec<DataError>);

impl fmt::Display for JoinedDataError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let rendered: Vec<String> = self.0.iter().map(ToString::to_string).collect();
    f.write_str(&rendered.join("; "))
  }
}

impl std::error::Error for JoinedDataError {}

/// Joins zero or more per-child errors the way `AddDataToContext` does:
/// `None` if empty, the single error unwrapped if exactly one, a
/// [`DataError::Joined`] otherwise.
#[must_use]
pub fn join_data_errors(mut errors: Vec<DataError>) -> Option<DataError> {
  match errors.len() {
    0 => None,
    1 => errors.pop(),
    _ => Some(DataError::Joined(JoinedDataError(errors))),
  }
}

/// Errors surfaced by the Compiler (C6) and Evaluator (C7).
#[derive(Error, Debug)]
pub enum EvalError {
  #[error("content must not be nil or empty")]
  ContentNil,

  #[error("validation failed: {0}")]
  ValidationFailed(String),

  #[error("failed to create executable artifact")]
  ExecCreationFailed,

  #[error("compiled module is nil")]
  BytecodeNil,

  #[error("executable content is not of the expected type")]
  InvalidExecutableType,

  #[error("executable artifact is closed")]
  ExecutableClosed,

  #[error("failed to create guest instance: {0}")]
  InstanceCreationFailed(String),

  #[error("guest execution failed: {0}")]
  ExecutionFailed(String),

  #[error("guest execution cancelled")]
  ExecutionCancelled,

  #[error("guest exited with non-zero code {0}")]
  NonZeroExit(u32),

  #[error("executable unit has no data provider")]
  NoDataProvider,

  #[error("executable unit must not be nil")]
  ExecutableUnitNil,

  #[error("execution id must not be empty")]
  EmptyExecutionID,

  #[error(transparent)]
  Data(#[from] DataError),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn join_of_empty_is_none() {
    assert_eq!(join_data_errors(vec![]), None);
  }

  #[test]
  fn join_of_one_is_unwrapped() {
    let joined = join_data_errors(vec![DataError::EmptyContextKey]);
    assert_eq!(joined, Some(DataError::EmptyContextKey));
  }

  #[test]
  fn join_of_many_is_joined_and_displays_all() {
    let joined = join_data_errors(vec![
      DataError::EmptyContextKey,
      DataError::RequestAlreadySet,
    ])
    .unwrap();
    assert!(matches!(joined, DataError::Joined(_)));
    assert!(joined.to_string().contains("context key"));
    assert!(joined.to_string().contains("request already set"));
  }

  #[test]
  fn sentinel_is_identifiable_by_equality() {
    assert!(DataError::StaticProviderNoRuntimeUpdates.is_static_no_runtime_updates());
    assert!(!DataError::EmptyContextKey.is_static_no_runtime_updates());
  }

  #[test]
  fn sentinel_is_identifiable_when_nested_in_a_joined_error() {
    let nested = DataError::Joined(JoinedDataError(vec![
      DataError::StaticProviderNoRuntimeUpdates,
      DataError::StaticProviderNoRuntimeUpdates,
    ]));
    assert!(nested.is_static_no_runtime_updates());

    let mixed = DataError::Joined(JoinedDataError(vec![
      DataError::StaticProviderNoRuntimeUpdates,
      DataError::EmptyContextKey,
    ]));
    assert!(!mixed.is_static_no_runtime_updates());
  }
}
