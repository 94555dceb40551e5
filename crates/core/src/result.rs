//! Result Object (C2): the decoded value an `Eval` call hands back, plus
//! the bookkeeping around it.

use std::time::Duration;

use shared_types::{DataType, Value};

use crate::diagnostics::Diagnostics;

/// The outcome of one successful [`crate::evaluator::Evaluator::eval`]
/// call.
pub struct ResultObject {
  value: Value,
  duration: Duration,
  script_exec_id: String,
  diagnostics: Diagnostics,
}

impl ResultObject {
  #[must_use]
  pub fn new(
    value: Value,
    duration: Duration,
    script_exec_id: String,
    diagnostics: Diagnostics,
  ) -> Self {
    Self {
      value,
      duration,
      script_exec_id,
      diagnostics,
    }
  }

  #[must_use]
  pub fn data_type(&self) -> DataType {
    self.value.data_type()
  }

  #[must_use]
  pub fn interface(&self) -> &Value {
    &self.value
  }

  #[must_use]
  pub fn inspect(&self) -> String {
    self.value.inspect()
  }

  #[must_use]
  pub fn script_exec_id(&self) -> &str {
    &self.script_exec_id
  }

  #[must_use]
  pub fn exec_time(&self) -> Duration {
    self.duration
  }

  /// The same duration rendered as a human-readable string, e.g.
  /// `"12.4ms"` or `"1.2s"`. `Duration`'s `Debug` impl already picks the
  /// coarsest readable unit, so this just names that rendering.
  #[must_use]
  pub fn exec_time_human(&self) -> String {
    format!("{:?}", self.duration)
  }

  #[must_use]
  pub fn diagnostics(&self) -> &Diagnostics {
    &self.diagnostics
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn exposes_the_decoded_value_and_its_type() {
    let result = ResultObject::new(
      Value::String("hi".into()),
      Duration::from_millis(5),
      "exec-1".to_string(),
      Diagnostics::default(),
    );
    assert_eq!(result.data_type(), DataType::String);
    assert_eq!(result.interface(), &Value::String("hi".into()));
    assert_eq!(result.inspect(), "hi");
    assert_eq!(result.script_exec_id(), "exec-1");
    assert_eq!(result.exec_time(), Duration::from_millis(5));
    assert_eq!(result.exec_time_human(), "5ms");
  }
}
