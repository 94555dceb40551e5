//! Evaluator (C7): runs the `Eval` algorithm against an
//! [`ExecutableUnit`].
//!
//! `BytecodeNil` and `InvalidExecutableType` stay on [`EvalError`] for API
//! completeness -- a host that plugs in more than one backend could hit
//! them if a unit's artifact type mismatches its compiler -- but the single
//! WebAssembly backend in this repo can never construct an
//! [`ExecutableUnit`] that triggers either one, since `ExecutableUnit<A>`
//! is generic over a single concrete artifact type `A`.

use std::sync::Arc;
use std::time::Instant;

use shared_types::{EvalError, Value};
use utils::json_to_value;

use crate::artifact::{ExecutableArtifact, GuestInstance, InstanceConfig};
use crate::context::EvalContext;
use crate::providers::DataProvider;
use crate::result::ResultObject;
use crate::unit::ExecutableUnit;

/// Runs `PrepareContext`/`Eval` against one [`ExecutableUnit`].
///
/// Constructing an `Evaluator` with no unit fails immediately with
/// [`EvalError::ExecutableUnitNil`] rather than deferring that check into
/// every `eval` call, moved to the one place a unit can be absent.
pub struct Evaluator<A: ExecutableArtifact> {
  unit: Arc<ExecutableUnit<A>>,
}

impl<A: ExecutableArtifact> Evaluator<A> {
  pub fn new(unit: Option<Arc<ExecutableUnit<A>>>) -> Result<Self, EvalError> {
    let unit = unit.ok_or(EvalError::ExecutableUnitNil)?;
    Ok(Self { unit })
  }

  /// Fans `items` out across the unit's Provider Chain, returning the
  /// updated context and any accumulated error (`AddDataToContext`,
  /// surfaced through the unit rather than called directly on a provider).
  pub fn prepare_context(
    &self,
    ctx: EvalContext,
    items: &[shared_types::ContextItem],
  ) -> (EvalContext, Option<EvalError>) {
    match self.unit.providers() {
      None => (ctx, Some(EvalError::NoDataProvider)),
      Some(providers) => {
        let (ctx, err) = providers.add_data_to_context(ctx, items);
        (ctx, err.map(EvalError::from))
      }
    }
  }

  /// Runs the eight-step `Eval` algorithm: validate, gather data, encode,
  /// instantiate, invoke, decode, release, return.
  pub fn eval(&self, ctx: EvalContext) -> Result<ResultObject, EvalError> {
    self.validate()?;

    let providers = self.unit.providers().ok_or(EvalError::NoDataProvider)?;
    let input_map = providers.get_data(&ctx)?;

    let encoded = if input_map.is_empty() {
      Vec::new()
    } else {
      serde_json::to_vec(&shared_types::encode::input_map_to_json(&input_map))
        .map_err(|e| EvalError::ValidationFailed(e.to_string()))?
    };

    let artifact = self.unit.artifact();
    let mut instance = artifact.instance(&ctx, &InstanceConfig::default())?;

    let start = Instant::now();
    let invocation = instance.call_with_context(&ctx, artifact.entry_point(), &encoded);
    let elapsed = start.elapsed();

    let (exit_code, output_bytes) = match invocation {
      Ok(pair) => pair,
      Err(err) => {
        drop(instance);
        return if ctx.is_cancelled() {
          Err(EvalError::ExecutionCancelled)
        } else {
          Err(err)
        };
      }
    };
    drop(instance);

    if exit_code != 0 {
      return Err(EvalError::NonZeroExit(exit_code));
    }

    let decoded = decode_output(&output_bytes);

    Ok(ResultObject::new(
      decoded,
      elapsed,
      self.unit.id().to_string(),
      artifact.diagnostics(),
    ))
  }

  fn validate(&self) -> Result<(), EvalError> {
    if self.unit.artifact().bytes().is_empty() {
      return Err(EvalError::ContentNil);
    }
    if self.unit.id().is_empty() {
      return Err(EvalError::EmptyExecutionID);
    }
    Ok(())
  }
}

/// JSON-decodes `bytes`; falls back to the raw UTF-8 string if decoding
/// fails.
fn decode_output(bytes: &[u8]) -> Value {
  match serde_json::from_slice::<serde_json::Value>(bytes) {
    Ok(json) => json_to_value(json),
    Err(_) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::artifact::ExecutableArtifact;
  use crate::diagnostics::Diagnostics;
  use crate::providers::StaticProvider;
  use shared_types::InputMap;
  use std::sync::Mutex;

  struct StubInstance {
    exit_code: u32,
    output: Vec<u8>,
    fail: bool,
  }

  impl GuestInstance for StubInstance {
    fn function_exists(&mut self, _name: &str) -> bool {
      true
    }

    fn call_with_context(
      &mut self,
      _ctx: &EvalContext,
      _name: &str,
      _input: &[u8],
    ) -> Result<(u32, Vec<u8>), EvalError> {
      if self.fail {
        Err(EvalError::ExecutionFailed("boom".to_string()))
      } else {
        Ok((self.exit_code, self.output.clone()))
      }
    }
  }

  struct StubArtifact {
    entry_point: String,
    bytes: Vec<u8>,
    closed: Mutex<bool>,
    exit_code: u32,
    output: Vec<u8>,
    fail: bool,
  }

  impl ExecutableArtifact for StubArtifact {
    type Instance = StubInstance;

    fn entry_point(&self) -> &str {
      &self.entry_point
    }

    fn bytes(&self) -> &[u8] {
      &self.bytes
    }

    fn is_closed(&self) -> bool {
      *self.closed.lock().unwrap()
    }

    fn close(&self) -> Result<(), EvalError> {
      *self.closed.lock().unwrap() = true;
      Ok(())
    }

    fn diagnostics(&self) -> Diagnostics {
      Diagnostics::default()
    }

    fn instance(
      &self,
      _ctx: &EvalContext,
      _config: &InstanceConfig,
    ) -> Result<Self::Instance, EvalError> {
      if self.is_closed() {
        return Err(EvalError::ExecutableClosed);
      }
      Ok(StubInstance {
        exit_code: self.exit_code,
        output: self.output.clone(),
        fail: self.fail,
      })
    }
  }

  fn unit_with(artifact: StubArtifact) -> Arc<ExecutableUnit<StubArtifact>> {
    let providers: Arc<dyn DataProvider> = Arc::new(StaticProvider::new(InputMap::new()));
    Arc::new(ExecutableUnit::new("unit-1", Arc::new(artifact), Some(providers)))
  }

  #[test]
  fn rejects_nil_unit_at_construction() {
    let result: Result<Evaluator<StubArtifact>, _> = Evaluator::new(None);
    assert!(matches!(result, Err(EvalError::ExecutableUnitNil)));
  }

  #[test]
  fn rejects_empty_artifact_content() {
    let unit = unit_with(StubArtifact {
      entry_point: "main".to_string(),
      bytes: Vec::new(),
      closed: Mutex::new(false),
      exit_code: 0,
      output: b"null".to_vec(),
      fail: false,
    });
    let evaluator = Evaluator::new(Some(unit)).unwrap();
    assert!(matches!(
      evaluator.eval(EvalContext::new()),
      Err(EvalError::ContentNil)
    ));
  }

  #[test]
  fn decodes_successful_json_output() {
    let unit = unit_with(StubArtifact {
      entry_point: "main".to_string(),
      bytes: b"\0asm".to_vec(),
      closed: Mutex::new(false),
      exit_code: 0,
      output: b"{\"ok\":true}".to_vec(),
      fail: false,
    });
    let evaluator = Evaluator::new(Some(unit)).unwrap();
    let result = evaluator.eval(EvalContext::new()).unwrap();
    assert_eq!(
      result.interface().get("ok"),
      Some(&Value::Bool(true))
    );
  }

  #[test]
  fn falls_back_to_raw_string_on_undecodable_output() {
    let unit = unit_with(StubArtifact {
      entry_point: "main".to_string(),
      bytes: b"\0asm".to_vec(),
      closed: Mutex::new(false),
      exit_code: 0,
      output: b"not json".to_vec(),
      fail: false,
    });
    let evaluator = Evaluator::new(Some(unit)).unwrap();
    let result = evaluator.eval(EvalContext::new()).unwrap();
    assert_eq!(result.interface(), &Value::String("not json".to_string()));
  }

  #[test]
  fn non_zero_exit_is_surfaced_and_discards_output() {
    let unit = unit_with(StubArtifact {
      entry_point: "main".to_string(),
      bytes: b"\0asm".to_vec(),
      closed: Mutex::new(false),
      exit_code: 7,
      output: b"{\"ignored\":1}".to_vec(),
      fail: false,
    });
    let evaluator = Evaluator::new(Some(unit)).unwrap();
    assert!(matches!(
      evaluator.eval(EvalContext::new()),
      Err(EvalError::NonZeroExit(7))
    ));
  }

  #[test]
  fn cancelled_context_surfaces_cancellation_over_raw_failure() {
    let unit = unit_with(StubArtifact {
      entry_point: "main".to_string(),
      bytes: b"\0asm".to_vec(),
      closed: Mutex::new(false),
      exit_code: 0,
      output: Vec::new(),
      fail: true,
    });
    let evaluator = Evaluator::new(Some(unit)).unwrap();
    let ctx = EvalContext::new();
    ctx.cancel();
    assert!(matches!(
      evaluator.eval(ctx),
      Err(EvalError::ExecutionCancelled)
    ));
  }

  #[test]
  fn closed_artifact_refuses_new_instances() {
    let artifact = StubArtifact {
      entry_point: "main".to_string(),
      bytes: b"\0asm".to_vec(),
      closed: Mutex::new(false),
      exit_code: 0,
      output: b"null".to_vec(),
      fail: false,
    };
    artifact.close().unwrap();
    let unit = unit_with(artifact);
    let evaluator = Evaluator::new(Some(unit)).unwrap();
    assert!(matches!(
      evaluator.eval(EvalContext::new()),
      Err(EvalError::ExecutableClosed)
    ));
  }

  #[test]
  fn missing_provider_chain_is_reported() {
    let artifact = Arc::new(StubArtifact {
      entry_point: "main".to_string(),
      bytes: b"\0asm".to_vec(),
      closed: Mutex::new(false),
      exit_code: 0,
      output: b"null".to_vec(),
      fail: false,
    });
    let unit = Arc::new(ExecutableUnit::new("unit-1", artifact, None));
    let evaluator = Evaluator::new(Some(unit)).unwrap();
    assert!(matches!(
      evaluator.eval(EvalContext::new()),
      Err(EvalError::NoDataProvider)
    ));
  }
}
