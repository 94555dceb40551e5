//! Executable Artifact (C5): the Fresh/Open/Closed lifecycle a compiled
//! module lives through between `Compile` and the last `Instance` call.
//! `GuestInstance` is the per-invocation handle a single `Eval` borrows
//! and releases.

use shared_types::EvalError;

use crate::context::EvalContext;
use crate::diagnostics::Diagnostics;

/// Clock/randomness capabilities granted to a guest instance. All enabled
/// by default: wall-clock, high-resolution monotonic clock, and
/// cryptographically strong random are all enabled unless narrowed.
#[derive(Debug, Clone, Copy)]
pub struct InstanceConfig {
  pub wall_clock: bool,
  pub monotonic_clock: bool,
  pub crypto_random: bool,
}

impl Default for InstanceConfig {
  fn default() -> Self {
    Self {
      wall_clock: true,
      monotonic_clock: true,
      crypto_random: true,
    }
  }
}

/// A compiled, instantiable unit of guest code.
///
/// Implementations own the Fresh → Open → Closed state machine: `instance`
/// must fail with [`EvalError::ExecutableClosed`] once `close` has run, and
/// `close` must be idempotent.
pub trait ExecutableArtifact: Send + Sync {
  type Instance: GuestInstance;

  /// The entry point this artifact was compiled to expose.
  fn entry_point(&self) -> &str;

  /// The raw compiled bytes this artifact was built from.
  fn bytes(&self) -> &[u8];

  fn is_closed(&self) -> bool;

  /// Releases engine-level resources. Idempotent; safe to call more than
  /// once or never (e.g. if the artifact is simply dropped).
  fn close(&self) -> Result<(), EvalError>;

  /// The diagnostics sink this artifact was compiled with, threaded through
  /// to [`crate::result::ResultObject`].
  fn diagnostics(&self) -> Diagnostics;

  /// Creates a fresh guest instance bound to `ctx`'s cancellation/deadline.
  fn instance(
    &self,
    ctx: &EvalContext,
    config: &InstanceConfig,
  ) -> Result<Self::Instance, EvalError>;
}

/// A live, per-evaluation guest instance. Exactly one `call_with_context`
/// is ever issued against a given instance; the
/// concrete implementation releases its engine-level resources when
/// dropped, so no explicit "close the instance" step is part of this
/// trait's contract.
pub trait GuestInstance {
  /// `&mut self` rather than `&self`: wasmtime's export lookups need a
  /// mutable store context even for a read-only existence check.
  fn function_exists(&mut self, name: &str) -> bool;

  /// Invokes `name` with `input` (already JSON-encoded, or empty). Returns
  /// the guest's exit code and raw output bytes on a successful call;
  /// returns `Err` only for host/engine-level failures (trap, cancellation,
  /// I/O). A non-zero exit code is not itself an `Err` here -- the caller
  /// (the Evaluator) interprets it.
  fn call_with_context(
    &mut self,
    ctx: &EvalContext,
    name: &str,
    input: &[u8],
  ) -> Result<(u32, Vec<u8>), EvalError>;
}
