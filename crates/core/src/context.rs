//! The explicit, context-threaded evaluation context: an explicit
//! `EvalContext` value is passed through `Eval` and `PrepareContext`
//! rather than carried ambiently. It carries three things a Go
//! `context.Context` would
//! otherwise carry ambiently: per-key storage for context providers, a
//! deadline, and a cancellation flag.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use shared_types::InputMap;

/// Key a context provider stores its Input Map under inside an
/// [`EvalContext`]. Opaque from the caller's point of view.
pub type ContextKey = String;

/// Threads per-evaluation state through `PrepareContext`/`Eval`.
/// Cloning an `EvalContext` shares its cancellation flag (derived
/// contexts observe the same cancellation, mirroring how cancelling a Go
/// `context.Context` cancels everything derived from it) but copies its
/// per-key storage (each derived context can accumulate its own data
/// without affecting siblings taken from the same parent).
#[derive(Clone, Default)]
pub struct EvalContext {
  data: HashMap<ContextKey, InputMap>,
  deadline: Option<Instant>,
  cancelled: Arc<AtomicBool>,
}

impl EvalContext {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns a context that reports cancelled once `deadline` has passed.
  #[must_use]
  pub fn with_deadline(mut self, deadline: Instant) -> Self {
    self.deadline = Some(deadline);
    self
  }

  /// Convenience over [`EvalContext::with_deadline`] relative to now.
  #[must_use]
  pub fn with_timeout(self, timeout: Duration) -> Self {
    self.with_deadline(Instant::now() + timeout)
  }

  /// Signals cancellation. Visible to every clone derived from this value.
  pub fn cancel(&self) {
    self.cancelled.store(true, Ordering::SeqCst);
  }

  /// True if cancelled explicitly, or the deadline (if any) has elapsed.
  #[must_use]
  pub fn is_cancelled(&self) -> bool {
    self.cancelled.load(Ordering::SeqCst) || self.deadline.is_some_and(|d| Instant::now() >= d)
  }

  #[must_use]
  pub fn deadline(&self) -> Option<Instant> {
    self.deadline
  }

  /// Reads the Input Map stored under `key`, or an empty map if nothing has
  /// been stored there yet.
  #[must_use]
  pub fn get_map(&self, key: &str) -> InputMap {
    self.data.get(key).cloned().unwrap_or_default()
  }

  /// Overwrites the Input Map stored under `key`.
  pub fn set_map(&mut self, key: &str, map: InputMap) {
    self.data.insert(key.to_string(), map);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::thread;

  #[test]
  fn fresh_context_is_not_cancelled() {
    let ctx = EvalContext::new();
    assert!(!ctx.is_cancelled());
  }

  #[test]
  fn cancel_is_observed_by_clones() {
    let ctx = EvalContext::new();
    let clone = ctx.clone();
    ctx.cancel();
    assert!(clone.is_cancelled());
  }

  #[test]
  fn deadline_in_the_past_is_already_cancelled() {
    let ctx = EvalContext::new().with_timeout(Duration::from_millis(0));
    thread::sleep(Duration::from_millis(5));
    assert!(ctx.is_cancelled());
  }

  #[test]
  fn per_key_storage_is_independent_per_clone_mutation() {
    let mut ctx = EvalContext::new();
    ctx.set_map("a", InputMap::new());
    let mut clone = ctx.clone();
    clone.set_map("b", InputMap::new());
    assert!(ctx.get_map("b").is_empty());
  }
}
