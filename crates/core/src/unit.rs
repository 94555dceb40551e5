//! Executable Unit (C8): an immutable pairing of a compiled artifact, its
//! identity, and the Provider Chain an evaluation draws data from.

use std::sync::Arc;

use crate::artifact::ExecutableArtifact;
use crate::providers::DataProvider;

/// Groups an [`ExecutableArtifact`] with the identity and data plane an
/// [`crate::evaluator::Evaluator`] needs to run it. `providers` is
/// `Option` so a unit can be constructed without one -- evaluating it then
/// fails with `NoDataProvider` rather than silently running with empty
/// data.
pub struct ExecutableUnit<A: ExecutableArtifact> {
  id: String,
  artifact: Arc<A>,
  providers: Option<Arc<dyn DataProvider>>,
}

impl<A: ExecutableArtifact> ExecutableUnit<A> {
  #[must_use]
  pub fn new(
    id: impl Into<String>,
    artifact: Arc<A>,
    providers: Option<Arc<dyn DataProvider>>,
  ) -> Self {
    Self {
      id: id.into(),
      artifact,
      providers,
    }
  }

  #[must_use]
  pub fn id(&self) -> &str {
    &self.id
  }

  #[must_use]
  pub fn artifact(&self) -> &Arc<A> {
    &self.artifact
  }

  #[must_use]
  pub fn providers(&self) -> Option<&Arc<dyn DataProvider>> {
    self.providers.as_ref()
  }
}
