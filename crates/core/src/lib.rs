pub mod artifact;
pub mod compiler;
pub mod context;
pub mod diagnostics;
pub mod evaluator;
pub mod loader;
pub mod plugin;
pub mod providers;
pub mod result;
pub mod unit;

pub use artifact::{ExecutableArtifact, GuestInstance, InstanceConfig};
pub use compiler::{Compiler, CompilerOptions, CompilerOptionsBuilder, HostFunction};
pub use context::{ContextKey, EvalContext};
pub use diagnostics::{Diagnostics, DiagnosticSink, LogCrateSink, NoopSink};
pub use evaluator::Evaluator;
pub use loader::{FileLoader, MemoryLoader, SourceLoader};
pub use providers::{
  CompositeProvider, ContextProvider, DataProvider, StaticProvider, INPUT_DATA_KEY, REQUEST_KEY,
};
pub use result::ResultObject;
pub use unit::ExecutableUnit;

use config::load_config;
use log::{debug, info};
use plugin::PluginManager;
use shared_types::config::{ConfigData, ConfigError};
use shared_types::plugin::PluginError;
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

pub fn init_logger() {
  INIT.call_once(|| {
    env_logger::Builder::from_default_env()
      .filter_level(log::LevelFilter::Info)
      .format_timestamp_secs()
      .format_module_path(true)
      .format_target(false)
      .init();

    info!("The initialization of the log system is complete");
    debug!("Debug level log is enabled");
  });
}

#[derive(thiserror::Error, Debug)]
pub enum BudCoreError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Plugin(#[from] PluginError),
}

/// BudCore builder.
///
/// Uses generic parameter `C` to represent the concrete Compiler backend.
/// Enables zero-cost static dispatch.
///
/// # Type Parameters
///
/// * `C` - Concrete type implementing the `Compiler` trait (e.g., `WasmCompiler`)
///
/// # Examples
///
/// ```no_run
/// use core::BudCore;
/// use wasm_provider::WasmCompiler;
///
/// let compiler = WasmCompiler::new();
/// let core = BudCore::builder(compiler).build()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct BudCoreBuilder<C: crate::compiler::Compiler> {
  compiler: Arc<C>,
}

impl<C: crate::compiler::Compiler> BudCoreBuilder<C> {
  /// Create a new BudCore builder.
  ///
  /// # Arguments
  ///
  /// * `compiler` - Instance implementing the `Compiler` trait
  #[must_use]
  pub fn new(compiler: C) -> Self {
    BudCoreBuilder {
      compiler: Arc::new(compiler),
    }
  }

  /// Build a BudCore instance.
  ///
  /// Steps performed:
  /// 1. Initialize the logging system
  /// 2. Load configuration file
  /// 3. Initialize the plugin manager around the given compiler
  ///
  /// # Errors
  ///
  /// - `BudCoreError::Config` - Configuration loading failed
  /// - `BudCoreError::Plugin` - Plugin manager initialization failed
  pub fn build(self) -> Result<BudCore<C>, BudCoreError> {
    init_logger();
    info!("BudCore Start Init");

    let config = Arc::new(load_config()?);
    info!("Config: {:?}", config);

    let plugin_manager = PluginManager::new(Arc::clone(&config), Arc::clone(&self.compiler))?;

    Ok(BudCore {
      package_name: config.name.clone(),
      config,
      plugin_manager,
    })
  }
}

/// BudCore instance.
///
/// Contains core application components: config, compiler backend, and plugin manager.
///
/// # Type Parameters
///
/// * `C` - Concrete type implementing the `Compiler` trait (e.g., `WasmCompiler`)
pub struct BudCore<C: crate::compiler::Compiler> {
  pub package_name: String,
  pub config: Arc<ConfigData>,
  pub plugin_manager: PluginManager<C>,
}

impl<C: crate::compiler::Compiler> BudCore<C> {
  /// Create a BudCore builder (recommended construction method).
  ///
  /// # Arguments
  ///
  /// * `compiler` - Instance implementing the `Compiler` trait
  pub fn builder(compiler: C) -> BudCoreBuilder<C> {
    BudCoreBuilder::new(compiler)
  }
}
