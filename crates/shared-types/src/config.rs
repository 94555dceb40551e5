use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ConfigData {
  pub name: String,
  pub version: String,
  pub description: String,
}

fn default_entry_point() -> String {
  "main".to_string()
}

fn default_wasi_enabled() -> bool {
  true
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PluginConfigData {
  pub name: String,
  pub version: String,
  pub description: String,
  pub author: String,
  pub permissions: Vec<String>,
  /// Name of the guest entry point to verify and invoke. Feeds directly
  /// into `CompilerOptions::entry_point`; defaults to `"main"` like the
  /// Compiler's own default.
  #[serde(default = "default_entry_point")]
  pub entry_point: String,
  /// Whether the guest runs with WASI capabilities. Feeds directly into
  /// `CompilerOptions::wasi_enabled`.
  #[serde(default = "default_wasi_enabled")]
  pub wasi_enabled: bool,
}

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error(
    "Configuration file not found: {0}\n\nPlease ensure config file exists in the project root directory."
  )]
  FileNotFound(String),

  #[error("Configuration parsing error: {0}")]
  ParseError(String),

  #[error("Configuration validation failed:\n{0}")]
  ValidationError(String),

  #[error("File reading error: {0}")]
  IoError(#[from] std::io::Error),
}
