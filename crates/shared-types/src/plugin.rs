use thiserror::Error;

use crate::error::EvalError;

#[derive(Error, Debug)]
pub enum PluginError {
  #[error("Failed to load plugin: {0}")]
  LoadError(String),

  #[error("Failed to install plugin: {0}")]
  InstallError(String),

  #[error("Failed to determine project directories")]
  ProjectDirsError,

  #[error("IO error: {0}")]
  IoError(#[from] std::io::Error),

  #[error(transparent)]
  Eval(#[from] EvalError),
}
