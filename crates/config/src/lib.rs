mod common;
mod core;
mod plugin;

pub use core::load_config;
pub use plugin::{
  PLUGIN_CONFIG_FILE,
  load_all_plugin_configs,
  load_plugin_config_validated,
  load_plugin_config,
};

