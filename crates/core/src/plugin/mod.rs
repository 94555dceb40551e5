pub mod manager;

pub use manager::{PluginInfo, PluginManager};
