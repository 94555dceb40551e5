pub mod config;
pub mod context;
pub mod encode;
pub mod error;
pub mod plugin;
pub mod request;
pub mod value;

pub use config::{ConfigData, ConfigError, PluginConfigData};
pub use context::ContextItem;
pub use error::{join_data_errors, DataError, EvalError, JoinedDataError};
pub use request::HttpRequest;
pub use value::{DataType, InputMap, Value};
