pub mod config;
pub mod error;
pub mod prefix;

pub use config::{AdapterKind, CollectorSection, ProcstatConfig};
pub use error::{ConfigError, ConfigResult};
pub use prefix::{default_prefix, set_default_prefix, validate_prefix};
