//! Configuration types for the submission queue, the DA client and the
//! derivation data source.

pub mod config;
pub mod da;
pub mod derivation;
pub mod txmgr;

pub use config::{Config, ConfigError, LoggingConfig};
pub use da::DaServerConfig;
pub use derivation::{DerivationConfig, ReaderConfig};
pub use txmgr::{QueueConfig, QueueConfigError};
