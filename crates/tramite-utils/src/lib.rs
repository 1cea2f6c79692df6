//! Foundation utilities shared by the tramite crates.
//!
//! Error taxonomy, exit codes, tracing setup and structured log helpers,
//! atomic file writes and canonical JSON emission.

pub mod atomic_write;
pub mod canonicalization;
pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod types;

pub use error::{
    AssetError, ConfigError, DeliveryError, DeliveryErrorKind, ErrorCategory, OrchestratorError,
    TramiteError, UserFriendlyError,
};
pub use exit_codes::ExitCode;
pub use types::ConfigSource;
