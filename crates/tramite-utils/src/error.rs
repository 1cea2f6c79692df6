use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Top-level error type for tramite operations.
#[derive(Error, Debug)]
pub enum TramiteError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Review simulation error: {0}")]
    Orchestrator(#[from] OrchestratorError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Session error: {reason}")]
    Session { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Simulation,
    Document,
    Delivery,
    FileSystem,
    Session,
    Validation,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Simulation => write!(f, "Review Simulation"),
            Self::Document => write!(f, "Certificate Document"),
            Self::Delivery => write!(f, "Delivery"),
            Self::FileSystem => write!(f, "File System"),
            Self::Session => write!(f, "Session"),
            Self::Validation => write!(f, "Validation"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("Configuration discovery failed: {reason}")]
    DiscoveryFailed { reason: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(reason) => {
                format!("Configuration file has invalid format: {reason}")
            }
            Self::MissingRequired(key) => {
                format!("Required configuration '{key}' is missing")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::NotFound { path } => format!("Configuration file not found: {path}"),
            Self::DiscoveryFailed { reason } => {
                format!("Could not locate configuration: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile(_) => Some(
                "Configuration files use TOML with [timing], [certificate] and [delivery] sections."
                    .to_string(),
            ),
            Self::InvalidValue { key, .. } if key.starts_with("timing.") => Some(
                "Phase duration must leave room for every checklist item to appear.".to_string(),
            ),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax of .tramite/config.toml".to_string(),
                "Run 'tramite config' to see the effective configuration".to_string(),
            ],
            Self::MissingRequired(key) => vec![format!(
                "Set '{key}' in .tramite/config.toml or pass it on the command line"
            )],
            Self::InvalidValue { key, .. } => vec![
                format!("Correct the value of '{key}'"),
                "Remove the key to fall back to the built-in default".to_string(),
            ],
            Self::NotFound { .. } => vec![
                "Create .tramite/config.toml or pass --config <path>".to_string(),
            ],
            Self::DiscoveryFailed { .. } => vec![
                "Set TRAMITE_HOME to the directory holding config.toml".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

/// Errors raised by the review simulation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("A review run ({run_id}) is already in progress")]
    RunInProgress { run_id: u64 },

    #[error(
        "Phase {phase_id} reveals {item_count} items every {item_interval_ms} ms, which does not fit in {phase_duration_ms} ms"
    )]
    CascadeExceedsPhase {
        phase_id: u32,
        item_count: usize,
        item_interval_ms: u64,
        phase_duration_ms: u64,
    },

    #[error("Phase id {phase_id} appears more than once in the review plan")]
    DuplicatePhaseId { phase_id: u32 },

    #[error("Review run {run_id} was cancelled")]
    Cancelled { run_id: u64 },
}

impl UserFriendlyError for OrchestratorError {
    fn user_message(&self) -> String {
        match self {
            Self::RunInProgress { .. } => "A review is already running".to_string(),
            Self::CascadeExceedsPhase { phase_id, .. } => {
                format!("Timing for phase {phase_id} is too short for its checklist")
            }
            Self::DuplicatePhaseId { phase_id } => {
                format!("The review plan lists phase {phase_id} twice")
            }
            Self::Cancelled { .. } => "The review was cancelled before it finished".to_string(),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::CascadeExceedsPhase {
                item_count,
                item_interval_ms,
                phase_duration_ms,
                ..
            } => Some(format!(
                "{item_count} items x {item_interval_ms} ms must be shorter than {phase_duration_ms} ms"
            )),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::RunInProgress { .. } => {
                vec!["Cancel the current review before starting another".to_string()]
            }
            Self::CascadeExceedsPhase { .. } => vec![
                "Increase --phase-duration-ms".to_string(),
                "Decrease --item-interval-ms".to_string(),
            ],
            Self::DuplicatePhaseId { .. } => {
                vec!["Give every phase in the review plan its own id".to_string()]
            }
            Self::Cancelled { .. } => vec!["Start the review again".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::CascadeExceedsPhase { .. } | Self::DuplicatePhaseId { .. } => {
                ErrorCategory::Validation
            }
            _ => ErrorCategory::Simulation,
        }
    }
}

/// Image asset faults. The document builder logs these and omits the image.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Asset '{name}' not found")]
    NotFound { name: String },

    #[error("Asset '{name}' could not be decoded: {reason}")]
    Decode { name: String, reason: String },

    #[error("Asset '{name}' could not be read: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl UserFriendlyError for AssetError {
    fn user_message(&self) -> String {
        match self {
            Self::NotFound { name } => format!("Image '{name}' is missing"),
            Self::Decode { name, .. } => format!("Image '{name}' is not a valid PNG or JPEG"),
            Self::Io { name, .. } => format!("Image '{name}' could not be read"),
        }
    }

    fn context(&self) -> Option<String> {
        Some("The certificate is still produced without the image.".to_string())
    }

    fn suggestions(&self) -> Vec<String> {
        vec!["Check --assets-dir or the [certificate] assets_dir setting".to_string()]
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Document
    }
}

/// Failure kinds reported by delivery collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryErrorKind {
    /// The endpoint could not be reached.
    Network,
    /// The endpoint answered 404.
    EndpointNotFound,
    /// The endpoint rejected the request with an error body.
    RemoteValidation,
    /// The destination address is not a plausible e-mail address.
    InvalidDestination,
    /// The encoded document exceeds the accepted size.
    PayloadTooLarge,
}

impl fmt::Display for DeliveryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::EndpointNotFound => write!(f, "endpoint_not_found"),
            Self::RemoteValidation => write!(f, "remote_validation"),
            Self::InvalidDestination => write!(f, "invalid_destination"),
            Self::PayloadTooLarge => write!(f, "payload_too_large"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {detail}")]
pub struct DeliveryError {
    pub kind: DeliveryErrorKind,
    pub detail: String,
}

impl DeliveryError {
    pub fn new(kind: DeliveryErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl UserFriendlyError for DeliveryError {
    fn user_message(&self) -> String {
        match self.kind {
            DeliveryErrorKind::Network => {
                "Could not connect to the delivery server".to_string()
            }
            DeliveryErrorKind::EndpointNotFound => {
                "The delivery endpoint does not exist on the server".to_string()
            }
            DeliveryErrorKind::RemoteValidation => {
                format!("The delivery server rejected the request: {}", self.detail)
            }
            DeliveryErrorKind::InvalidDestination => {
                format!("'{}' is not a valid e-mail address", self.detail)
            }
            DeliveryErrorKind::PayloadTooLarge => "The certificate is too large to send".to_string(),
        }
    }

    fn context(&self) -> Option<String> {
        match self.kind {
            DeliveryErrorKind::Network | DeliveryErrorKind::EndpointNotFound => {
                Some(self.detail.clone())
            }
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self.kind {
            DeliveryErrorKind::Network => vec![
                "Check that the delivery server is running".to_string(),
                "Check --delivery-endpoint".to_string(),
            ],
            DeliveryErrorKind::EndpointNotFound => {
                vec!["Point --delivery-endpoint at /api/send-certificate".to_string()]
            }
            DeliveryErrorKind::RemoteValidation => {
                vec!["Review the server logs for details".to_string()]
            }
            DeliveryErrorKind::InvalidDestination => {
                vec!["Use an address of the form name@domain.tld".to_string()]
            }
            DeliveryErrorKind::PayloadTooLarge => {
                vec!["Save the certificate locally with --out instead".to_string()]
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        match self.kind {
            DeliveryErrorKind::InvalidDestination => ErrorCategory::Validation,
            _ => ErrorCategory::Delivery,
        }
    }
}

impl UserFriendlyError for TramiteError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.user_message(),
            Self::Orchestrator(err) => err.user_message(),
            Self::Asset(err) => err.user_message(),
            Self::Delivery(err) => err.user_message(),
            Self::Session { reason } => format!("Session problem: {reason}"),
            Self::Io(err) => format!("File system operation failed: {err}"),
            Self::Serialization(err) => format!("Could not read or write JSON: {err}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(err) => err.context(),
            Self::Orchestrator(err) => err.context(),
            Self::Asset(err) => err.context(),
            Self::Delivery(err) => err.context(),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(err) => err.suggestions(),
            Self::Orchestrator(err) => err.suggestions(),
            Self::Asset(err) => err.suggestions(),
            Self::Delivery(err) => err.suggestions(),
            Self::Session { .. } => vec!["Log in again".to_string()],
            Self::Io(_) => vec!["Check permissions of the output directory".to_string()],
            Self::Serialization(_) => vec!["Check that the record file is valid JSON".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(err) => err.category(),
            Self::Orchestrator(err) => err.category(),
            Self::Asset(err) => err.category(),
            Self::Delivery(err) => err.category(),
            Self::Session { .. } => ErrorCategory::Session,
            Self::Io(_) => ErrorCategory::FileSystem,
            Self::Serialization(_) => ErrorCategory::Validation,
        }
    }
}

impl TramiteError {
    /// Get a user-friendly error message with context and actionable suggestions
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error: {}\n", self.user_message()));

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the appropriate CLI exit code.
    ///
    /// | Exit Code | Name | Description |
    /// |-----------|------|-------------|
    /// | 0 | SUCCESS | Completed successfully |
    /// | 1 | INTERNAL | General failure |
    /// | 2 | CLI_ARGS | Invalid CLI arguments or configuration |
    /// | 3 | DELIVERY_FAILED | Certificate could not be delivered |
    /// | 4 | CANCELLED | Review simulation cancelled |
    #[must_use]
    pub fn to_exit_code(&self) -> crate::exit_codes::ExitCode {
        use crate::exit_codes::ExitCode;

        match self {
            TramiteError::Config(_) => ExitCode::CLI_ARGS,
            TramiteError::Orchestrator(err) => match err {
                OrchestratorError::Cancelled { .. } => ExitCode::CANCELLED,
                OrchestratorError::CascadeExceedsPhase { .. } => ExitCode::CLI_ARGS,
                OrchestratorError::RunInProgress { .. }
                | OrchestratorError::DuplicatePhaseId { .. } => ExitCode::INTERNAL,
            },
            TramiteError::Delivery(_) => ExitCode::DELIVERY_FAILED,
            TramiteError::Serialization(_) => ExitCode::CLI_ARGS,
            TramiteError::Asset(_) | TramiteError::Session { .. } | TramiteError::Io(_) => {
                ExitCode::INTERNAL
            }
        }
    }
}
