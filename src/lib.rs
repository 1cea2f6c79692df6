//! tramite - citizen portal prototype for sanitary registration procedures
//!
//! A simulated government review walks an application through four phases
//! (SAC document check, technical review, legal review, issuance), after
//! which a sanitary registration certificate is produced as a PDF and
//! either saved locally or mailed through the portal's delivery endpoint.
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Run the review with shortened timers and save the certificate
//! tramite simulate --phase-duration-ms 300 --item-interval-ms 50 --out ./out
//!
//! # Mail the certificate once the review completes
//! tramite simulate --email ana@example.hn
//!
//! # Render a certificate from a JSON record
//! tramite certificate --record record.json --out ./out
//!
//! # Inspect the review phases and the effective configuration
//! tramite phases --json
//! tramite config
//! ```
//!
//! # Library
//!
//! The workspace crates are re-exported here:
//!
//! - [`phases`]: phase definitions
//! - [`orchestrator`]: the review state machine and its tokio driver
//! - [`certificate`]: the certificate document builder
//! - [`delivery`]: e-mail delivery and local saving
//! - [`config`]: layered configuration
//!
//! [`portal`] holds the host pieces: session, procedure lifecycle and the
//! demo certificate data.
//!
//! JSON output is emitted in JCS (RFC 8785) canonical form; see [`emit_jcs`].

pub mod cli;
pub mod portal;

pub use tramite_certificate as certificate;
pub use tramite_config as config;
pub use tramite_delivery as delivery;
pub use tramite_orchestrator as orchestrator;
pub use tramite_phases as phases;

pub use tramite_config::{CliArgs, Config, ConfigBuilder};
pub use tramite_utils::canonicalization::emit_jcs;
pub use tramite_utils::error::{ConfigError, TramiteError, UserFriendlyError};
pub use tramite_utils::exit_codes::ExitCode;

pub use portal::{Portal, Procedure, ProcedureStatus, Session, sample_record};
