//! Configuration management for tramite
//!
//! Hierarchical configuration with discovery and precedence: CLI > file >
//! defaults. TOML files carry `[timing]`, `[certificate]` and `[delivery]`
//! sections.

mod builder;
mod cli_args;
mod discovery;
mod model;
mod sources;
mod validation;

pub use builder::ConfigBuilder;
pub use cli_args::CliArgs;
pub use discovery::TRAMITE_HOME_ENV;
pub use model::*;
pub use tramite_utils::types::ConfigSource;

impl Default for Config {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            certificate: CertificateConfig::default(),
            delivery: DeliveryConfig::default(),
            config_path: None,
            source_attribution: discovery::default_attribution(),
        }
    }
}
