//! Layered configuration for tramite: CLI > `.tramite/config.toml` > defaults.

pub mod config;

pub use config::{
    CertificateConfig, CliArgs, Config, ConfigBuilder, ConfigSource, DeliveryConfig, TimingConfig,
};
