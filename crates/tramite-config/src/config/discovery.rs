use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{CertificateConfig, CliArgs, Config, ConfigSource, DeliveryConfig, TimingConfig};

/// Environment variable naming a directory that holds `config.toml`.
pub const TRAMITE_HOME_ENV: &str = "TRAMITE_HOME";

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    timing: Option<TimingConfig>,
    certificate: Option<CertificateConfig>,
    delivery: Option<DeliveryConfig>,
}

/// Replace `target` when `value` is set and record where it came from.
pub(crate) fn overlay<T>(
    target: &mut Option<T>,
    value: Option<T>,
    key: &str,
    source: ConfigSource,
    attribution: &mut HashMap<String, ConfigSource>,
) {
    if value.is_some() {
        *target = value;
        attribution.insert(key.to_string(), source);
    }
}

pub(crate) const ATTRIBUTED_KEYS: &[&str] = &[
    "timing.phase_duration_ms",
    "timing.item_interval_ms",
    "timing.settle_delay_ms",
    "timing.confirmation_delay_ms",
    "certificate.assets_dir",
    "certificate.agency_logo",
    "certificate.country_logo",
    "certificate.output_dir",
    "certificate.file_name",
    "delivery.endpoint",
    "delivery.timeout_secs",
];

pub(crate) fn default_attribution() -> HashMap<String, ConfigSource> {
    ATTRIBUTED_KEYS
        .iter()
        .map(|key| ((*key).to_string(), ConfigSource::Default))
        .collect()
}

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// Besides the upward search from the current directory this honours
    /// `TRAMITE_HOME` and the per-user configuration directory.
    pub fn discover(cli_args: &CliArgs) -> Result<Self> {
        let start_dir = env::current_dir().context("Failed to get current directory")?;

        if cli_args.config_path.is_none() {
            if let Some(home_config) = Self::home_config_file() {
                return Self::load_with(Some(home_config), cli_args);
            }
            if let Some(found) = Self::discover_config_file_from(&start_dir)? {
                return Self::load_with(Some(found), cli_args);
            }
            return Self::load_with(Self::user_config_file(), cli_args);
        }

        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory
    ///
    /// This is the path-driven variant used by tests to avoid process-global
    /// state: it ignores `TRAMITE_HOME` and the user configuration directory.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self> {
        let config_path = if let Some(explicit_path) = &cli_args.config_path {
            Some(explicit_path.clone())
        } else {
            Self::discover_config_file_from(start_dir)?
        };

        Self::load_with(config_path, cli_args)
    }

    fn load_with(config_path: Option<PathBuf>, cli_args: &CliArgs) -> Result<Self> {
        let mut source_attribution = default_attribution();

        let mut timing = TimingConfig::default();
        let mut certificate = CertificateConfig::default();
        let mut delivery = DeliveryConfig::default();

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?;
            debug!(path = %path.display(), "Loaded configuration file");

            let src = ConfigSource::Config;
            let attr = &mut source_attribution;

            if let Some(file_timing) = file_config.timing {
                overlay(
                    &mut timing.phase_duration_ms,
                    file_timing.phase_duration_ms,
                    "timing.phase_duration_ms",
                    src,
                    attr,
                );
                overlay(
                    &mut timing.item_interval_ms,
                    file_timing.item_interval_ms,
                    "timing.item_interval_ms",
                    src,
                    attr,
                );
                overlay(
                    &mut timing.settle_delay_ms,
                    file_timing.settle_delay_ms,
                    "timing.settle_delay_ms",
                    src,
                    attr,
                );
                overlay(
                    &mut timing.confirmation_delay_ms,
                    file_timing.confirmation_delay_ms,
                    "timing.confirmation_delay_ms",
                    src,
                    attr,
                );
            }

            if let Some(file_certificate) = file_config.certificate {
                // Relative asset and output directories resolve against the
                // directory that holds the `.tramite/` folder.
                let base = path
                    .parent()
                    .and_then(Path::parent)
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
                overlay(
                    &mut certificate.assets_dir,
                    file_certificate.assets_dir.map(|p| resolve_relative(&base, p)),
                    "certificate.assets_dir",
                    src,
                    attr,
                );
                overlay(
                    &mut certificate.agency_logo,
                    file_certificate.agency_logo,
                    "certificate.agency_logo",
                    src,
                    attr,
                );
                overlay(
                    &mut certificate.country_logo,
                    file_certificate.country_logo,
                    "certificate.country_logo",
                    src,
                    attr,
                );
                overlay(
                    &mut certificate.output_dir,
                    file_certificate.output_dir.map(|p| resolve_relative(&base, p)),
                    "certificate.output_dir",
                    src,
                    attr,
                );
                overlay(
                    &mut certificate.file_name,
                    file_certificate.file_name,
                    "certificate.file_name",
                    src,
                    attr,
                );
            }

            if let Some(file_delivery) = file_config.delivery {
                overlay(
                    &mut delivery.endpoint,
                    file_delivery.endpoint,
                    "delivery.endpoint",
                    src,
                    attr,
                );
                overlay(
                    &mut delivery.timeout_secs,
                    file_delivery.timeout_secs,
                    "delivery.timeout_secs",
                    src,
                    attr,
                );
            }
        }

        // CLI overrides
        let cli = ConfigSource::Cli;
        let attr = &mut source_attribution;
        overlay(
            &mut timing.phase_duration_ms,
            cli_args.phase_duration_ms,
            "timing.phase_duration_ms",
            cli,
            attr,
        );
        overlay(
            &mut timing.item_interval_ms,
            cli_args.item_interval_ms,
            "timing.item_interval_ms",
            cli,
            attr,
        );
        overlay(
            &mut timing.settle_delay_ms,
            cli_args.settle_delay_ms,
            "timing.settle_delay_ms",
            cli,
            attr,
        );
        overlay(
            &mut timing.confirmation_delay_ms,
            cli_args.confirmation_delay_ms,
            "timing.confirmation_delay_ms",
            cli,
            attr,
        );
        overlay(
            &mut certificate.assets_dir,
            cli_args.assets_dir.clone(),
            "certificate.assets_dir",
            cli,
            attr,
        );
        overlay(
            &mut certificate.output_dir,
            cli_args.output_dir.clone(),
            "certificate.output_dir",
            cli,
            attr,
        );
        overlay(
            &mut delivery.endpoint,
            cli_args.delivery_endpoint.clone(),
            "delivery.endpoint",
            cli,
            attr,
        );

        let config = Self {
            timing,
            certificate,
            delivery,
            config_path,
            source_attribution,
        };

        config.validate()?;

        Ok(config)
    }

    /// Discover config file by searching upward from a given directory
    ///
    /// Walks up the directory tree looking for `.tramite/config.toml`, stopping
    /// at repository root markers (.git, .hg, .svn) or the filesystem root.
    pub fn discover_config_file_from(start_dir: &Path) -> Result<Option<PathBuf>> {
        let mut current_dir = start_dir.to_path_buf();

        loop {
            let config_path = current_dir.join(".tramite").join("config.toml");
            if config_path.exists() {
                return Ok(Some(config_path));
            }

            if current_dir.join(".git").exists()
                || current_dir.join(".hg").exists()
                || current_dir.join(".svn").exists()
            {
                break;
            }

            match current_dir.parent() {
                Some(parent) => current_dir = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    fn home_config_file() -> Option<PathBuf> {
        let home = env::var_os(TRAMITE_HOME_ENV)?;
        if home.is_empty() {
            return None;
        }
        let path = PathBuf::from(home).join("config.toml");
        path.exists().then_some(path)
    }

    fn user_config_file() -> Option<PathBuf> {
        let path = dirs::config_dir()?.join("tramite").join("config.toml");
        path.exists().then_some(path)
    }

    /// Load configuration from TOML file
    fn load_config_file(path: &Path) -> Result<TomlConfig> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config: TomlConfig = toml::from_str(&content).with_context(|| {
                    format!("Failed to parse TOML config file: {}", path.display())
                })?;
                Ok(config)
            }
            // A missing file falls back to defaults.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TomlConfig::default()),
            Err(e) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            )),
        }
    }
}

fn resolve_relative(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() || base.as_os_str().is_empty() {
        path
    } else {
        base.join(path)
    }
}
