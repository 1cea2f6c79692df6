use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use tramite_utils::types::ConfigSource;

/// Default time a review phase stays active.
pub const DEFAULT_PHASE_DURATION_MS: u64 = 3000;
/// Default stagger between checklist items of one phase.
pub const DEFAULT_ITEM_INTERVAL_MS: u64 = 600;
/// Default pause between the last phase and the completed state.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 500;
/// Default pause between the completed state and the delivery step.
pub const DEFAULT_CONFIRMATION_DELAY_MS: u64 = 1000;

pub const DEFAULT_AGENCY_LOGO: &str = "LogoArsa.png";
pub const DEFAULT_COUNTRY_LOGO: &str = "LogoHonduras.png";
pub const DEFAULT_CERTIFICATE_FILE_NAME: &str = "certificado-registro-sanitario.pdf";

pub const DEFAULT_DELIVERY_ENDPOINT: &str = "http://localhost:3001/api/send-certificate";
pub const DEFAULT_DELIVERY_TIMEOUT_SECS: u64 = 30;

/// Configuration for tramite.
///
/// `Config` is layered: CLI arguments > config file > built-in defaults.
///
/// # Discovery
///
/// [`Config::discover()`] looks for a configuration file in this order:
/// - the explicit `--config` path
/// - `$TRAMITE_HOME/config.toml`
/// - `.tramite/config.toml`, searching upward from the current directory and
///   stopping at a repository root
/// - `<user config dir>/tramite/config.toml`
///
/// # Source Attribution
///
/// Each value tracks where it came from (`cli`, `config`, `programmatic` or
/// `default`); `tramite config` prints this table.
///
/// # Configuration File Format
///
/// ```toml
/// [timing]
/// phase_duration_ms = 3000
/// item_interval_ms = 600
/// settle_delay_ms = 500
/// confirmation_delay_ms = 1000
///
/// [certificate]
/// assets_dir = "public"
/// output_dir = "out"
///
/// [delivery]
/// endpoint = "http://localhost:3001/api/send-certificate"
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Review simulation timing.
    pub timing: TimingConfig,
    /// Certificate assets and local output.
    pub certificate: CertificateConfig,
    /// E-mail delivery endpoint.
    pub delivery: DeliveryConfig,
    /// Configuration file that was loaded, if any.
    pub config_path: Option<PathBuf>,
    /// Source attribution for each setting.
    pub source_attribution: HashMap<String, ConfigSource>,
}

/// `[timing]` section. All values in milliseconds.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TimingConfig {
    pub phase_duration_ms: Option<u64>,
    pub item_interval_ms: Option<u64>,
    pub settle_delay_ms: Option<u64>,
    pub confirmation_delay_ms: Option<u64>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            phase_duration_ms: Some(DEFAULT_PHASE_DURATION_MS),
            item_interval_ms: Some(DEFAULT_ITEM_INTERVAL_MS),
            settle_delay_ms: Some(DEFAULT_SETTLE_DELAY_MS),
            confirmation_delay_ms: Some(DEFAULT_CONFIRMATION_DELAY_MS),
        }
    }
}

impl TimingConfig {
    #[must_use]
    pub fn phase_duration(&self) -> Duration {
        Duration::from_millis(self.phase_duration_ms.unwrap_or(DEFAULT_PHASE_DURATION_MS))
    }

    #[must_use]
    pub fn item_interval(&self) -> Duration {
        Duration::from_millis(self.item_interval_ms.unwrap_or(DEFAULT_ITEM_INTERVAL_MS))
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms.unwrap_or(DEFAULT_SETTLE_DELAY_MS))
    }

    #[must_use]
    pub fn confirmation_delay(&self) -> Duration {
        Duration::from_millis(
            self.confirmation_delay_ms
                .unwrap_or(DEFAULT_CONFIRMATION_DELAY_MS),
        )
    }
}

/// `[certificate]` section.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CertificateConfig {
    /// Directory holding the logo images. Logos are omitted when unset.
    pub assets_dir: Option<PathBuf>,
    /// File name of the agency logo (top left).
    pub agency_logo: Option<String>,
    /// File name of the country logo (top right).
    pub country_logo: Option<String>,
    /// Directory for locally saved certificates.
    pub output_dir: Option<PathBuf>,
    /// File name used when saving locally.
    pub file_name: Option<String>,
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            assets_dir: None,
            agency_logo: Some(DEFAULT_AGENCY_LOGO.to_string()),
            country_logo: Some(DEFAULT_COUNTRY_LOGO.to_string()),
            output_dir: Some(PathBuf::from(".")),
            file_name: Some(DEFAULT_CERTIFICATE_FILE_NAME.to_string()),
        }
    }
}

impl CertificateConfig {
    #[must_use]
    pub fn agency_logo(&self) -> &str {
        self.agency_logo.as_deref().unwrap_or(DEFAULT_AGENCY_LOGO)
    }

    #[must_use]
    pub fn country_logo(&self) -> &str {
        self.country_logo.as_deref().unwrap_or(DEFAULT_COUNTRY_LOGO)
    }

    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        self.file_name
            .as_deref()
            .unwrap_or(DEFAULT_CERTIFICATE_FILE_NAME)
    }
}

/// `[delivery]` section.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DeliveryConfig {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            endpoint: Some(DEFAULT_DELIVERY_ENDPOINT.to_string()),
            timeout_secs: Some(DEFAULT_DELIVERY_TIMEOUT_SECS),
        }
    }
}

impl DeliveryConfig {
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_DELIVERY_ENDPOINT)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_DELIVERY_TIMEOUT_SECS))
    }
}
