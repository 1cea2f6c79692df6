use std::path::PathBuf;
use std::time::Duration;

use tramite_utils::error::ConfigError;

use super::discovery::{default_attribution, overlay};
use super::{CertificateConfig, Config, ConfigSource, DeliveryConfig, TimingConfig};

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// Use this when embedding tramite without environment variables or
    /// config files, e.g. in tests that need deterministic timing.
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use tramite_config::Config;
    ///
    /// let config = Config::builder()
    ///     .phase_duration(Duration::from_millis(300))
    ///     .item_interval(Duration::from_millis(60))
    ///     .build()
    ///     .expect("valid config");
    /// assert_eq!(config.timing.phase_duration_ms, Some(300));
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for programmatic configuration of tramite.
///
/// All values set via the builder are attributed to
/// `ConfigSource::Programmatic`.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    phase_duration: Option<Duration>,
    item_interval: Option<Duration>,
    settle_delay: Option<Duration>,
    confirmation_delay: Option<Duration>,
    assets_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    file_name: Option<String>,
    delivery_endpoint: Option<String>,
    delivery_timeout: Option<Duration>,
}

impl ConfigBuilder {
    /// Create a new `ConfigBuilder` with no values set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Time each review phase stays active. Default: 3000 ms.
    #[must_use]
    pub fn phase_duration(mut self, duration: Duration) -> Self {
        self.phase_duration = Some(duration);
        self
    }

    /// Stagger between checklist items. Default: 600 ms.
    #[must_use]
    pub fn item_interval(mut self, interval: Duration) -> Self {
        self.item_interval = Some(interval);
        self
    }

    #[must_use]
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = Some(delay);
        self
    }

    #[must_use]
    pub fn confirmation_delay(mut self, delay: Duration) -> Self {
        self.confirmation_delay = Some(delay);
        self
    }

    /// Directory holding the logo images.
    #[must_use]
    pub fn assets_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.assets_dir = Some(path.into());
        self
    }

    /// Directory for locally saved certificates.
    #[must_use]
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    #[must_use]
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn delivery_endpoint(mut self, url: impl Into<String>) -> Self {
        self.delivery_endpoint = Some(url.into());
        self
    }

    #[must_use]
    pub fn delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = Some(timeout);
        self
    }

    /// Build the configuration, validating the result.
    pub fn build(self) -> Result<Config, ConfigError> {
        let mut source_attribution = default_attribution();
        let mut timing = TimingConfig::default();
        let mut certificate = CertificateConfig::default();
        let mut delivery = DeliveryConfig::default();

        let src = ConfigSource::Programmatic;
        let attr = &mut source_attribution;
        let millis = |d: Option<Duration>| d.map(|d| d.as_millis() as u64);

        overlay(
            &mut timing.phase_duration_ms,
            millis(self.phase_duration),
            "timing.phase_duration_ms",
            src,
            attr,
        );
        overlay(
            &mut timing.item_interval_ms,
            millis(self.item_interval),
            "timing.item_interval_ms",
            src,
            attr,
        );
        overlay(
            &mut timing.settle_delay_ms,
            millis(self.settle_delay),
            "timing.settle_delay_ms",
            src,
            attr,
        );
        overlay(
            &mut timing.confirmation_delay_ms,
            millis(self.confirmation_delay),
            "timing.confirmation_delay_ms",
            src,
            attr,
        );
        overlay(
            &mut certificate.assets_dir,
            self.assets_dir,
            "certificate.assets_dir",
            src,
            attr,
        );
        overlay(
            &mut certificate.output_dir,
            self.output_dir,
            "certificate.output_dir",
            src,
            attr,
        );
        overlay(
            &mut certificate.file_name,
            self.file_name,
            "certificate.file_name",
            src,
            attr,
        );
        overlay(
            &mut delivery.endpoint,
            self.delivery_endpoint,
            "delivery.endpoint",
            src,
            attr,
        );
        overlay(
            &mut delivery.timeout_secs,
            self.delivery_timeout.map(|d| d.as_secs()),
            "delivery.timeout_secs",
            src,
            attr,
        );

        let config = Config {
            timing,
            certificate,
            delivery,
            config_path: None,
            source_attribution,
        };

        config.validate()?;

        Ok(config)
    }
}
