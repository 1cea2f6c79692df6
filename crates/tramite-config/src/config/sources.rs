use std::collections::HashMap;

use super::{Config, ConfigSource};

fn source_label(source: Option<&ConfigSource>) -> String {
    source.copied().unwrap_or(ConfigSource::Default).to_string()
}

impl Config {
    /// Get effective configuration as key-value pairs with source attribution
    #[must_use]
    pub fn effective_config(&self) -> HashMap<String, (String, String)> {
        let mut config = HashMap::new();

        let mut add_config = |key: &str, value: Option<String>| {
            if let Some(val) = value {
                let source = source_label(self.source_attribution.get(key));
                config.insert(key.to_string(), (val, source));
            }
        };

        let timing = &self.timing;
        add_config(
            "timing.phase_duration_ms",
            timing.phase_duration_ms.map(|v| v.to_string()),
        );
        add_config(
            "timing.item_interval_ms",
            timing.item_interval_ms.map(|v| v.to_string()),
        );
        add_config(
            "timing.settle_delay_ms",
            timing.settle_delay_ms.map(|v| v.to_string()),
        );
        add_config(
            "timing.confirmation_delay_ms",
            timing.confirmation_delay_ms.map(|v| v.to_string()),
        );

        let certificate = &self.certificate;
        add_config(
            "certificate.assets_dir",
            certificate
                .assets_dir
                .as_ref()
                .map(|p| p.display().to_string()),
        );
        add_config("certificate.agency_logo", certificate.agency_logo.clone());
        add_config("certificate.country_logo", certificate.country_logo.clone());
        add_config(
            "certificate.output_dir",
            certificate
                .output_dir
                .as_ref()
                .map(|p| p.display().to_string()),
        );
        add_config("certificate.file_name", certificate.file_name.clone());

        add_config("delivery.endpoint", self.delivery.endpoint.clone());
        add_config(
            "delivery.timeout_secs",
            self.delivery.timeout_secs.map(|v| v.to_string()),
        );

        config
    }
}
