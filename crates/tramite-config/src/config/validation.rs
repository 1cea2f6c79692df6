use tramite_utils::error::ConfigError;

use super::Config;

const MAX_PHASE_DURATION_MS: u64 = 600_000;
const MAX_DELAY_MS: u64 = 60_000;
const MAX_DELIVERY_TIMEOUT_SECS: u64 = 300;

fn invalid(key: &str, value: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.into(),
    }
}

impl Config {
    /// Validate configuration values
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if let Some(duration) = self.timing.phase_duration_ms {
            if duration == 0 {
                return Err(invalid(
                    "timing.phase_duration_ms",
                    "must be greater than 0",
                ));
            }
            if duration > MAX_PHASE_DURATION_MS {
                return Err(invalid(
                    "timing.phase_duration_ms",
                    "exceeds maximum limit of 600000 ms (10 minutes)",
                ));
            }
        }

        if let Some(interval) = self.timing.item_interval_ms {
            if interval == 0 {
                return Err(invalid("timing.item_interval_ms", "must be greater than 0"));
            }
            if interval >= self.timing.phase_duration().as_millis() as u64 {
                return Err(invalid(
                    "timing.item_interval_ms",
                    format!(
                        "{interval} must be shorter than the phase duration ({} ms)",
                        self.timing.phase_duration().as_millis()
                    ),
                ));
            }
        }

        if let Some(settle) = self.timing.settle_delay_ms
            && settle > MAX_DELAY_MS
        {
            return Err(invalid(
                "timing.settle_delay_ms",
                "exceeds maximum limit of 60000 ms",
            ));
        }

        if let Some(confirmation) = self.timing.confirmation_delay_ms
            && confirmation > MAX_DELAY_MS
        {
            return Err(invalid(
                "timing.confirmation_delay_ms",
                "exceeds maximum limit of 60000 ms",
            ));
        }

        if let Some(file_name) = &self.certificate.file_name {
            if file_name.trim().is_empty() {
                return Err(invalid("certificate.file_name", "must not be empty"));
            }
            if file_name.contains('/') || file_name.contains('\\') {
                return Err(invalid(
                    "certificate.file_name",
                    format!("'{file_name}' must be a plain file name"),
                ));
            }
            if !file_name.to_ascii_lowercase().ends_with(".pdf") {
                return Err(invalid(
                    "certificate.file_name",
                    format!("'{file_name}' must end in .pdf"),
                ));
            }
        }

        for (key, logo) in [
            ("certificate.agency_logo", &self.certificate.agency_logo),
            ("certificate.country_logo", &self.certificate.country_logo),
        ] {
            if let Some(name) = logo
                && name.trim().is_empty()
            {
                return Err(invalid(key, "must not be empty"));
            }
        }

        if let Some(endpoint) = &self.delivery.endpoint
            && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(invalid(
                "delivery.endpoint",
                format!("'{endpoint}' must be an http:// or https:// URL"),
            ));
        }

        if let Some(timeout) = self.delivery.timeout_secs
            && (timeout == 0 || timeout > MAX_DELIVERY_TIMEOUT_SECS)
        {
            return Err(invalid(
                "delivery.timeout_secs",
                "must be between 1 and 300 seconds",
            ));
        }

        Ok(())
    }
}
