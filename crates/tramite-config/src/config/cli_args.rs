use std::path::PathBuf;

/// Command-line overrides fed into configuration discovery.
///
/// Every `Some` value wins over the config file and is attributed to
/// [`ConfigSource::Cli`](super::ConfigSource::Cli).
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub phase_duration_ms: Option<u64>,
    pub item_interval_ms: Option<u64>,
    pub settle_delay_ms: Option<u64>,
    pub confirmation_delay_ms: Option<u64>,
    pub assets_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub delivery_endpoint: Option<String>,
}
