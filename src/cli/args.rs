//! CLI argument definitions and parsing structures

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use tramite_utils::logging::LogFormat;

/// tramite - citizen portal prototype for sanitary registration procedures
#[derive(Parser, Debug)]
#[command(name = "tramite")]
#[command(about = "Simulate a sanitary registration review and issue its certificate")]
#[command(long_about = r#"
tramite simulates the government review of a PF010 cosmetics sanitary
registration and issues the resulting certificate as a PDF.

EXAMPLES:
  # Run the review and save the certificate to ./out
  tramite simulate --out ./out

  # Faster timers for demos
  tramite simulate --phase-duration-ms 300 --item-interval-ms 50 --settle-delay-ms 50

  # Mail the certificate once the review completes
  tramite simulate --email ana@example.hn --delivery-endpoint http://localhost:3001/api/send-certificate

  # Render a certificate from a JSON record
  tramite certificate --record record.json --out ./out

  # Show the review phases or the effective configuration
  tramite phases --json
  tramite config

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  Config file is discovered by searching upward from CWD for .tramite/config.toml
  Use --config to specify an explicit config file path

PHASES:
  SAC → Verificación Técnica → Fase Legal → Emisión
  Each phase reveals its checklist item by item, then completes
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Compact)]
    pub log_format: LogFormatArg,

    /// Time each review phase stays active, in milliseconds
    #[arg(long, global = true)]
    pub phase_duration_ms: Option<u64>,

    /// Stagger between checklist items, in milliseconds
    #[arg(long, global = true)]
    pub item_interval_ms: Option<u64>,

    /// Pause after the last phase before the review completes, in milliseconds
    #[arg(long, global = true)]
    pub settle_delay_ms: Option<u64>,

    /// Pause between review completion and issuing the certificate, in milliseconds
    #[arg(long, global = true)]
    pub confirmation_delay_ms: Option<u64>,

    /// Directory holding the logo images
    #[arg(long, global = true)]
    pub assets_dir: Option<PathBuf>,

    /// URL of the send-certificate endpoint
    #[arg(long, global = true)]
    pub delivery_endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the simulated review and issue the certificate
    Simulate {
        /// Identity used to log in to the portal
        #[arg(long, default_value = "ciudadano")]
        user: String,

        /// Mail the certificate to this address
        #[arg(long)]
        email: Option<String>,

        /// Save the certificate into this directory
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print review events and the outcome as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Render a certificate without running the review
    Certificate {
        /// JSON certificate record (defaults to the demo record)
        #[arg(long)]
        record: Option<PathBuf>,

        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List the review phases and their checklists
    Phases {
        /// Output as canonical JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration and where each value came from
    Config {
        /// Output as canonical JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

/// Build the CLI command structure
#[must_use]
pub fn build_cli() -> clap::Command {
    <Cli as clap::CommandFactory>::command()
}
