//! CLI entry point and dispatch logic
//!
//! `run()` parses arguments, initializes tracing, discovers the
//! configuration, creates the tokio runtime, dispatches the command and
//! reports every error itself.

use clap::Parser;

use super::args::{Cli, Commands};
use super::commands;

use crate::{CliArgs, Config, ConfigError, ExitCode, TramiteError};
use tramite_utils::logging::init_tracing;

/// Main CLI execution function.
///
/// Returns `Err(ExitCode)` after printing the error; main.rs only exits.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose, cli.log_format.into()) {
        eprintln!("✗ Failed to initialize logging: {e}");
        return Err(ExitCode::INTERNAL);
    }

    let cli_args = CliArgs {
        config_path: cli.config.clone(),
        phase_duration_ms: cli.phase_duration_ms,
        item_interval_ms: cli.item_interval_ms,
        settle_delay_ms: cli.settle_delay_ms,
        confirmation_delay_ms: cli.confirmation_delay_ms,
        assets_dir: cli.assets_dir.clone(),
        output_dir: None,
        delivery_endpoint: cli.delivery_endpoint.clone(),
    };

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            let err = match err.downcast::<ConfigError>() {
                Ok(config_err) => TramiteError::Config(config_err),
                Err(other) => TramiteError::Config(ConfigError::DiscoveryFailed {
                    reason: format!("{other:#}"),
                }),
            };
            eprintln!("{}", contextual_report(&err, "config"));
            return Err(err.to_exit_code());
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let operation = match &cli.command {
        Commands::Simulate { .. } => "simulate",
        Commands::Certificate { .. } => "certificate",
        Commands::Phases { .. } => "phases",
        Commands::Config { .. } => "config",
    };

    let result = rt.block_on(async {
        match cli.command {
            Commands::Simulate {
                user,
                email,
                out,
                json,
            } => {
                commands::execute_simulate_command(
                    &config,
                    &user,
                    email.as_deref(),
                    out.as_deref(),
                    json,
                )
                .await
            }
            Commands::Certificate { record, out } => {
                commands::execute_certificate_command(&config, record.as_deref(), out.as_deref())
            }
            Commands::Phases { json } => commands::execute_phases_command(json),
            Commands::Config { json } => commands::execute_config_command(&config, json),
        }
    });

    if let Err(error) = result {
        if let Some(tramite_error) = error.downcast_ref::<TramiteError>() {
            eprintln!("{}", contextual_report(tramite_error, operation));
            return Err(tramite_error.to_exit_code());
        }

        eprintln!("✗ Unexpected error: {error:#}");
        if let Some(suggestions) = enhance_error_context(&error) {
            eprintln!("\n  Suggestions:");
            for (i, suggestion) in suggestions.iter().enumerate() {
                eprintln!("    {}. {}", i + 1, suggestion);
            }
        }
        eprintln!("\n  Run with --verbose for more detailed output");
        return Err(ExitCode::INTERNAL);
    }

    Ok(())
}

/// `display_for_user` plus a line naming the failed operation.
fn contextual_report(error: &TramiteError, operation: &str) -> String {
    format!("✗ {operation} failed\n\n{}", error.display_for_user())
}

/// Suggestions for common failures that are not `TramiteError`s
fn enhance_error_context(error: &anyhow::Error) -> Option<Vec<String>> {
    let error_str = format!("{error:#}");

    if error_str.contains("Permission denied") {
        Some(vec![
            "Check permissions of the output directory".to_string(),
            "Choose another directory with --out".to_string(),
        ])
    } else if error_str.contains("No such file or directory") {
        Some(vec![
            "Verify the specified paths exist".to_string(),
            "Check that you're running from the correct directory".to_string(),
        ])
    } else {
        None
    }
}
