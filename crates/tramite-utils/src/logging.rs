//! Logging and observability infrastructure for tramite
//!
//! Sets up the `tracing` subscriber for the CLI and provides the structured
//! log helpers used by the orchestrator and the document builder.

use tracing::{Level, info, span, warn};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable compact lines.
    #[default]
    Compact,
    /// One JSON object per event.
    Json,
}

/// Initialize tracing subscriber for structured logging
///
/// `RUST_LOG` wins when set. Otherwise the filter is `tramite=info,warn`, or
/// `tramite=debug,info` in verbose mode, where span close events are also
/// reported with their timing.
pub fn init_tracing(verbose: bool, format: LogFormat) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("tramite=debug,info")
            } else {
                EnvFilter::try_new("tramite=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let span_events = if verbose {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_span_events(span_events)
                        .with_writer(std::io::stderr),
                )
                .try_init()?;
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_target(verbose)
                        .with_thread_ids(false)
                        .with_thread_names(false)
                        .with_line_number(false)
                        .with_file(false)
                        .with_span_events(span_events)
                        .with_writer(std::io::stderr)
                        .compact(),
                )
                .try_init()?;
        }
    }

    Ok(())
}

/// Create a span for one phase of a review run
pub fn phase_span(run_id: u64, phase_id: u32, phase_name: &str) -> tracing::Span {
    span!(
        Level::INFO,
        "review_phase",
        run_id = %run_id,
        phase_id = %phase_id,
        phase = %phase_name,
    )
}

/// Log phase entry with structured fields
pub fn log_phase_start(run_id: u64, phase_id: u32, phase_name: &str, item_count: usize) {
    info!(
        run_id = %run_id,
        phase_id = %phase_id,
        phase = %phase_name,
        item_count = %item_count,
        "Review phase started"
    );
}

/// Log phase completion with the aggregate progress it produced
pub fn log_phase_complete(run_id: u64, phase_id: u32, phase_name: &str, progress_percent: u8) {
    info!(
        run_id = %run_id,
        phase_id = %phase_id,
        phase = %phase_name,
        progress_percent = %progress_percent,
        "Review phase completed"
    );
}

pub fn log_run_cancelled(run_id: u64, pending_callbacks: usize) {
    warn!(
        run_id = %run_id,
        pending_callbacks = %pending_callbacks,
        "Review run cancelled"
    );
}

/// Log a finished certificate document.
///
/// The blake3 digest makes byte-identical rebuilds visible in the logs.
pub fn log_document_built(registration_code: &str, page_count: usize, bytes: &[u8]) {
    info!(
        registration_code = %registration_code,
        page_count = %page_count,
        byte_len = %bytes.len(),
        blake3 = %content_digest(bytes),
        "Certificate document built"
    );
}

/// Hex blake3 digest of a byte payload
#[must_use]
pub fn content_digest(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_digest_is_stable() {
        let a = content_digest(b"%PDF-1.7");
        let b = content_digest(b"%PDF-1.7");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, content_digest(b"%PDF-1.6"));
    }

    #[test]
    fn test_log_helpers_do_not_panic_without_subscriber() {
        let span = phase_span(1, 2, "Fase Legal");
        let _guard = span.enter();
        log_phase_start(1, 2, "Fase Legal", 3);
        log_phase_complete(1, 2, "Fase Legal", 50);
        log_run_cancelled(1, 4);
        log_document_built("PF010-2025-001234", 1, b"bytes");
    }

    #[test]
    fn test_default_format_is_compact() {
        assert_eq!(LogFormat::default(), LogFormat::Compact);
    }
}
