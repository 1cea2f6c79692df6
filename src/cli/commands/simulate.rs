//! Simulate command implementation
//!
//! Handles `tramite simulate`: log in, run the review, issue the certificate,
//! then save and/or mail it.

use std::path::Path;

use anyhow::Result;
use chrono::{Local, Utc};
use tracing::{info, warn};

use tramite_delivery::{
    DeliveryChannel, DeliveryError, DeliveryErrorKind, DeliveryMetadata, DeliveryOutcome,
    HttpDelivery, LocalSave, is_valid_destination,
};
use tramite_orchestrator::{OrchestratorError, RunEvent, TimedEvent};

use super::json_emit::{SimulateOutcome, emit_event_json, emit_simulate_json};
use crate::portal::{Portal, Session, sample_record};
use crate::{Config, TramiteError};

/// Execute the simulate command
///
/// The certificate is saved when `--out` is given or when no `--email` is,
/// so a run always leaves the document somewhere. Ctrl-C cancels the review.
pub async fn execute_simulate_command(
    config: &Config,
    user: &str,
    email: Option<&str>,
    out: Option<&Path>,
    json: bool,
) -> Result<()> {
    if let Some(address) = email {
        if !is_valid_destination(address.trim()) {
            return Err(TramiteError::from(DeliveryError::new(
                DeliveryErrorKind::InvalidDestination,
                address,
            ))
            .into());
        }
    }

    let portal = Portal::from_config(config);
    let mut session = Session::new();
    session.login(user)?;

    let record = sample_record(Local::now().date_naive(), demo_serial());
    let mut handle = portal.begin_review(&mut session)?;
    let run_id = handle.run_handle().run_id();

    let finished = tokio::select! {
        result = portal.finish_review(&mut session, &mut handle, &record, |event| print_event(event, json)) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };
    let document = match finished {
        Some(result) => result?,
        None => {
            handle.cancel();
            return Err(TramiteError::from(OrchestratorError::Cancelled { run_id }).into());
        }
    };

    let bytes = document.to_portable_bytes();

    let save_dir = match (out, email) {
        (Some(dir), _) => Some(dir.to_path_buf()),
        (None, None) => Some(config.certificate.output_dir()),
        (None, Some(_)) => None,
    };
    let saved_to = match save_dir {
        Some(dir) => Some(LocalSave::new(dir).save(&bytes, config.certificate.file_name())?),
        None => None,
    };

    let delivery = match email {
        Some(address) => {
            let channel = HttpDelivery::new(config.delivery.endpoint(), config.delivery.timeout())
                .map_err(TramiteError::from)?;
            let metadata = DeliveryMetadata::new(document.registration_code());
            Some(channel.send(address, &bytes, &metadata).await)
        }
        None => None,
    };

    if json {
        let outcome = SimulateOutcome {
            registration_code: document.registration_code(),
            page_count: document.page_count(),
            byte_len: bytes.len(),
            saved_to: saved_to.as_ref().map(|p| p.display().to_string()),
            delivery: delivery.as_ref(),
        };
        println!("{}", emit_simulate_json(&outcome)?);
    } else {
        println!(
            "✓ Certificate {} issued ({} page(s), {} bytes)",
            document.registration_code(),
            document.page_count(),
            bytes.len()
        );
        if let Some(path) = &saved_to {
            println!("  Saved to {}", path.display());
        }
        if let Some(DeliveryOutcome::Ok { delivery_id }) = &delivery {
            println!("  Sent to {} (id {delivery_id})", email.unwrap_or_default().trim());
        }
    }

    if let Some(outcome) = delivery {
        outcome.into_result().map_err(TramiteError::from)?;
    }

    info!(
        registration_code = %document.registration_code(),
        saved = saved_to.is_some(),
        "Simulation finished"
    );
    Ok(())
}

fn print_event(event: &TimedEvent, json: bool) {
    if json {
        match emit_event_json(event) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!(error = %e, "Could not emit review event"),
        }
        return;
    }

    match &event.event {
        RunEvent::PhaseStarted { title, .. } => println!("▶ {title}"),
        RunEvent::ItemRevealed { text, .. } => println!("  • {text}"),
        RunEvent::PhaseCompleted {
            progress_percent, ..
        } => println!("  ✓ {progress_percent}%"),
        RunEvent::AllPhasesCompleted => println!("✓ Review completed"),
    }
}

/// Serial for the demo registration code, below 10 000 like the portal's.
fn demo_serial() -> u32 {
    Utc::now().timestamp_millis().rem_euclid(10_000) as u32
}
