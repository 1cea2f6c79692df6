//! JSON emit functions for CLI output
//!
//! Every JSON document printed by the CLI goes through JCS (RFC 8785) so
//! output is stable across runs.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use tramite_delivery::DeliveryOutcome;
use tramite_orchestrator::TimedEvent;
use tramite_phases::Phase;

use crate::emit_jcs;

#[derive(Serialize)]
struct PhasesOutput<'a> {
    schema_version: &'static str,
    phases: &'a [Phase],
}

#[derive(Serialize)]
struct ConfigValue<'a> {
    value: &'a str,
    source: &'a str,
}

#[derive(Serialize)]
struct ConfigOutput<'a> {
    schema_version: &'static str,
    config_path: Option<String>,
    values: BTreeMap<&'a str, ConfigValue<'a>>,
}

/// Final line of `simulate --json`.
#[derive(Serialize)]
pub struct SimulateOutcome<'a> {
    pub registration_code: &'a str,
    pub page_count: usize,
    pub byte_len: usize,
    pub saved_to: Option<String>,
    pub delivery: Option<&'a DeliveryOutcome>,
}

pub fn emit_event_json(event: &TimedEvent) -> Result<String> {
    emit_jcs(event).context("Failed to emit event JSON")
}

pub fn emit_phases_json(phases: &[Phase]) -> Result<String> {
    emit_jcs(&PhasesOutput {
        schema_version: "phases.v1",
        phases,
    })
    .context("Failed to emit phases JSON")
}

pub fn emit_config_json(
    config_path: Option<&Path>,
    effective: &BTreeMap<String, (String, String)>,
) -> Result<String> {
    let values = effective
        .iter()
        .map(|(key, (value, source))| {
            (
                key.as_str(),
                ConfigValue {
                    value: value.as_str(),
                    source: source.as_str(),
                },
            )
        })
        .collect();

    emit_jcs(&ConfigOutput {
        schema_version: "config.v1",
        config_path: config_path.map(|p| p.display().to_string()),
        values,
    })
    .context("Failed to emit config JSON")
}

pub fn emit_simulate_json(outcome: &SimulateOutcome<'_>) -> Result<String> {
    emit_jcs(outcome).context("Failed to emit simulate JSON")
}
