//! Certificate command implementation
//!
//! Handles `tramite certificate`: render a record straight to PDF without
//! running the review.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

use tramite_certificate::CertificateRecord;
use tramite_delivery::LocalSave;

use crate::portal::{certificate_builder, sample_record};
use crate::{Config, TramiteError};

/// Execute the certificate command
pub fn execute_certificate_command(config: &Config, record: Option<&Path>, out: Option<&Path>) -> Result<()> {
    let record = match record {
        Some(path) => load_record(path)?,
        None => sample_record(Local::now().date_naive(), 1),
    };

    let document = certificate_builder(config).build(&record);
    let bytes = document.to_portable_bytes();

    let dir = out.map_or_else(|| config.certificate.output_dir(), Path::to_path_buf);
    let path = LocalSave::new(dir).save(&bytes, config.certificate.file_name())?;

    println!(
        "✓ Certificate {} written to {} ({} page(s))",
        document.registration_code(),
        path.display(),
        document.page_count()
    );
    Ok(())
}

/// Read a JSON record; accepts both field naming schemes.
fn load_record(path: &Path) -> Result<CertificateRecord> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read record file: {}", path.display()))?;
    let record: CertificateRecord = serde_json::from_str(&text).map_err(TramiteError::from)?;
    Ok(record)
}
