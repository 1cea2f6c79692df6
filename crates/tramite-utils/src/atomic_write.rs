//! Atomic file writes: temporary file in the target directory, fsync, rename.
//!
//! Used for saving rendered certificates so a partially written file is never
//! observed under the final name.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// Atomically write `content` to `path`.
///
/// Parent directories are created as needed. The temporary file lives next to
/// the target so the final rename stays on one filesystem.
pub fn write_bytes_atomic(path: &Path, content: &[u8]) -> Result<u64> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create parent directory: {}", parent.display()))?;

    let mut temp_file = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in: {}", parent.display()))?;

    temp_file
        .write_all(content)
        .with_context(|| "Failed to write content to temporary file")?;

    temp_file
        .as_file()
        .sync_all()
        .with_context(|| "Failed to fsync temporary file")?;

    temp_file
        .persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to rename temporary file to {}", path.display()))?;

    Ok(content.len() as u64)
}
