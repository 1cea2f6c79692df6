use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;
use tramite_utils::atomic_write::write_bytes_atomic;

/// File name used when the caller suggests none.
pub const DEFAULT_FILE_NAME: &str = "certificado-registro-sanitario.pdf";

/// Saves documents into one output directory.
#[derive(Debug, Clone)]
pub struct LocalSave {
    dir: PathBuf,
}

impl LocalSave {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Atomically write `bytes` and return the final path.
    ///
    /// Only the last component of `suggested_filename` is used, so a
    /// suggestion can never escape the output directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub fn save(&self, bytes: &[u8], suggested_filename: &str) -> Result<PathBuf> {
        let name = Path::new(suggested_filename)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(DEFAULT_FILE_NAME);
        let path = self.dir.join(name);

        let written = write_bytes_atomic(&path, bytes)?;
        info!(path = %path.display(), bytes = written, "Certificate saved");
        Ok(path)
    }
}
