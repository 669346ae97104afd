//! Exporters: lossless structured dump and paginated document rendering.
//! Document rendering is CPU-bound and runs inside tokio::task::spawn_blocking.

pub mod document;
pub mod dump;
pub mod pdf;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

pub use document::{export_document, DocumentRenderer, TextRenderer};
pub use dump::{dump_json, parse_dump, parse_raw_dump, DUMP_EXTENSION};
pub use pdf::PdfRenderer;

/// File stem used when the subject has no usable name.
pub const DEFAULT_ARTIFACT_STEM: &str = "resume";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Could not serialize the analysis: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Not a valid analysis dump: {0}")]
    Parse(String),

    #[error("{0}")]
    Render(String),

    #[error("Cannot write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("A document export is already in progress")]
    Busy,
}

/// `<name>_analysis.<ext>`, with characters unsafe in file names replaced.
pub fn artifact_file_name(subject_name: Option<&str>, extension: &str) -> String {
    let stem: String = subject_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_ARTIFACT_STEM)
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{stem}_analysis.{extension}")
}

/// Writes an artifact into `dir`, creating the directory if needed.
pub fn write_artifact(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(file_name);
    std::fs::write(&path, bytes).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}

// ────────────────────────────────────────────────────────────────────────────
// Single-flight slot for document export
// ────────────────────────────────────────────────────────────────────────────

/// Document export runs independently of analysis but is itself single-flight.
#[derive(Debug, Clone, Default)]
pub struct ExportSlot {
    busy: Arc<AtomicBool>,
}

/// Held for the duration of one export; releases the slot on drop.
#[derive(Debug)]
pub struct ExportGuard {
    busy: Arc<AtomicBool>,
}

impl ExportSlot {
    pub fn try_acquire(&self) -> Result<ExportGuard, ExportError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::Busy)?;
        Ok(ExportGuard {
            busy: Arc::clone(&self.busy),
        })
    }

    #[cfg(test)]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_name_from_subject() {
        assert_eq!(artifact_file_name(Some("John Doe"), "json"), "John Doe_analysis.json");
    }

    #[test]
    fn test_artifact_name_falls_back_when_absent_or_blank() {
        assert_eq!(artifact_file_name(None, "pdf"), "resume_analysis.pdf");
        assert_eq!(artifact_file_name(Some("  "), "pdf"), "resume_analysis.pdf");
    }

    #[test]
    fn test_artifact_name_replaces_path_separators() {
        assert_eq!(
            artifact_file_name(Some("../etc/pass:wd"), "json"),
            ".._etc_pass_wd_analysis.json"
        );
    }

    #[test]
    fn test_write_artifact_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports");
        let path = write_artifact(&target, "a_analysis.json", b"{}").unwrap();
        assert_eq!(path, target.join("a_analysis.json"));
        assert_eq!(std::fs::read(&path).unwrap(), b"{}");
    }

    #[test]
    fn test_export_slot_is_single_flight() {
        let slot = ExportSlot::default();
        let guard = slot.try_acquire().unwrap();
        assert!(slot.is_busy());
        assert!(matches!(slot.try_acquire(), Err(ExportError::Busy)));

        drop(guard);
        assert!(!slot.is_busy());
        assert!(slot.try_acquire().is_ok());
    }
}
