//! Intake — turns a chosen file or pasted text into one `Submission`.
//!
//! Exactly one payload kind per submission. Empty input is not an error: it
//! yields `Ok(None)` and nothing is sent upstream.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub const PDF_MIME: &str = "application/pdf";
const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Only PDF files are supported ('{file_name}' is not a PDF)")]
    NotPdf { file_name: String },

    #[error("'{file_name}' is empty")]
    EmptyFile { file_name: String },

    #[error("Provide either a file or text, not both")]
    Ambiguous,

    #[error("Could not extract text from '{file_name}': {message}")]
    Extraction { file_name: String, message: String },
}

/// A single PDF picked for upload. Construction validates type and contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFile {
    file_name: String,
    bytes: Vec<u8>,
}

impl PdfFile {
    pub fn load(path: &Path) -> Result<Self, IntakeError> {
        let bytes = std::fs::read(path).map_err(|source| IntakeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(file_name, bytes)
    }

    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, IntakeError> {
        let file_name = file_name.into();
        let has_pdf_extension = Path::new(&file_name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if !has_pdf_extension {
            return Err(IntakeError::NotPdf { file_name });
        }
        if bytes.is_empty() {
            return Err(IntakeError::EmptyFile { file_name });
        }
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(IntakeError::NotPdf { file_name });
        }
        debug!("Accepted PDF '{}' ({} bytes)", file_name, bytes.len());
        Ok(Self { file_name, bytes })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Extracts the document text locally so it can go through the text path.
    /// `pdf_extract` panics on some malformed inputs; those become errors too.
    pub fn extract_text(&self) -> Result<String, IntakeError> {
        let bytes = &self.bytes;
        let extracted = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
            .map_err(|_| IntakeError::Extraction {
                file_name: self.file_name.clone(),
                message: "the PDF could not be parsed".to_string(),
            })?;
        let text = extracted.map_err(|e| IntakeError::Extraction {
            file_name: self.file_name.clone(),
            message: e.to_string(),
        })?;
        if text.trim().is_empty() {
            return Err(IntakeError::Extraction {
                file_name: self.file_name.clone(),
                message: "no text layer found".to_string(),
            });
        }
        Ok(text)
    }
}

/// One of the two mutually exclusive payload kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    File(PdfFile),
    Text(String),
}

impl Submission {
    pub fn from_parts(
        file: Option<PdfFile>,
        text: Option<String>,
    ) -> Result<Option<Self>, IntakeError> {
        let text = text.filter(|t| !t.trim().is_empty());
        match (file, text) {
            (Some(_), Some(_)) => Err(IntakeError::Ambiguous),
            (Some(file), None) => Ok(Some(Submission::File(file))),
            (None, Some(text)) => Ok(Some(Submission::Text(text))),
            (None, None) => Ok(None),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Submission::File(_) => "file",
            Submission::Text(_) => "text",
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Submission::Text(text) => Some(text),
            Submission::File(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf_bytes() -> Vec<u8> {
        b"%PDF-1.4\n%fake body\n%%EOF".to_vec()
    }

    #[test]
    fn test_both_empty_is_noop() {
        assert_eq!(Submission::from_parts(None, None).unwrap(), None);
        assert_eq!(
            Submission::from_parts(None, Some("  \n\t".to_string())).unwrap(),
            None
        );
    }

    #[test]
    fn test_text_only_submission_keeps_text_verbatim() {
        let submission = Submission::from_parts(None, Some(" John Doe ".to_string()))
            .unwrap()
            .unwrap();
        assert_eq!(submission, Submission::Text(" John Doe ".to_string()));
        assert_eq!(submission.kind(), "text");
    }

    #[test]
    fn test_file_and_text_together_is_rejected() {
        let file = PdfFile::from_bytes("cv.pdf", pdf_bytes()).unwrap();
        let err = Submission::from_parts(Some(file), Some("text".to_string())).unwrap_err();
        assert!(matches!(err, IntakeError::Ambiguous));
    }

    #[test]
    fn test_file_with_blank_text_is_a_file_submission() {
        let file = PdfFile::from_bytes("cv.pdf", pdf_bytes()).unwrap();
        let submission = Submission::from_parts(Some(file), Some(" ".to_string()))
            .unwrap()
            .unwrap();
        assert_eq!(submission.kind(), "file");
        assert_eq!(submission.text(), None);
    }

    #[test]
    fn test_extension_check_is_case_insensitive() {
        assert!(PdfFile::from_bytes("CV.PDF", pdf_bytes()).is_ok());
    }

    #[test]
    fn test_non_pdf_extension_rejected() {
        let err = PdfFile::from_bytes("cv.docx", pdf_bytes()).unwrap_err();
        assert!(matches!(err, IntakeError::NotPdf { .. }));
    }

    #[test]
    fn test_pdf_extension_without_magic_rejected() {
        let err = PdfFile::from_bytes("cv.pdf", b"PK\x03\x04zip".to_vec()).unwrap_err();
        assert!(matches!(err, IntakeError::NotPdf { .. }));
    }

    #[test]
    fn test_empty_file_rejected() {
        let err = PdfFile::from_bytes("cv.pdf", Vec::new()).unwrap_err();
        assert!(matches!(err, IntakeError::EmptyFile { .. }));
    }

    #[test]
    fn test_load_reads_file_name_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.pdf");
        std::fs::write(&path, pdf_bytes()).unwrap();

        let file = PdfFile::load(&path).unwrap();
        assert_eq!(file.file_name(), "resume.pdf");
        assert_eq!(file.bytes(), pdf_bytes().as_slice());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PdfFile::load(&dir.path().join("absent.pdf")).unwrap_err();
        assert!(matches!(err, IntakeError::Io { .. }));
    }

    #[test]
    fn test_extract_text_from_garbage_pdf_is_input_error() {
        let file = PdfFile::from_bytes("cv.pdf", pdf_bytes()).unwrap();
        let err = file.extract_text().unwrap_err();
        assert!(matches!(err, IntakeError::Extraction { .. }));
    }
}
