//! Best-effort plain-text extraction from uploaded résumés.
//!
//! Failures never propagate: they are logged and produce an empty string,
//! which callers report as "could not extract text".

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

pub mod docx;

/// Upload formats the service understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Kind from the final extension of a client-supplied file name.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            DocumentKind::Pdf => ".pdf",
            DocumentKind::Docx => ".docx",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    Pdf(String),

    #[error("DOCX archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("DOCX XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Extracts text from the file at `path`, returning `""` on any failure.
///
/// Parsing happens on the blocking pool; a panic inside the PDF library is
/// caught there and treated like any other extraction failure.
pub async fn extract_text(path: &Path, kind: DocumentKind) -> String {
    let owned: PathBuf = path.to_path_buf();
    let outcome = tokio::task::spawn_blocking(move || match kind {
        DocumentKind::Pdf => pdf_text(&owned),
        DocumentKind::Docx => docx::docx_text(&owned),
    })
    .await;

    match outcome {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!("Error reading {:?} '{}': {e}", kind, path.display());
            String::new()
        }
        Err(e) => {
            warn!("Extraction of '{}' aborted: {e}", path.display());
            String::new()
        }
    }
}

/// PDF text, pages separated by newlines as laid out by `pdf-extract`.
fn pdf_text(path: &Path) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(path)?;
    pdf_extract::extract_text_from_mem(&bytes).map_err(|e| ExtractionError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_kind_from_file_name() {
        assert_eq!(DocumentKind::from_file_name("cv.pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_file_name("CV.PDF"), Some(DocumentKind::Pdf));
        assert_eq!(
            DocumentKind::from_file_name("my.resume.Docx"),
            Some(DocumentKind::Docx)
        );
        assert_eq!(DocumentKind::from_file_name("resume.doc"), None);
        assert_eq!(DocumentKind::from_file_name("resume.pdf.exe"), None);
        assert_eq!(DocumentKind::from_file_name("pdf"), None);
        assert_eq!(DocumentKind::from_file_name(""), None);
    }

    #[tokio::test]
    async fn test_extract_docx_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        file.write_all(&docx::tests::build_docx(&["Jane Doe", "Rust engineer"]))
            .unwrap();

        let text = extract_text(file.path(), DocumentKind::Docx).await;
        assert_eq!(text, "Jane Doe\nRust engineer\n");
    }

    #[tokio::test]
    async fn test_extract_garbage_pdf_yields_empty() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"definitely not a pdf").unwrap();

        let text = extract_text(file.path(), DocumentKind::Pdf).await;
        assert!(text.trim().is_empty());
    }

    #[tokio::test]
    async fn test_extract_missing_file_yields_empty() {
        let dir = tempfile::tempdir().unwrap();
        let text = extract_text(&dir.path().join("gone.docx"), DocumentKind::Docx).await;
        assert_eq!(text, "");
    }
}
