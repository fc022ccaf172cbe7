//! Multipart upload intake: validation, temp storage, extraction, cleanup.

use std::collections::HashMap;
use std::path::Path;

use axum::extract::Multipart;
use bytes::Bytes;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::AppError;
use crate::extraction::{extract_text, DocumentKind};

/// Request body cap for every route (uploads included).
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
/// Multipart field carrying the résumé file.
pub const RESUME_FIELD: &str = "resume";

/// A file part exactly as the client sent it.
#[derive(Debug)]
pub struct RawUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// A file part that passed validation.
#[derive(Debug)]
pub struct ResumeUpload {
    pub file_name: String,
    pub kind: DocumentKind,
    pub bytes: Bytes,
}

/// Everything a multipart form carried: the résumé part plus text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub resume: Option<RawUpload>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            if name == RESUME_FIELD {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await?;
                form.resume = Some(RawUpload { file_name, bytes });
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Trimmed, non-empty text field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// The résumé part, required and validated.
    pub fn require_resume(self) -> Result<ResumeUpload, AppError> {
        let raw = self
            .resume
            .ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;
        validate(raw)
    }
}

/// Checks name and extension before anything touches the disk.
pub fn validate(raw: RawUpload) -> Result<ResumeUpload, AppError> {
    if raw.file_name.trim().is_empty() {
        return Err(AppError::Validation("No file selected".to_string()));
    }
    let kind = DocumentKind::from_file_name(&raw.file_name).ok_or_else(|| {
        AppError::Validation("Invalid file type. Please upload a PDF or DOCX file.".to_string())
    })?;
    Ok(ResumeUpload {
        file_name: raw.file_name,
        kind,
        bytes: raw.bytes,
    })
}

/// Stores the upload under `upload_dir`, extracts its text and deletes it.
///
/// The stored name is generated; the client's file name never becomes a path.
/// The temp file is removed on every path out of this function.
pub async fn extract_upload(upload_dir: &Path, upload: &ResumeUpload) -> Result<String, AppError> {
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Cannot create upload dir: {e}")))?;

    let stored = tempfile::Builder::new()
        .prefix("resume-")
        .suffix(upload.kind.suffix())
        .tempfile_in(upload_dir)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Cannot create upload file: {e}")))?;

    let written = tokio::fs::write(stored.path(), &upload.bytes).await;
    let text = match written {
        Ok(()) => Ok(extract_text(stored.path(), upload.kind).await),
        Err(e) => Err(AppError::Internal(anyhow::anyhow!(
            "Cannot store upload '{}': {e}",
            upload.file_name
        ))),
    };

    discard(stored);
    text
}

/// Like `extract_upload`, but empty text is a user-facing validation error.
pub async fn require_text(upload_dir: &Path, upload: &ResumeUpload) -> Result<String, AppError> {
    let text = extract_upload(upload_dir, upload).await?;
    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "Could not extract text from file.".to_string(),
        ));
    }
    Ok(text)
}

fn discard(file: NamedTempFile) {
    let path = file.path().to_path_buf();
    if let Err(e) = file.close() {
        debug!("Could not remove upload '{}': {e}", path.display());
    }
}
