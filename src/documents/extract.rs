use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::core::errors::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Text,
    Markdown,
}

impl DocumentKind {
    /// Recognised by file extension, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "txt" => Some(DocumentKind::Text),
            "md" | "markdown" => Some(DocumentKind::Markdown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDocument {
    pub name: String,
    pub kind: DocumentKind,
    pub text: String,
}

impl ExtractedDocument {
    /// No extractable text. Distinct from a failed extraction.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported document type: {name} (expected .pdf, .txt or .md)")]
    Unsupported { name: String },

    #[error("Failed to extract text from {name}: {reason}")]
    Extraction { name: String, reason: String },

    #[error("Failed to stage uploaded document: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Io(_) => ApiError::Internal(err.to_string()),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

/// Extracts text from every upload, in upload order.
pub async fn extract_all(
    uploads: Vec<UploadedDocument>,
) -> Result<Vec<ExtractedDocument>, DocumentError> {
    extract_all_in(uploads, &std::env::temp_dir()).await
}

/// Like [`extract_all`], staging files under `parent`.
///
/// The staging directory is removed when this returns, whether extraction
/// succeeded or not.
pub async fn extract_all_in(
    uploads: Vec<UploadedDocument>,
    parent: &Path,
) -> Result<Vec<ExtractedDocument>, DocumentError> {
    let mut typed = Vec::with_capacity(uploads.len());
    for upload in uploads {
        let name = display_name(&upload.name);
        let kind = DocumentKind::from_name(&name)
            .ok_or_else(|| DocumentError::Unsupported { name: name.clone() })?;
        typed.push((name, kind, upload.bytes));
    }

    let staging = tempfile::Builder::new()
        .prefix("docqa-upload-")
        .tempdir_in(parent)?;

    let mut documents = Vec::with_capacity(typed.len());
    for (idx, (name, kind, bytes)) in typed.into_iter().enumerate() {
        let text = match kind {
            DocumentKind::Pdf => {
                // index-based file name, never the client-supplied one
                let path = staging.path().join(format!("{:03}.pdf", idx));
                tokio::fs::write(&path, &bytes).await?;
                extract_pdf(&name, path).await?
            }
            DocumentKind::Text | DocumentKind::Markdown => {
                String::from_utf8(bytes).map_err(|_| DocumentError::Extraction {
                    name: name.clone(),
                    reason: "file is not valid UTF-8".to_string(),
                })?
            }
        };

        let document = ExtractedDocument { name, kind, text };
        if document.is_empty() {
            tracing::warn!("No extractable text in {}", document.name);
        } else {
            tracing::debug!(
                "Extracted {} chars from {}",
                document.text.chars().count(),
                document.name
            );
        }
        documents.push(document);
    }

    Ok(documents)
}

async fn extract_pdf(name: &str, path: PathBuf) -> Result<String, DocumentError> {
    let joined = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path)).await;
    match joined {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(err)) => Err(DocumentError::Extraction {
            name: name.to_string(),
            reason: err.to_string(),
        }),
        Err(err) => Err(DocumentError::Extraction {
            name: name.to_string(),
            reason: format!("extractor aborted: {}", err),
        }),
    }
}

fn display_name(raw: &str) -> String {
    Path::new(raw)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| raw.to_string())
}
