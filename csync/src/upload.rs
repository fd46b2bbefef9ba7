//! File uploads for the planner and the summarizer
//!
//! Reads a file, infers its media type from the extension, and checks it
//! against what each feature accepts before anything is sent.

use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;
use tracing::debug;

use crate::gemini::Part;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_TEXT: &str = "text/plain";

/// Media types the syllabus planner accepts
pub const SYLLABUS_MEDIA_TYPES: &[&str] = &[MIME_PDF, MIME_JPEG, MIME_DOCX];

/// Validation failures, shown to the user as-is
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Please upload a syllabus file first.")]
    MissingSyllabus,

    #[error("Please upload a .pdf, .jpeg, or .docx file.")]
    UnsupportedSyllabus { mime_type: String },

    #[error("Please upload a valid PDF file.")]
    UnsupportedNotes { mime_type: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A file read into memory with its declared media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk; media type comes from its extension
    pub fn read(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();
        debug!(?path, "Upload::read: called");
        let bytes = fs::read(path).map_err(|source| UploadError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::new(name, media_type_for(path), bytes))
    }

    /// Encode as an `inline_data` part
    pub fn to_inline_part(&self) -> Part {
        Part::inline(self.mime_type.clone(), STANDARD.encode(&self.bytes))
    }
}

/// Media type inferred from a file extension
pub fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => MIME_PDF,
        "jpg" | "jpeg" => MIME_JPEG,
        "docx" => MIME_DOCX,
        "txt" | "md" => MIME_TEXT,
        "png" => "image/png",
        "gif" => "image/gif",
        "doc" => "application/msword",
        _ => "application/octet-stream",
    }
}

/// A syllabus that passed the planner's type check
#[derive(Debug, Clone)]
pub struct SyllabusUpload(Upload);

impl SyllabusUpload {
    /// Accept an optional upload; nothing selected is its own error
    pub fn accept(upload: Option<Upload>) -> Result<Self, UploadError> {
        let upload = upload.ok_or(UploadError::MissingSyllabus)?;
        Self::try_from(upload)
    }

    pub fn upload(&self) -> &Upload {
        &self.0
    }
}

impl TryFrom<Upload> for SyllabusUpload {
    type Error = UploadError;

    fn try_from(upload: Upload) -> Result<Self, Self::Error> {
        if SYLLABUS_MEDIA_TYPES.contains(&upload.mime_type.as_str()) {
            Ok(Self(upload))
        } else {
            debug!(mime_type = %upload.mime_type, "SyllabusUpload::try_from: rejected");
            Err(UploadError::UnsupportedSyllabus {
                mime_type: upload.mime_type,
            })
        }
    }
}

/// Notes to summarize: pasted text or a PDF
#[derive(Debug, Clone)]
pub enum NoteSource {
    Text(String),
    Pdf(Upload),
}

impl NoteSource {
    /// Classify an uploaded file; plain text files are read as pasted text
    pub fn from_upload(upload: Upload) -> Result<Self, UploadError> {
        match upload.mime_type.as_str() {
            MIME_PDF => Ok(Self::Pdf(upload)),
            MIME_TEXT => Ok(Self::Text(String::from_utf8_lossy(&upload.bytes).into_owned())),
            other => Err(UploadError::UnsupportedNotes {
                mime_type: other.to_string(),
            }),
        }
    }
}
