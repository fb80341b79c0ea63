//! The file half of the input collector.

use std::path::Path;

use bytes::Bytes;

use crate::error::ClientError;

/// Accepted extensions, compared case-insensitively.
pub const HEIC_EXTENSIONS: [&str; 2] = [".heic", ".heif"];

/// Returns `true` if `name` ends in `.heic` or `.heif`, ignoring case.
pub fn is_heic_filename(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    HEIC_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// A candidate upload: file name plus contents.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    name: String,
    bytes: Bytes,
}

impl SelectedFile {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk. Type and size checks happen on selection.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ClientError::Validation(format!("Invalid file name: {}", path.display()))
            })?
            .to_owned();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::from_bytes(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// MIME type sent with the multipart file part.
    pub fn mime(&self) -> &'static str {
        if self.name.to_ascii_lowercase().ends_with(".heif") {
            "image/heif"
        } else {
            "image/heic"
        }
    }
}

/// Selection-time check: extension first, then size.
pub fn validate_selection(file: &SelectedFile, max_upload_bytes: u64) -> Result<(), ClientError> {
    if !is_heic_filename(file.name()) {
        return Err(ClientError::Validation(
            "Please select a HEIC or HEIF file".to_owned(),
        ));
    }
    if file.size() > max_upload_bytes {
        return Err(ClientError::Validation(format!(
            "File too large. Maximum size is {:.1} MB",
            max_upload_bytes as f64 / (1024.0 * 1024.0)
        )));
    }
    Ok(())
}
