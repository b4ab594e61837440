//! Files handed over by the platform file/image picker.

use std::path::{Path, PathBuf};

use reqwest::multipart::Part;

use tastybites_shared::constants::MAX_UPLOAD_SIZE;

use crate::error::{ClientError, Result};

/// A local file selected by the user: path, display name and MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: String,
}

impl Attachment {
    pub fn new(
        path: impl Into<PathBuf>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Build from a picker URI (`file:///...` or a bare path), deriving the
    /// name and MIME type from the file name.
    pub fn from_uri(uri: &str) -> Self {
        let path = PathBuf::from(uri.strip_prefix("file://").unwrap_or(uri));
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let mime_type = mime_for(&path).to_string();
        Self {
            path,
            file_name,
            mime_type,
        }
    }

    /// Same file under a different part name (the buy form always sends
    /// `proof.jpg`).
    pub fn renamed(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Read the file and wrap it as a multipart part.
    pub async fn into_part(self) -> Result<Part> {
        let data = tokio::fs::read(&self.path).await?;

        if data.len() > MAX_UPLOAD_SIZE {
            return Err(ClientError::InvalidInput(format!(
                "File too large: {} bytes (max {})",
                data.len(),
                MAX_UPLOAD_SIZE
            )));
        }

        tracing::debug!(
            file_name = %self.file_name,
            size = data.len(),
            "attaching file"
        );

        Part::bytes(data)
            .file_name(self.file_name)
            .mime_str(&self.mime_type)
            .map_err(|e| ClientError::InvalidInput(format!("Invalid MIME type: {e}")))
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_uri_strips_scheme_and_guesses_mime() {
        let a = Attachment::from_uri("file:///data/cache/IMG_01.JPG");
        assert_eq!(a.path, PathBuf::from("/data/cache/IMG_01.JPG"));
        assert_eq!(a.file_name, "IMG_01.JPG");
        assert_eq!(a.mime_type, "image/jpeg");

        let cert = Attachment::from_uri("/tmp/cert.docx");
        assert!(cert.mime_type.contains("wordprocessingml"));
    }

    #[tokio::test]
    async fn into_part_reads_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proof.png");
        std::fs::write(&path, b"\x89PNG").unwrap();

        let part = Attachment::from_uri(path.to_str().unwrap()).into_part().await;
        assert!(part.is_ok());
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let err = Attachment::from_uri("/definitely/not/here.jpg")
            .into_part()
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }
}
