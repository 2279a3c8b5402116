use std::{io::Error as IOError, path::PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComputeFileMimeError {
    #[error("failed to infer mime: {0}")]
    Infer(IOError),
    #[error("failed to join task: {0}")]
    Join(#[from] tokio::task::JoinError),
}

const FALLBACK_MIME: &str = "application/octet-stream";

/// Infers the content type of a stored file.
/// The extension decides first; the leading bytes are sniffed only for
/// names without a known extension.
pub async fn compute_file_mime(
    path: impl Into<PathBuf>,
) -> Result<&'static str, ComputeFileMimeError> {
    let path = path.into();

    if let Some(mime) = mime_guess::from_path(&path).first_raw() {
        return Ok(mime);
    }

    tokio::task::spawn_blocking(move || {
        let mime = infer::get_from_path(&path).map_err(ComputeFileMimeError::Infer)?;
        Ok(mime.map(|mime| mime.mime_type()).unwrap_or(FALLBACK_MIME))
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::create_test_directory;

    #[rocket::async_test]
    async fn test_mime_from_extension() {
        let (base_path, _directory_dropper) = create_test_directory();
        let path = base_path.join("notes-1-2.txt");
        std::fs::write(&path, b"hello").unwrap();

        assert_eq!(compute_file_mime(&path).await.unwrap(), "text/plain");
    }

    #[rocket::async_test]
    async fn test_mime_from_content() {
        let (base_path, _directory_dropper) = create_test_directory();
        let path = base_path.join("image-1-2");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR").unwrap();

        assert_eq!(compute_file_mime(&path).await.unwrap(), "image/png");
    }

    #[rocket::async_test]
    async fn test_mime_fallback() {
        let (base_path, _directory_dropper) = create_test_directory();
        let path = base_path.join("blob-1-2");
        std::fs::write(&path, b"\x01\x02\x03").unwrap();

        assert_eq!(compute_file_mime(&path).await.unwrap(), FALLBACK_MIME);
    }
}
