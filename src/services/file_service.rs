mod compute_file_mime;

use super::file_driver::{FileDriver, StoredFileInfo};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs::File;

#[derive(Error, Debug)]
pub enum FileServiceError {
    #[error("io error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("compute file mime error: {0}")]
    ComputeMimeError(#[from] compute_file_mime::ComputeFileMimeError),
}

/// The content of a stored file, ready to be sent.
#[derive(Debug)]
pub struct StoredFileData {
    pub filename: String,
    pub mime: &'static str,
    pub size: u64,
    pub file: File,
}

/// Read, list and delete access to the stored files.
pub struct FileService {
    file_driver: Arc<dyn FileDriver + Send + Sync>,
}

impl FileService {
    pub fn new(file_driver: Arc<dyn FileDriver + Send + Sync>) -> Arc<Self> {
        Arc::new(Self { file_driver })
    }

    /// Opens a stored file and infers its content type.
    /// Returns `None` if the file does not exist.
    pub async fn get_file_data(
        &self,
        filename: &str,
    ) -> Result<Option<StoredFileData>, FileServiceError> {
        let opened = match self.file_driver.read(filename).await? {
            Some(opened) => opened,
            None => return Ok(None),
        };

        let mime = compute_file_mime::compute_file_mime(&opened.path).await?;

        Ok(Some(StoredFileData {
            filename: filename.to_owned(),
            mime,
            size: opened.size,
            file: opened.file,
        }))
    }

    pub async fn list_files(&self) -> Result<Vec<StoredFileInfo>, FileServiceError> {
        Ok(self.file_driver.list().await?)
    }

    /// Removes a stored file.
    /// Returns `false` if the file does not exist.
    pub async fn remove_file(&self, filename: &str) -> Result<bool, FileServiceError> {
        Ok(self.file_driver.remove(filename).await?)
    }
}
