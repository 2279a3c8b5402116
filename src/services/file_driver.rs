pub mod local_file_system;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocket::fs::TempFile;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs::File;

#[derive(Error, Debug)]
pub enum WriteError {
    /// The name cannot be stored inside the root directory.
    #[error("invalid file name: `{name}`")]
    InvalidName { name: String },
    /// A file with the same name is already stored.
    #[error("file already exists: `{name}`")]
    AlreadyExists { name: String },
    /// An I/O error occurred while writing the file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A stored file opened for reading.
#[derive(Debug)]
pub struct OpenedFile {
    pub path: PathBuf,
    pub size: u64,
    pub file: File,
}

/// Filesystem metadata of a stored file.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StoredFileInfo {
    pub filename: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait FileDriver {
    /// Returns `true` if a file with the given name is stored.
    /// Names that cannot live inside the root are never stored.
    async fn exists(&self, name: &str) -> Result<bool, std::io::Error>;

    /// Moves an uploaded temporary file into the storage under the given name.
    /// An existing file is never overwritten.
    async fn commit(&self, name: &str, temp_file: &mut TempFile<'_>) -> Result<(), WriteError>;

    /// Opens a stored file for reading.
    /// Returns `None` if the file does not exist or the name escapes the root.
    async fn read(&self, name: &str) -> Result<Option<OpenedFile>, std::io::Error>;

    /// Lists every stored file in directory enumeration order.
    async fn list(&self) -> Result<Vec<StoredFileInfo>, std::io::Error>;

    /// Removes a stored file.
    /// Returns `false` if there was nothing to remove.
    async fn remove(&self, name: &str) -> Result<bool, std::io::Error>;
}
