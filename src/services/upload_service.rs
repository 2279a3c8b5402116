use super::{
    file_driver::{FileDriver, WriteError},
    file_name_generator::generate_file_name,
};
use rocket::{
    form::{error::ErrorKind, Errors},
    fs::TempFile,
};
use std::sync::Arc;
use thiserror::Error;

/// Attempts made to find a name that is not taken yet.
const MAX_NAME_ATTEMPTS: usize = 8;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Error, Debug)]
pub enum UploadServiceError {
    #[error("write error: {0}")]
    WriteError(#[from] WriteError),
    #[error("io error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("no free file name found for `{original_name}` after {attempts} attempts")]
    NameExhausted {
        original_name: String,
        attempts: usize,
    },
}

/// Why a multipart body could not be turned into uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormFailure {
    /// The expected file field is absent.
    Missing,
    /// A file exceeded the size limit.
    TooLarge { limit: u64 },
    /// The body could not be parsed; carries the parser message.
    Malformed(String),
    /// The parts could not be buffered to disk.
    Io(String),
}

/// Classifies the errors rocket reports while parsing a multipart form.
pub fn classify_form_errors(errors: &Errors<'_>) -> FormFailure {
    // A truncated stream is reported as a length error without a maximum.
    if let Some(limit) = errors.iter().find_map(|error| match &error.kind {
        ErrorKind::InvalidLength { max: Some(max), .. } => Some(*max),
        _ => None,
    }) {
        return FormFailure::TooLarge { limit };
    }

    if let Some(error) = errors
        .iter()
        .find(|error| matches!(error.kind, ErrorKind::Io(_)))
    {
        return FormFailure::Io(error.to_string());
    }

    if !errors.is_empty()
        && errors
            .iter()
            .all(|error| matches!(error.kind, ErrorKind::Missing))
    {
        return FormFailure::Missing;
    }

    let message = errors
        .iter()
        .map(|error| match &error.name {
            Some(name) => format!("{}: {}", name, error),
            None => error.to_string(),
        })
        .collect::<Vec<_>>()
        .join("; ");

    FormFailure::Malformed(message)
}

/// Browsers submit an empty part for a file input left blank.
pub fn is_blank_part(temp_file: &TempFile<'_>) -> bool {
    temp_file.len() == 0 && original_name_of(temp_file).is_empty()
}

fn original_name_of(temp_file: &TempFile<'_>) -> String {
    temp_file
        .raw_name()
        .map(|name| name.dangerous_unsafe_unsanitized_raw().as_str().to_owned())
        .unwrap_or_default()
}

/// A file that has been stored under its generated name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub filename: String,
    pub original_name: String,
    pub content_type: String,
    pub size: u64,
}

/// Moves parsed multipart parts into the storage.
pub struct UploadService {
    file_driver: Arc<dyn FileDriver + Send + Sync>,
}

impl UploadService {
    pub fn new(file_driver: Arc<dyn FileDriver + Send + Sync>) -> Arc<Self> {
        Arc::new(Self { file_driver })
    }

    /// Stores a single uploaded file under a freshly generated name.
    pub async fn store_file(
        &self,
        temp_file: &mut TempFile<'_>,
    ) -> Result<StoredUpload, UploadServiceError> {
        let original_name = original_name_of(temp_file);
        let content_type = temp_file
            .content_type()
            .map(|content_type| content_type.to_string())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_owned());
        let size = temp_file.len();

        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let filename = generate_file_name(&original_name);

            match self.file_driver.commit(&filename, temp_file).await {
                Ok(()) => {
                    log::info!(target: "upload_service", method = "store_file", filename, original_name, size; "File has been stored.");

                    return Ok(StoredUpload {
                        filename,
                        original_name,
                        content_type,
                        size,
                    });
                }
                Err(WriteError::AlreadyExists { .. }) => {
                    log::warn!(target: "upload_service", method = "store_file", filename, attempt; "Generated file name is taken, retrying.");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(UploadServiceError::NameExhausted {
            original_name,
            attempts: MAX_NAME_ATTEMPTS,
        })
    }

    /// Stores every file in order.
    /// If one of them fails, the files stored before it are removed again.
    pub async fn store_files(
        &self,
        temp_files: &mut [TempFile<'_>],
    ) -> Result<Vec<StoredUpload>, UploadServiceError> {
        let mut stored = Vec::with_capacity(temp_files.len());

        for temp_file in temp_files.iter_mut() {
            match self.store_file(temp_file).await {
                Ok(upload) => stored.push(upload),
                Err(err) => {
                    self.roll_back(&stored).await;
                    return Err(err);
                }
            }
        }

        Ok(stored)
    }

    async fn roll_back(&self, stored: &[StoredUpload]) {
        for upload in stored {
            let filename = upload.filename.as_str();

            if let Err(err) = self.file_driver.remove(filename).await {
                // the batch has failed already
                log::warn!(target: "upload_service", method = "roll_back", filename, err:err; "Failed to remove file of a failed batch.");
            }
        }
    }
}
