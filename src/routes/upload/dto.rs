use crate::{guards::RequestOrigin, services::StoredUpload};
use rocket::{fs::TempFile, FromForm};
use serde::Serialize;

#[derive(FromForm, Debug)]
pub struct SingleUpload<'r> {
    pub file: TempFile<'r>,
}

#[derive(FromForm, Debug)]
pub struct BatchUpload<'r> {
    pub files: Vec<TempFile<'r>>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub filename: String,
    pub original_name: String,
    pub content_type: String,
    pub size: u64,
    pub view_url: String,
    pub download_url: String,
}

impl UploadedFile {
    pub fn new(upload: StoredUpload, origin: &RequestOrigin) -> Self {
        Self {
            view_url: origin.view_url(&upload.filename),
            download_url: origin.download_url(&upload.filename),
            filename: upload.filename,
            original_name: upload.original_name,
            content_type: upload.content_type,
            size: upload.size,
        }
    }
}
