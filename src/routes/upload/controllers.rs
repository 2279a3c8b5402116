use super::dto::{BatchUpload, SingleUpload, UploadedFile};
use crate::{
    config::AppConfig,
    dto::{Envelope, Error, JsonRes},
    guards::RequestOrigin,
    services::{classify_form_errors, is_blank_part, FormFailure, UploadService},
};
use rocket::{
    form::{Errors, Form},
    http::Status,
    post, routes,
    serde::json::Json,
    Build, Rocket, State,
};
use std::sync::Arc;

const NO_FILE_MESSAGE: &str = "No file uploaded";
const NO_FILES_MESSAGE: &str = "No files uploaded";

pub fn register_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount(
        "/",
        routes![
            upload_file,
            upload_file_without_form,
            upload_files,
            upload_files_without_form
        ],
    )
}

fn map_form_errors(errors: &Errors<'_>, missing_message: &'static str, controller: &str) -> Error {
    match classify_form_errors(errors) {
        FormFailure::Missing => Error::new_static(Status::BadRequest, missing_message),
        FormFailure::TooLarge { limit } => Error::new_static(Status::BadRequest, "File too large")
            .with_error(format!("the maximum file size is {} bytes", limit)),
        FormFailure::Malformed(message) => {
            log::info!(target: "routes::upload::controllers", controller, message; "Rejected malformed multipart body.");
            Error::new_static(Status::BadRequest, "Upload failed").with_error(message)
        }
        FormFailure::Io(message) => {
            log::error!(target: "routes::upload::controllers", controller, message; "Failed to buffer multipart body.");
            Error::new_static(Status::InternalServerError, "Error uploading file")
        }
    }
}

#[post("/upload", data = "<form>")]
async fn upload_file(
    upload_service: &State<Arc<UploadService>>,
    origin: RequestOrigin,
    form: Result<Form<SingleUpload<'_>>, Errors<'_>>,
) -> JsonRes<UploadedFile> {
    let mut form = match form {
        Ok(form) => form.into_inner(),
        Err(errors) => return Err(map_form_errors(&errors, NO_FILE_MESSAGE, "upload_file")),
    };

    if is_blank_part(&form.file) {
        return Err(Error::new_static(Status::BadRequest, NO_FILE_MESSAGE));
    }

    let upload = upload_service.store_file(&mut form.file).await;
    let upload = match upload {
        Ok(upload) => upload,
        Err(err) => {
            log::error!(target: "routes::upload::controllers", controller = "upload_file", service = "UploadService", err:err; "Error returned from service.");
            return Err(Error::new_static(
                Status::InternalServerError,
                "Error uploading file",
            ));
        }
    };

    Ok((
        Status::Ok,
        Json(Envelope::new(
            "File uploaded successfully",
            UploadedFile::new(upload, &origin),
        )),
    ))
}

/// Bodies that are not multipart forms carry no file at all.
#[post("/upload", rank = 2)]
fn upload_file_without_form() -> Error {
    Error::new_static(Status::BadRequest, NO_FILE_MESSAGE)
}

#[post("/upload-multiple", data = "<form>")]
async fn upload_files(
    app_config: &State<AppConfig>,
    upload_service: &State<Arc<UploadService>>,
    origin: RequestOrigin,
    form: Result<Form<BatchUpload<'_>>, Errors<'_>>,
) -> JsonRes<Vec<UploadedFile>> {
    let mut form = match form {
        Ok(form) => form.into_inner(),
        Err(errors) => return Err(map_form_errors(&errors, NO_FILES_MESSAGE, "upload_files")),
    };

    form.files.retain(|file| !is_blank_part(file));

    if form.files.is_empty() {
        return Err(Error::new_static(Status::BadRequest, NO_FILES_MESSAGE));
    }

    let max_batch_files = app_config.max_batch_files;

    if max_batch_files < form.files.len() {
        return Err(
            Error::new_static(Status::BadRequest, "Too many files").with_error(format!(
                "at most {} files can be uploaded at once",
                max_batch_files
            )),
        );
    }

    let uploads = upload_service.store_files(&mut form.files).await;
    let uploads = match uploads {
        Ok(uploads) => uploads,
        Err(err) => {
            let count = form.files.len();
            log::error!(target: "routes::upload::controllers", controller = "upload_files", service = "UploadService", count, err:err; "Error returned from service.");
            return Err(Error::new_static(
                Status::InternalServerError,
                "Error uploading files",
            ));
        }
    };

    let count = uploads.len();
    let uploads = uploads
        .into_iter()
        .map(|upload| UploadedFile::new(upload, &origin))
        .collect();

    Ok((
        Status::Ok,
        Json(Envelope::new(
            format!("{} files uploaded successfully", count),
            uploads,
        )),
    ))
}

#[post("/upload-multiple", rank = 2)]
fn upload_files_without_form() -> Error {
    Error::new_static(Status::BadRequest, NO_FILES_MESSAGE)
}
