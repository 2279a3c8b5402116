use super::dto::{Disposition, FileData, FileEntry};
use crate::{
    dto::{Envelope, Error, JsonRes},
    guards::RequestOrigin,
    services::FileService,
};
use rocket::{delete, get, http::Status, routes, serde::json::Json, Build, Rocket, State};
use std::sync::Arc;

const NOT_FOUND_MESSAGE: &str = "File not found";

pub fn register_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/", routes![view_file, download_file])
        .mount("/api/files", routes![list_files, remove_file])
}

async fn load_file_data(
    file_service: &FileService,
    filename: &str,
    disposition: Disposition,
    controller: &str,
) -> Result<FileData, Error> {
    let data = match file_service.get_file_data(filename).await {
        Ok(Some(data)) => data,
        Ok(None) => {
            return Err(Error::new_static(Status::NotFound, NOT_FOUND_MESSAGE));
        }
        Err(err) => {
            log::error!(target: "routes::file::controllers", controller, service = "FileService", filename, err:err; "Error returned from service.");
            return Err(Error::new_static(
                Status::InternalServerError,
                "Error reading file",
            ));
        }
    };

    Ok(FileData { disposition, data })
}

#[get("/files/<filename>")]
async fn view_file(
    file_service: &State<Arc<FileService>>,
    filename: &str,
) -> Result<FileData, Error> {
    load_file_data(file_service, filename, Disposition::Inline, "view_file").await
}

#[get("/download/<filename>")]
async fn download_file(
    file_service: &State<Arc<FileService>>,
    filename: &str,
) -> Result<FileData, Error> {
    load_file_data(
        file_service,
        filename,
        Disposition::Attachment,
        "download_file",
    )
    .await
}

#[get("/")]
async fn list_files(
    file_service: &State<Arc<FileService>>,
    origin: RequestOrigin,
) -> JsonRes<Vec<FileEntry>> {
    let files = match file_service.list_files().await {
        Ok(files) => files,
        Err(err) => {
            log::error!(target: "routes::file::controllers", controller = "list_files", service = "FileService", err:err; "Error returned from service.");
            return Err(Error::new_static(
                Status::InternalServerError,
                "Error reading files",
            ));
        }
    };

    let count = files.len();
    let files = files
        .into_iter()
        .map(|info| FileEntry::new(info, &origin))
        .collect();

    Ok((
        Status::Ok,
        Json(Envelope::new("Files retrieved successfully", files).with_count(count)),
    ))
}

#[delete("/<filename>")]
async fn remove_file(
    file_service: &State<Arc<FileService>>,
    filename: &str,
) -> JsonRes<()> {
    match file_service.remove_file(filename).await {
        Ok(true) => {}
        Ok(false) => {
            return Err(Error::new_static(Status::NotFound, NOT_FOUND_MESSAGE));
        }
        Err(err) => {
            log::error!(target: "routes::file::controllers", controller = "remove_file", service = "FileService", filename, err:err; "Error returned from service.");
            return Err(Error::new_static(
                Status::InternalServerError,
                "Error deleting file",
            ));
        }
    }

    log::info!(target: "routes::file::controllers", controller = "remove_file", filename; "File has been removed.");

    Ok((Status::Ok, Json(Envelope::message("File deleted successfully"))))
}
