mod file_driver;
mod file_name_generator;
mod file_service;
mod upload_service;

pub use file_driver::*;
pub use file_name_generator::*;
pub use file_service::*;
pub use upload_service::*;

use rocket::{Build, Rocket};
use std::{sync::Arc, time::Instant};

/// The moment the service started, reported by the health probe.
pub struct Uptime {
    started_at: Instant,
}

impl Uptime {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }

    pub fn seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}

impl Default for Uptime {
    fn default() -> Self {
        Self::new()
    }
}

pub fn register_services(
    rocket: Rocket<Build>,
    file_driver: Arc<impl 'static + FileDriver + Send + Sync>,
) -> Rocket<Build> {
    let file_driver = file_driver as Arc<dyn FileDriver + Send + Sync>;
    let upload_service = UploadService::new(file_driver.clone());
    let file_service = FileService::new(file_driver);

    rocket
        .manage(upload_service)
        .manage(file_service)
        .manage(Uptime::new())
}
