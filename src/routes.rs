pub mod file;
pub mod health;
pub mod index;
pub mod upload;

use rocket::{Build, Rocket};

pub fn register_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    let rocket = index::controllers::register_routes(rocket);
    let rocket = health::controllers::register_routes(rocket);
    let rocket = upload::controllers::register_routes(rocket);
    let rocket = file::controllers::register_routes(rocket);
    rocket
}
