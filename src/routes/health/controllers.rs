use super::dto::HealthStatus;
use crate::services::Uptime;
use rocket::{get, routes, serde::json::Json, Build, Rocket, State};

pub fn register_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount("/", routes![health])
}

#[get("/health")]
fn health(uptime: &State<Uptime>) -> Json<HealthStatus> {
    Json(HealthStatus {
        success: true,
        message: "Server is running",
        uptime: uptime.seconds(),
    })
}
