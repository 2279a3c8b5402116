use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct HealthStatus {
    pub success: bool,
    pub message: &'static str,
    /// Seconds since the service started.
    pub uptime: f64,
}
