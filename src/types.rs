use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::db::{Database, DatabaseHealth};
use crate::errors::AppError;

/// Handler result; the error renders itself as a JSON response
pub type Result<T> = std::result::Result<T, AppError>;

/// Plain status line returned by informational endpoints
#[derive(Serialize, Deserialize)]
pub struct ResponsePayload {
    pub status: u16,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub database: DatabaseHealth,
}

pub struct AppState {
    pub name: String,
    pub version: String,
    pub started_at: Instant,
    pub db: Database,
}
