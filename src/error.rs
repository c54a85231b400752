//! # Error Handling
//!
//! Structured error type shared by the orchestrator, the jobs and the stores.
//! Web-facing errors live in [`crate::web::errors`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MaintenanceError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The call to a job could not be completed (network, timeout, malformed body)
    #[error("Job transport error for {job}: {message}")]
    JobTransport { job: String, message: String },

    #[error("Job {job} failed: {message}")]
    JobFailed { job: String, message: String },

    #[error("Crawl error: {0}")]
    Crawl(String),

    #[error("Content generation error: {0}")]
    ContentGeneration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MaintenanceError {
    pub fn job_transport(job: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JobTransport {
            job: job.into(),
            message: message.into(),
        }
    }

    pub fn job_failed(job: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JobFailed {
            job: job.into(),
            message: message.into(),
        }
    }

    /// Whether the error came from the transport rather than from the job itself
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::JobTransport { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<sqlx::Error> for MaintenanceError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound("row not found".to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Conflict(db.message().to_string())
            }
            other => Self::Database(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for MaintenanceError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Database(format!("Migration failed: {err}"))
    }
}

impl From<config::ConfigError> for MaintenanceError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<serde_json::Error> for MaintenanceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(format!("JSON error: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, MaintenanceError>;
