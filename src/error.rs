//! Error handling for the tributo simulator
//!
//! Defines custom error types and establishes a unified Result type
//! using anyhow for context chaining and error propagation.
//!
//! The tax engine itself never fails: regime calculators always return a
//! result record (possibly blocked or zeroed). These errors cover the
//! plumbing around it - file ingestion, configuration, persistence.

use thiserror::Error;

/// Core error types for simulator operations
#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("database error: {0}")]
    DbError(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

/// Result type alias for simulator operations
pub type Result<T> = anyhow::Result<T>;
