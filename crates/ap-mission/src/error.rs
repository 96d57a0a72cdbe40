//! Error types for mission conditions.

use thiserror::Error;

pub type MissionResult<T> = Result<T, MissionError>;

#[derive(Error, Debug)]
pub enum MissionError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid geometry: {what}")]
    InvalidGeometry { what: &'static str },
}
