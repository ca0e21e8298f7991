//! Error types for the trajectory simulator.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown body: {0}")]
    UnknownBody(String),
}

pub type Result<T> = std::result::Result<T, SimError>;
