//! Error types for taskboard.
//!
//! The reducer never fails; these cover the edges around it: storage, parsing,
//! configuration and resolving user input to ids.

use thiserror::Error;

use crate::reducer::Rejection;

/// Exit codes for the `tb` binary.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const REJECTED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("{0}")]
    Ambiguous(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid board data: {0}")]
    Format(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Command rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::TaskNotFound(_)
            | Error::ColumnNotFound(_)
            | Error::Ambiguous(_)
            | Error::InvalidArgument(_)
            | Error::Format(_)
            | Error::Config(_) => exit_codes::USER_ERROR,

            Error::Rejected(_) => exit_codes::REJECTED,

            Error::Io(_) | Error::Json(_) => exit_codes::OPERATION_FAILED,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::TaskNotFound("x".into()).exit_code(), exit_codes::USER_ERROR);
        assert_eq!(Error::Rejected(Rejection::BlankTitle).exit_code(), exit_codes::REJECTED);
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        assert_eq!(Error::from(io).exit_code(), exit_codes::OPERATION_FAILED);
        assert_ne!(exit_codes::SUCCESS, exit_codes::USER_ERROR);
    }
}
