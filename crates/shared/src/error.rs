use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of an engine error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Internal,
    Other,
}

impl ErrorCode {
    pub fn from_status(code: i32) -> Self {
        match code {
            400 => ErrorCode::BadRequest,
            401 => ErrorCode::Unauthorized,
            403 => ErrorCode::Forbidden,
            404 => ErrorCode::NotFound,
            409 => ErrorCode::Conflict,
            500 => ErrorCode::Internal,
            _ => ErrorCode::Other,
        }
    }
}

/// Error payload returned by the engine inside an rspc error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: i32,
    pub message: String,
}

impl ApiError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorCode {
        ErrorCode::from_status(self.code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    #[error("square index {0} is not inside the range [0, 64)")]
    IndexOutOfRange(i64),
    #[error("invalid file '{0}', expected a..h")]
    InvalidFile(char),
    #[error("invalid rank '{0}', expected 1..8")]
    InvalidRank(char),
    #[error("malformed square id \"{0}\"")]
    MalformedSquareId(String),
    #[error("board must have exactly 64 squares, got {0}")]
    BoardSize(usize),
    #[error("invalid piece placement \"{0}\"")]
    MalformedPlacement(String),
}
