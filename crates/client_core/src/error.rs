use shared::error::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid engine url: {0}")]
    InvalidUrl(String),
    #[error("engine request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to decode engine response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("engine rejected {procedure} ({code}): {message}")]
    Rejected {
        procedure: String,
        code: i32,
        message: String,
    },
    #[error("engine returned HTTP {status} for {procedure}")]
    Status { procedure: String, status: u16 },
}

impl EngineError {
    pub fn rejected(procedure: &str, error: ApiError) -> Self {
        Self::Rejected {
            procedure: procedure.to_string(),
            code: error.code,
            message: error.message,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("game has not been started")]
    NotStarted,
    #[error("game state store was closed")]
    Closed,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("a pawn promotion prompt is already active")]
    Conflict,
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("no legal move from {origin} to {destination}")]
    NoCandidate { origin: String, destination: String },
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error("promotion prompt failed: {0}")]
    PromptFailed(anyhow::Error),
    #[error("{choice} was not offered as a promotion target")]
    UnofferedPromotion { choice: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ClickError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}
