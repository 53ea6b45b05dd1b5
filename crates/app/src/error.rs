use board::{BoardError, ValidationError};
use signboard_config::ConfigError;
use signboard_ipc::{INTERNAL_ERROR, MISSING_FIELDS_ERROR, NO_SPACE_ERROR};
use thiserror::Error;
use warp::http::StatusCode;

use crate::store::StoreError;

/// Startup failures
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("Invalid listen address {0}")]
    Address(String),
    #[error("Failed to start server: {0}")]
    Serve(#[from] warp::Error),
}

/// Why a submission did not produce a stored signature
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("No space available for signatures")]
    GridFull,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Board(BoardError),
}

impl From<BoardError> for SubmitError {
    fn from(error: BoardError) -> Self {
        match error {
            BoardError::Validation(e) => Self::Validation(e),
            BoardError::GridFull => Self::GridFull,
            other => Self::Board(other),
        }
    }
}

impl SubmitError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::GridFull => StatusCode::CONFLICT,
            Self::Store(_) | Self::Board(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text for the `error` field of the response body
    ///
    /// Storage details stay in the log.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(ValidationError::MissingFields(_)) => MISSING_FIELDS_ERROR.to_string(),
            Self::Validation(e) => e.to_string(),
            Self::GridFull => NO_SPACE_ERROR.to_string(),
            Self::Store(_) | Self::Board(_) => INTERNAL_ERROR.to_string(),
        }
    }
}
