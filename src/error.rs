//! Error taxonomy shared by the library, the CLI and the MCP server.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Entity extraction errors
#[derive(Error, Debug)]
pub enum NerError {
    /// Missing or empty text, malformed batch input.
    #[error("{0}")]
    ClientInput(String),

    /// The tagger backend could not be reached or initialised.
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Tagging or rendering failed for one input.
    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Invalid pattern {name}: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tagger timed out after {0}s")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, NerError>;

impl NerError {
    /// HTTP-equivalent status for the `{error}` response body.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ClientInput(_) => 400,
            Self::ModelUnavailable(_) => 503,
            _ => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

/// `{"error": "..."}` body returned for failed requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&NerError> for ErrorBody {
    fn from(err: &NerError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}
