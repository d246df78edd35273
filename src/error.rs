//! Error handling for the competency survey application

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SurveyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Please fill in all required fields: {}", .missing.join(", "))]
    Validation { missing: Vec<String> },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Ledger format error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Remote API error (status {status}): {body}")]
    RemoteApi { status: u16, body: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Decoding error: {0}")]
    Decode(String),

    #[error("Missing files, the semantic engine must be run first: {}", .0.join(", "))]
    MissingArtifacts(Vec<String>),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, SurveyError>;

impl SurveyError {
    /// True for the optimistic-concurrency failures the remote store may retry.
    pub fn is_version_conflict(&self, had_version_token: bool) -> bool {
        match self {
            SurveyError::RemoteApi { status: 409, .. } => true,
            SurveyError::RemoteApi { status: 422, .. } => !had_version_token,
            _ => false,
        }
    }
}

/// Convert anyhow errors to our custom error type
impl From<anyhow::Error> for SurveyError {
    fn from(err: anyhow::Error) -> Self {
        SurveyError::Embedding(format!("{:#}", err))
    }
}
