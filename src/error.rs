use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadmeBoxError {
    #[error("Contents do not contain start/end comments for section \"{0}\"")]
    SectionNotFound(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReadmeBoxError {
    /// True when the document is missing the markers for the requested section.
    pub fn is_section_not_found(&self) -> bool {
        matches!(self, ReadmeBoxError::SectionNotFound(_))
    }
}

/// Failures raised by the remote repository collaborator.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("'{path}' not found on ref '{reference}'")]
    NotFound { path: String, reference: String },

    #[error("Conflict while updating '{path}': {body}")]
    Conflict { path: String, body: String },

    #[error("GitHub API error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode contents of '{path}': {reason}")]
    Decode { path: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, ReadmeBoxError>;
