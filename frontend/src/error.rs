use thiserror::Error;

/// Failures a submission or the result view can surface to the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),
    #[error("Could not reach the analysis server: {0}")]
    Transport(String),
    /// Carries the backend's task error verbatim.
    #[error("{0}")]
    TaskFailed(String),
    #[error("No analysis data found. Please upload an image first.")]
    MissingData,
    #[error("Could not keep the analysis result: {0}")]
    Storage(String),
}

impl ClientError {
    pub fn no_image() -> Self {
        ClientError::Validation("Please select an image first!".into())
    }

    pub fn busy() -> Self {
        ClientError::Validation("An analysis is already running.".into())
    }
}
