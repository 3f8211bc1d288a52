use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Backend error: {0}")]
    Api(#[from] datachat_sdk::ApiError),
    /// A tool result was missing the fields the pipeline needs.
    #[error("Malformed tool result: {0}")]
    MalformedResult(String),
    #[error("Invariant: {0}")]
    Invariant(String),
}
