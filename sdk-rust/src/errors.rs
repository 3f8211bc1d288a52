use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The request to the backend failed or the parsing of the response
    /// failed.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The request returns a non-OK status code
    #[error("Status error: {1} (Status {0})")]
    StatusCode(reqwest::StatusCode, String),
    /// A response from the backend was not recognized by this client.
    #[error("Invariant from {0}: {1}")]
    Invariant(&'static str, String),
}

pub type ApiResult<T> = Result<T, ApiError>;
