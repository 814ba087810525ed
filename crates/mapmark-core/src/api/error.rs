use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The remote answered but declared the request failed.
    #[error("remote rejected request: {0}")]
    Rejected(String),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    Json(#[from] serde_json::Error),

    /// An add succeeded but the response carried no id for the new row.
    #[error("remote did not return an id for the created place")]
    MissingId,
}
