use thiserror::Error;

pub type Result<T> = std::result::Result<T, PublishError>;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Browserless error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The platform bounced the session to its login page. The run cannot
    /// continue until fresh cookies are supplied.
    #[error("Session expired or invalid: {0}")]
    Auth(String),

    #[error("Cookie file error: {0}")]
    Cookie(String),

    #[error("Publish flow failed: {0}")]
    Flow(String),
}

impl From<reqwest::Error> for PublishError {
    fn from(err: reqwest::Error) -> Self {
        PublishError::Network(err.to_string())
    }
}
