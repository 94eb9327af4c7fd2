use thiserror::Error;

pub type Result<T> = std::result::Result<T, HunyuanError>;

#[derive(Debug, Error)]
pub enum HunyuanError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Hunyuan error response: {0}")]
    Service(String),

    #[error("No image in Hunyuan response: {0}")]
    MissingImage(String),
}

impl From<reqwest::Error> for HunyuanError {
    fn from(err: reqwest::Error) -> Self {
        HunyuanError::Network(err.to_string())
    }
}
