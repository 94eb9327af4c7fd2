use thiserror::Error;

pub type Result<T> = std::result::Result<T, HotpressError>;

#[derive(Error, Debug)]
pub enum HotpressError {
    /// Network/timeout failure from an external collaborator. Retried only
    /// where policy explicitly allows (image generation, bounded at 3).
    #[error("Transient service error: {0}")]
    Transient(String),

    /// Safety filter verdict. Terminal for the unit, not a bug.
    #[error("Content rejected: {reason}")]
    Rejected { reason: String },

    /// Expired or invalid platform session. Terminal for the run — no
    /// further publishes can succeed against a dead session.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Ledger invariant violation: a second PublishRecord for the same
    /// topic. Always a defect, never expected in normal operation.
    #[error("Duplicate publish record for topic: {topic_id}")]
    DuplicateRecord { topic_id: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for HotpressError {
    fn from(err: std::io::Error) -> Self {
        HotpressError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for HotpressError {
    fn from(err: serde_json::Error) -> Self {
        HotpressError::Storage(err.to_string())
    }
}
