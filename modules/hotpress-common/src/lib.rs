pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{HotpressError, Result};
pub use types::{
    split_title_body, Article, CoverImage, FilteredTopic, PublishRecord, SafetyVerdict, Topic,
    UnitState,
};
