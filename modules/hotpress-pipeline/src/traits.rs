// Trait abstractions for the pipeline's external collaborators.
//
// The orchestrator only ever sees these five seams: topic discovery, safety
// classification, article generation, cover generation, and the platform
// publish action. Concrete implementations wrap the DeepSeek, Hunyuan, and
// Browserless clients; tests swap in mocks — no network, no browser.

use async_trait::async_trait;

use hotpress_common::{Article, Result, SafetyVerdict, Topic};

use crate::pipeline::CoverParams;

/// Produces a finite sequence of candidate topics from the trending source.
#[async_trait]
pub trait TopicSource: Send + Sync {
    /// Fetch up to `limit` topics, in source-rank order. Any failure here is
    /// a pipeline-stage failure — the caller fails fast, it does not retry.
    async fn fetch_topics(&self, limit: usize) -> Result<Vec<Topic>>;
}

/// Classifies text as admissible or rejected. Called twice per unit: once on
/// the topic title, once on the generated article body.
#[async_trait]
pub trait SafetyFilter: Send + Sync {
    async fn classify(&self, text: &str) -> Result<SafetyVerdict>;
}

/// Turns an admitted topic into article text. Single call per unit — the
/// orchestrator never retries generation.
#[async_trait]
pub trait ArticleGenerator: Send + Sync {
    async fn generate(&self, topic: &Topic) -> Result<Article>;
}

/// Produces cover-image bytes for an article. May fail transiently; the
/// orchestrator applies the bounded retry policy around this call.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, article: &Article, params: &CoverParams) -> Result<Vec<u8>>;
}

/// Performs the platform publish action against a live authenticated
/// session. Session expiry surfaces as `HotpressError::Auth`, which is
/// terminal for the whole run.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn verify_session(&self) -> Result<()>;

    /// Publish the article, with a cover when one was generated. Returns the
    /// platform post id when the platform exposes it.
    async fn publish(&self, article: &Article, cover_png: Option<&[u8]>)
        -> Result<Option<String>>;
}
