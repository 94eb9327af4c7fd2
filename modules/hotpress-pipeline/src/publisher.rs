//! Publisher seam over the Browserless-driven Toutiao session.
//!
//! Owns the markdown→HTML conversion the editor needs and maps the client's
//! error taxonomy into the pipeline's: session expiry becomes `Auth` (run
//! terminal), everything else is a per-unit transient failure.

use async_trait::async_trait;

use hotpress_common::{Article, HotpressError, Result};
use toutiao_client::{markdown_to_html, PublishError, ToutiaoPublisher};

use crate::traits::Publisher;

pub struct SessionPublisher {
    inner: ToutiaoPublisher,
}

impl SessionPublisher {
    pub fn new(inner: ToutiaoPublisher) -> Self {
        Self { inner }
    }
}

fn map_err(err: PublishError) -> HotpressError {
    match err {
        PublishError::Auth(detail) => HotpressError::Auth(detail),
        other => HotpressError::Transient(format!("publish: {other}")),
    }
}

#[async_trait]
impl Publisher for SessionPublisher {
    async fn verify_session(&self) -> Result<()> {
        self.inner.verify_session().await.map_err(map_err)
    }

    async fn publish(
        &self,
        article: &Article,
        cover_png: Option<&[u8]>,
    ) -> Result<Option<String>> {
        let html = markdown_to_html(&article.body);
        let receipt = self
            .inner
            .publish(&article.title, &html, cover_png)
            .await
            .map_err(map_err)?;
        Ok(receipt.platform_post_id)
    }
}
