//! Cover-image generation backed by Tencent Hunyuan.
//!
//! Builds the image prompt from the article title plus a flattened body
//! excerpt; the bounded retry policy around this call lives in the
//! orchestrator, not here.

use async_trait::async_trait;

use hotpress_common::{Article, HotpressError, Result};
use hunyuan_client::{HunyuanClient, ImageRequest};

use crate::pipeline::CoverParams;
use crate::traits::ImageGenerator;

const IMAGE_PROMPT: &str = r#"请为今日头条文章生成一张配图，要求美观、适合法规，不含文字水印，不要画的太复杂，不要有过多元素。

标题：{title}
文章摘要：{summary}

画面风格应体现今日热点资讯视觉，避免血腥、暴力与敏感政治元素。"#;

/// Flatten newlines and cap the excerpt the prompt carries.
fn summarize(body: &str, max_chars: usize) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let mut s: String = flat.chars().take(max_chars).collect();
        s.push('…');
        s
    }
}

pub fn build_image_prompt(title: &str, body: &str) -> String {
    IMAGE_PROMPT
        .replace("{title}", title.trim())
        .replace("{summary}", &summarize(body, 100))
}

pub struct HunyuanIllustrator {
    client: HunyuanClient,
}

impl HunyuanIllustrator {
    pub fn new(client: HunyuanClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageGenerator for HunyuanIllustrator {
    async fn generate(&self, article: &Article, params: &CoverParams) -> Result<Vec<u8>> {
        let request = ImageRequest {
            prompt: build_image_prompt(&article.title, &article.body),
            negative_prompt: params.negative_prompt.clone(),
            style: params.style.clone(),
            resolution: params.resolution.clone(),
            watermark: params.watermark,
        };

        self.client
            .generate(&request)
            .await
            .map_err(|e| HotpressError::Transient(format!("cover generation: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_title_and_flattened_excerpt() {
        let prompt = build_image_prompt("某话题", "第一段。\n第二段。");
        assert!(prompt.contains("标题：某话题"));
        assert!(prompt.contains("第一段。 第二段。"));
    }

    #[test]
    fn excerpt_is_capped() {
        let body = "字".repeat(500);
        let s = summarize(&body, 100);
        assert_eq!(s.chars().count(), 101); // 100 chars + ellipsis
        assert!(s.ends_with('…'));
    }
}
