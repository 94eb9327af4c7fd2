//! Article generation backed by the DeepSeek chat API.
//!
//! One call per topic, no retry — a failed generation marks the unit
//! `generation-failed` and the run moves on.

use async_trait::async_trait;
use tracing::info;

use ai_client::DeepSeekClient;
use hotpress_common::{split_title_body, Article, HotpressError, Result, Topic};

use crate::traits::ArticleGenerator;

const ARTICLE_PROMPT: &str = r#"你是一位拥有百万粉丝的今日头条头部创作者，擅长撰写爆款深度分析文章。请针对以下热点话题，创作一篇高质量、高吸引力的文章。

话题：{topic}

要求：
- 开头抓人眼球，制造悬念和冲突感
- 多角度分析，提供独特见解，挖掘话题背后的深层逻辑
- 使用 ### 小标题清晰分割内容（3-5个小标题），段落短小精悍
- 不要使用分割线（---）和加粗字体（**）
- 结尾提出一个引发思考的开放性问题
- 字数控制在 1200-1500 字之间

请在文章开头第一行生成标题，格式为"标题：你的标题内容"，长度15-30字，新颖有趣但不标题党。"#;

pub struct DeepSeekGenerator {
    client: DeepSeekClient,
}

impl DeepSeekGenerator {
    pub fn new(client: DeepSeekClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArticleGenerator for DeepSeekGenerator {
    async fn generate(&self, topic: &Topic) -> Result<Article> {
        let mut prompt = ARTICLE_PROMPT.replace("{topic}", &topic.title);
        prompt.push_str(&format!(
            "\n参考链接：{}\n请结合该链接可能涉及的事实背景，输出一篇具有洞察力的文章。",
            topic.id
        ));

        let raw = self
            .client
            .chat(&prompt, 4096, 0.7)
            .await
            .map_err(|e| HotpressError::Transient(format!("article generation: {e}")))?;

        let (title, body) = split_title_body(&raw);
        if body.is_empty() {
            return Err(HotpressError::Transient(
                "article generation produced no body".to_string(),
            ));
        }
        // Fall back to the raw topic title when the model skipped its own.
        let title = title.unwrap_or_else(|| topic.title.clone());

        info!(topic = %topic.title, title = %title, chars = body.chars().count(), "Article generated");
        Ok(Article::new(&topic.id, title, body))
    }
}
