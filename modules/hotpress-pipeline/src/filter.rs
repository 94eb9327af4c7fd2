//! Safety filter backed by the DeepSeek classifier.
//!
//! The model is asked for a single-character 是/否 verdict. On classifier
//! transport failure the content is kept (and logged) — an unreachable
//! classifier must not silently discard the whole feed.

use async_trait::async_trait;
use tracing::{debug, warn};

use ai_client::DeepSeekClient;
use hotpress_common::{Result, SafetyVerdict};

use crate::traits::SafetyFilter;

const CLASSIFY_PROMPT: &str = r#"请严格判断以下内容是否主要涉及政治敏感内容（包括政府、政策、领导人、选举、国际关系、军事、敏感事件等）。
只考虑明显的政治敏感内容，普通的社会新闻、娱乐、科技、体育等内容不要误判。
重要：如果内容中出现了任何国家名字，一律判定为政治敏感内容。

内容: "{text}"

请只回复一个字："是" 或 "否"，不要添加任何其他文字说明。"#;

pub struct DeepSeekSafetyFilter {
    client: DeepSeekClient,
}

impl DeepSeekSafetyFilter {
    pub fn new(client: DeepSeekClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SafetyFilter for DeepSeekSafetyFilter {
    async fn classify(&self, text: &str) -> Result<SafetyVerdict> {
        // Long article bodies classify fine from their opening — and the
        // verdict token budget stays tiny either way.
        let sample: String = text.chars().take(600).collect();
        let prompt = CLASSIFY_PROMPT.replace("{text}", &sample);

        match self.client.chat(&prompt, 5, 0.1).await {
            Ok(answer) => {
                let answer = answer.trim();
                debug!(answer, "Classifier verdict");
                if answer.contains('是') {
                    Ok(SafetyVerdict::reject("politically sensitive content"))
                } else {
                    Ok(SafetyVerdict::pass())
                }
            }
            Err(e) => {
                warn!(error = %e, "Classifier unavailable, keeping content");
                Ok(SafetyVerdict::pass())
            }
        }
    }
}
