use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Content units ---

/// A raw candidate topic from the trending source. The source URL doubles as
/// the unique key — it is what the publish ledger dedups on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    /// Source URL, unique per topic.
    pub id: String,
    pub title: String,
    pub rank: u32,
    /// Heat score as reported by the source board, when present.
    pub heat: Option<String>,
    pub discovered_at: DateTime<Utc>,
}

impl Topic {
    pub fn new(id: impl Into<String>, title: impl Into<String>, rank: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            rank,
            heat: None,
            discovered_at: Utc::now(),
        }
    }
}

/// A topic after the safety filter has seen it. Rejected topics are terminal
/// and never re-enter the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilteredTopic {
    #[serde(flatten)]
    pub topic: Topic,
    pub admissible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl FilteredTopic {
    pub fn admitted(topic: Topic) -> Self {
        Self {
            topic,
            admissible: true,
            rejection_reason: None,
        }
    }

    pub fn rejected(topic: Topic, reason: impl Into<String>) -> Self {
        Self {
            topic,
            admissible: false,
            rejection_reason: Some(reason.into()),
        }
    }
}

/// Safety classification verdict for a piece of text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyVerdict {
    pub admissible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SafetyVerdict {
    pub fn pass() -> Self {
        Self {
            admissible: true,
            reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            admissible: false,
            reason: Some(reason.into()),
        }
    }

    /// Turn the verdict into the unit's typed error: a rejection becomes
    /// `HotpressError::Rejected`, which the caller records as a terminal
    /// outcome rather than a bug.
    pub fn ensure_admissible(&self) -> crate::error::Result<()> {
        if self.admissible {
            Ok(())
        } else {
            Err(crate::error::HotpressError::Rejected {
                reason: self
                    .reason
                    .clone()
                    .unwrap_or_else(|| "unspecified".to_string()),
            })
        }
    }
}

/// A generated article, owned by the orchestrator until publish or permanent
/// failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub topic_id: String,
    pub title: String,
    pub body: String,
    pub generated_at: DateTime<Utc>,
}

impl Article {
    pub fn new(topic_id: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic_id: topic_id.into(),
            title: title.into(),
            body: body.into(),
            generated_at: Utc::now(),
        }
    }
}

/// A generated cover image saved to disk, with the attempt count that
/// produced it.
#[derive(Debug, Clone)]
pub struct CoverImage {
    pub article_id: Uuid,
    pub path: std::path::PathBuf,
    pub attempts: u32,
}

/// Proof of a confirmed publish action. Append-only; its presence is the
/// single source of truth for "already published".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishRecord {
    pub topic_id: String,
    pub article_id: Uuid,
    pub title: String,
    pub published_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_post_id: Option<String>,
}

// --- Per-unit state machine ---

/// Lifecycle state of a content unit. Transitions are monotonic: a unit
/// never returns to an earlier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
    Discovered,
    FilteredOut,
    Admitted,
    GenerationFailed,
    Generated,
    /// Cover generation exhausted its retry budget; the unit proceeds to
    /// publish without an image. Degraded, not terminal.
    ImageFailedDegraded,
    Published,
    PublishFailedSkipped,
}

impl UnitState {
    /// Position in the pipeline, used to enforce monotonic transitions.
    pub fn rank(&self) -> u8 {
        match self {
            UnitState::Discovered => 0,
            UnitState::Admitted => 1,
            UnitState::Generated => 2,
            UnitState::ImageFailedDegraded => 3,
            UnitState::FilteredOut
            | UnitState::GenerationFailed
            | UnitState::Published
            | UnitState::PublishFailedSkipped => 4,
        }
    }

    /// Terminal states never transition again. Note ImageFailedDegraded is
    /// not terminal — the unit still publishes, just without a cover.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UnitState::FilteredOut
                | UnitState::GenerationFailed
                | UnitState::Published
                | UnitState::PublishFailedSkipped
        )
    }
}

impl std::fmt::Display for UnitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UnitState::Discovered => "discovered",
            UnitState::FilteredOut => "filtered-out",
            UnitState::Admitted => "admitted",
            UnitState::GenerationFailed => "generation-failed",
            UnitState::Generated => "generated",
            UnitState::ImageFailedDegraded => "image-failed-degraded",
            UnitState::Published => "published",
            UnitState::PublishFailedSkipped => "publish-failed-skipped",
        };
        write!(f, "{s}")
    }
}

// --- Generated-text helpers ---

/// Split raw generated text into (title, body). The generator is prompted to
/// put the title on the first line as `标题：...`; fall back to treating a
/// short first line as the title, and finally to a truncated first line.
pub fn split_title_body(raw: &str) -> (Option<String>, String) {
    let lines: Vec<&str> = raw.trim().lines().collect();

    let mut title = None;
    let mut body_start = 0;

    for (i, line) in lines.iter().enumerate() {
        let line = line.trim();
        for prefix in ["标题：", "标题:"] {
            if let Some(rest) = line.strip_prefix(prefix) {
                title = Some(rest.trim().to_string());
                body_start = i + 1;
                break;
            }
        }
        if title.is_some() {
            break;
        }
    }

    if title.is_none() {
        if let Some(first) = lines.first() {
            let first = first.trim();
            let len = first.chars().count();
            if len > 5 && len < 50 {
                title = Some(first.to_string());
                body_start = 1;
            } else if len > 0 {
                title = Some(first.chars().take(30).collect());
                body_start = 0;
            }
        }
    }

    let body = lines[body_start.min(lines.len())..]
        .iter()
        .copied()
        .skip_while(|l| l.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    (title, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_prefixed_title() {
        let raw = "标题：为什么这个决定让所有人震惊？\n\n正文第一段。\n正文第二段。";
        let (title, body) = split_title_body(raw);
        assert_eq!(title.as_deref(), Some("为什么这个决定让所有人震惊？"));
        assert_eq!(body, "正文第一段。\n正文第二段。");
    }

    #[test]
    fn split_ascii_colon_variant() {
        let raw = "标题: A Surprising Turn\n\nBody text here.";
        let (title, body) = split_title_body(raw);
        assert_eq!(title.as_deref(), Some("A Surprising Turn"));
        assert_eq!(body, "Body text here.");
    }

    #[test]
    fn split_falls_back_to_short_first_line() {
        let raw = "A short headline\n\nThe rest of the article follows here.";
        let (title, body) = split_title_body(raw);
        assert_eq!(title.as_deref(), Some("A short headline"));
        assert_eq!(body, "The rest of the article follows here.");
    }

    #[test]
    fn split_truncates_long_first_line() {
        let long = "x".repeat(80);
        let (title, body) = split_title_body(&long);
        assert_eq!(title.unwrap().chars().count(), 30);
        // Long first line stays in the body — it was never a real title.
        assert_eq!(body, long);
    }

    #[test]
    fn verdicts_convert_to_rejection_errors() {
        use crate::error::HotpressError;

        assert!(SafetyVerdict::pass().ensure_admissible().is_ok());
        let err = SafetyVerdict::reject("sensitive")
            .ensure_admissible()
            .unwrap_err();
        assert!(matches!(err, HotpressError::Rejected { reason } if reason == "sensitive"));
    }

    #[test]
    fn unit_state_ranks_are_monotonic_along_happy_path() {
        let path = [
            UnitState::Discovered,
            UnitState::Admitted,
            UnitState::Generated,
            UnitState::ImageFailedDegraded,
            UnitState::Published,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].rank() <= pair[1].rank());
        }
    }

    #[test]
    fn degraded_is_not_terminal() {
        assert!(!UnitState::ImageFailedDegraded.is_terminal());
        assert!(UnitState::Published.is_terminal());
        assert!(UnitState::FilteredOut.is_terminal());
    }

    #[test]
    fn publish_record_round_trips() {
        let record = PublishRecord {
            topic_id: "https://example.com/t/1".into(),
            article_id: Uuid::new_v4(),
            title: "Title".into(),
            published_at: Utc::now(),
            platform_post_id: Some("7123".into()),
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: PublishRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.topic_id, record.topic_id);
        assert_eq!(back.platform_post_id, record.platform_post_id);
    }
}
