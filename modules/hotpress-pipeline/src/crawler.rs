//! Trending-topic crawler — the TopicSource implementation.
//!
//! Fetches the hot-list aggregator page and pulls `(title, url, heat)` rows
//! out of its board cards. The extraction is deliberately shallow: the page
//! is a plain server-rendered list, and the rest of the pipeline treats this
//! module as an opaque topic feed.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info};

use hotpress_common::{HotpressError, Result, Topic};

use crate::traits::TopicSource;

const DEFAULT_HOT_URL: &str = "https://www.46.la/hot";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Boards excluded from crawling: hardware ranking cards that never produce
/// writable topics. A card is skipped when its header mentions the board
/// name together with one of the keywords.
const EXCLUDED_BOARDS: &[(&str, &[&str])] = &[("中关村", &["CPU", "手机"])];

static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<a\s+[^>]*href="(https?://[^"]+)"[^>]*>([^<]+)</a>"#).unwrap());
static HEAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"hot-heat[^>]*>\s*([^<]+?)\s*<"#).unwrap());

/// Extract topics from the hot-list page HTML, in board order, capped at
/// `limit`. Pure function so the parsing is testable without the network.
pub fn parse_hot_page(html: &str, limit: usize) -> Vec<Topic> {
    let mut topics = Vec::new();

    for card in html.split("hotapi-tab-card").skip(1) {
        let header = card.split("hotapi-list").next().unwrap_or("");
        let excluded = EXCLUDED_BOARDS.iter().any(|(board, keywords)| {
            header.contains(board) && keywords.iter().any(|k| header.contains(k))
        });
        if excluded {
            debug!("Skipping excluded board card");
            continue;
        }

        for item in card.split("<li").skip(1) {
            let Some(caps) = ANCHOR_RE.captures(item) else {
                continue;
            };
            let url = caps[1].trim().to_string();
            let title = caps[2].trim().to_string();
            if title.is_empty() {
                continue;
            }
            let heat = HEAT_RE
                .captures(item)
                .map(|c| c[1].trim().to_string())
                .filter(|h| !h.is_empty());

            let rank = topics.len() as u32 + 1;
            let mut topic = Topic::new(url, title, rank);
            topic.heat = heat;
            topics.push(topic);
            if topics.len() >= limit {
                return topics;
            }
        }
    }

    topics
}

pub struct TrendingCrawler {
    http: reqwest::Client,
    url: String,
}

impl TrendingCrawler {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            http,
            url: DEFAULT_HOT_URL.to_string(),
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }
}

impl Default for TrendingCrawler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TopicSource for TrendingCrawler {
    async fn fetch_topics(&self, limit: usize) -> Result<Vec<Topic>> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| HotpressError::Transient(format!("hot page fetch: {e}")))?;

        if !response.status().is_success() {
            return Err(HotpressError::Transient(format!(
                "hot page returned {}",
                response.status()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| HotpressError::Transient(format!("hot page body: {e}")))?;

        let topics = parse_hot_page(&html, limit);
        info!(count = topics.len(), limit, "Topics extracted from hot page");
        Ok(topics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
    <div class="hotapi-tab-card">
      <div class="hotapi-header">
        <span class="title-name">微博</span><span class="text-muted">热搜榜</span>
      </div>
      <ul class="hotapi-list">
        <li><badge class="hotapi-rank">1</badge>
            <a href="https://example.com/t/1">第一个话题</a>
            <div class="hot-heat">482万</div></li>
        <li><a href="https://example.com/t/2">第二个话题</a></li>
      </ul>
    </div>
    <div class="hotapi-tab-card">
      <div class="hotapi-header">
        <span class="title-name">中关村在线</span><span class="text-muted">CPU排行榜</span>
      </div>
      <ul class="hotapi-list">
        <li><a href="https://example.com/cpu/1">某处理器</a></li>
      </ul>
    </div>
    <div class="hotapi-tab-card">
      <div class="hotapi-header">
        <span class="title-name">知乎</span><span class="text-muted">热榜</span>
      </div>
      <ul class="hotapi-list">
        <li><a href="https://example.com/t/3">第三个话题</a></li>
      </ul>
    </div>
    "#;

    #[test]
    fn extracts_topics_with_heat_and_rank() {
        let topics = parse_hot_page(PAGE, 100);
        assert_eq!(topics.len(), 3);
        assert_eq!(topics[0].title, "第一个话题");
        assert_eq!(topics[0].id, "https://example.com/t/1");
        assert_eq!(topics[0].heat.as_deref(), Some("482万"));
        assert_eq!(topics[0].rank, 1);
        assert_eq!(topics[1].heat, None);
        assert_eq!(topics[2].rank, 3);
    }

    #[test]
    fn skips_hardware_ranking_boards() {
        let topics = parse_hot_page(PAGE, 100);
        assert!(topics.iter().all(|t| !t.id.contains("/cpu/")));
    }

    #[test]
    fn respects_the_limit() {
        let topics = parse_hot_page(PAGE, 2);
        assert_eq!(topics.len(), 2);
    }

    #[test]
    fn empty_page_yields_no_topics() {
        assert!(parse_hot_page("<html></html>", 10).is_empty());
    }
}
