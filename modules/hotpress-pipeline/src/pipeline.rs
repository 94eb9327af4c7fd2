//! Pipeline orchestrator — the stateful controller sequencing
//! crawl → filter → generate → illustrate → publish per content unit.
//!
//! Units are processed one at a time, strictly in source order. The only
//! publisher is a single authenticated browser session, so there is nothing
//! to parallelize; rate-limit avoidance comes from the enforced inter-publish
//! delay, not throughput. Per-unit failures are caught at the unit boundary,
//! recorded in the ledger, and the run continues; an invalid session aborts
//! the remainder of the run instead of burning through the queue.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};

use hotpress_common::{CoverImage, FilteredTopic, HotpressError, PublishRecord, Result, UnitState};

use crate::artifacts;
use crate::ledger::PublishLedger;
use crate::retry::RetryPolicy;
use crate::topics;
use crate::traits::{ArticleGenerator, ImageGenerator, Publisher, SafetyFilter, TopicSource};

// ---------------------------------------------------------------------------
// Run options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverMode {
    None,
    Generate,
}

/// Style parameters forwarded to the image generator.
#[derive(Debug, Clone, Default)]
pub struct CoverParams {
    pub style: Option<String>,
    pub resolution: Option<String>,
    pub negative_prompt: String,
    pub watermark: bool,
}

#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Stop initiating new units once this many reached a terminal state.
    pub limit: Option<usize>,
    /// Courtesy pause after each generation API call.
    pub generate_delay: Duration,
    /// Enforced pause between platform publish operations.
    pub publish_delay: Duration,
    pub cover_mode: CoverMode,
    pub cover_params: CoverParams,
    pub article_dir: PathBuf,
    pub image_dir: PathBuf,
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

/// Counts per terminal state for one run. Lets the operator re-run safely
/// against the remainder.
#[derive(Debug, Default)]
pub struct RunStats {
    pub topics_fetched: u32,
    pub topics_filtered_out: u32,
    pub skipped_already_published: u32,
    pub published: u32,
    pub generation_failed: u32,
    pub rejected_articles: u32,
    pub degraded_no_image: u32,
    pub publish_failed: u32,
    /// Set when the platform session died mid-run and the remaining queue
    /// was abandoned. Distinct from per-unit failures.
    pub auth_aborted: bool,
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Run Complete ===")?;
        writeln!(f, "Topics fetched:      {}", self.topics_fetched)?;
        writeln!(f, "Topics filtered out: {}", self.topics_filtered_out)?;
        writeln!(f, "Already published:   {}", self.skipped_already_published)?;
        writeln!(f, "Published:           {}", self.published)?;
        writeln!(f, "Generation failed:   {}", self.generation_failed)?;
        writeln!(f, "Articles rejected:   {}", self.rejected_articles)?;
        writeln!(f, "Published w/o cover: {}", self.degraded_no_image)?;
        writeln!(f, "Publish failed:      {}", self.publish_failed)?;
        if self.auth_aborted {
            writeln!(f, "RUN ABORTED: session expired, remaining units untouched")?;
        }
        Ok(())
    }
}

enum UnitOutcome {
    Published { degraded: bool },
    GenerationFailed,
    ArticleRejected,
    PublishFailed,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct Orchestrator {
    source: Box<dyn TopicSource>,
    filter: Box<dyn SafetyFilter>,
    generator: Box<dyn ArticleGenerator>,
    illustrator: Box<dyn ImageGenerator>,
    publisher: Box<dyn Publisher>,
    ledger: PublishLedger,
    cover_retry: RetryPolicy,
}

impl Orchestrator {
    pub fn new(
        source: Box<dyn TopicSource>,
        filter: Box<dyn SafetyFilter>,
        generator: Box<dyn ArticleGenerator>,
        illustrator: Box<dyn ImageGenerator>,
        publisher: Box<dyn Publisher>,
        ledger: PublishLedger,
    ) -> Self {
        Self {
            source,
            filter,
            generator,
            illustrator,
            publisher,
            ledger,
            cover_retry: RetryPolicy::cover_default(),
        }
    }

    pub fn with_cover_retry(mut self, policy: RetryPolicy) -> Self {
        self.cover_retry = policy;
        self
    }

    pub fn ledger(&self) -> &PublishLedger {
        &self.ledger
    }

    /// Crawl mode: pull up to `limit` topics, safety-filter the titles, and
    /// persist the admitted set for a later publish run. Fails fast if the
    /// topic source is unreachable.
    pub async fn run_crawl(
        &mut self,
        limit: usize,
        topics_path: &Path,
        stats: &mut RunStats,
    ) -> Result<Vec<FilteredTopic>> {
        info!(limit, "Crawl starting");
        let raw = self.source.fetch_topics(limit).await?;
        stats.topics_fetched += raw.len() as u32;
        if raw.is_empty() {
            warn!("Topic source returned nothing");
            return Ok(Vec::new());
        }

        let mut admitted = Vec::new();
        for topic in raw {
            let verdict = self.filter.classify(&topic.title).await?;
            if verdict.admissible {
                admitted.push(FilteredTopic::admitted(topic));
            } else {
                stats.topics_filtered_out += 1;
                info!(
                    title = %topic.title,
                    reason = verdict.reason.as_deref().unwrap_or("unspecified"),
                    "Topic filtered out"
                );
            }
        }

        if admitted.is_empty() {
            warn!("Every topic was filtered out");
        }
        topics::save_filtered_topics(topics_path, &admitted)?;
        info!(
            admitted = admitted.len(),
            filtered_out = stats.topics_filtered_out,
            "Crawl complete"
        );
        Ok(admitted)
    }

    /// Publish mode: walk the filtered set in source order, skipping topics
    /// the ledger already holds a PublishRecord for, and drive each
    /// remaining unit through generate → re-filter → illustrate → publish.
    pub async fn run_publish(
        &mut self,
        topics: &[FilteredTopic],
        opts: &PublishOptions,
        stats: &mut RunStats,
    ) -> Result<()> {
        let eligible: Vec<&FilteredTopic> = topics.iter().filter(|t| t.admissible).collect();
        if eligible.len() < topics.len() {
            warn!(
                dropped = topics.len() - eligible.len(),
                "Input contained rejected topics, ignoring them"
            );
        }
        if eligible.is_empty() {
            info!("Nothing to publish");
            return Ok(());
        }

        match self.publisher.verify_session().await {
            Ok(()) => {}
            Err(HotpressError::Auth(detail)) => {
                error!(detail = %detail, "Session invalid at run start, aborting");
                stats.auth_aborted = true;
                return Ok(());
            }
            Err(other) => return Err(other),
        }

        info!(units = eligible.len(), "Publish run starting");
        let mut terminal_this_run = 0usize;
        let mut needs_delay = false;

        for (offset, ft) in eligible.iter().enumerate() {
            if let Some(limit) = opts.limit {
                if terminal_this_run >= limit {
                    info!(limit, "Unit limit reached, stopping");
                    break;
                }
            }

            if self.ledger.has(&ft.topic.id) {
                info!(title = %ft.topic.title, "Already published, skipping");
                stats.skipped_already_published += 1;
                continue;
            }

            // A prior run may have left a failed or partial outcome behind;
            // every run gets a fresh attempt. Only a PublishRecord blocks.
            self.ledger.begin_attempt(&ft.topic.id)?;

            // Rate-limit pause between platform-facing units; never after
            // the final one, never before the first.
            if needs_delay && !opts.publish_delay.is_zero() {
                info!(
                    delay_secs = opts.publish_delay.as_secs(),
                    "Waiting before next publish"
                );
                tokio::time::sleep(opts.publish_delay).await;
            }
            needs_delay = false;

            match self.process_unit(ft, opts).await {
                Ok(UnitOutcome::Published { degraded }) => {
                    stats.published += 1;
                    if degraded {
                        stats.degraded_no_image += 1;
                    }
                    terminal_this_run += 1;
                    needs_delay = true;
                }
                Ok(UnitOutcome::GenerationFailed) => {
                    stats.generation_failed += 1;
                    terminal_this_run += 1;
                }
                Ok(UnitOutcome::ArticleRejected) => {
                    stats.rejected_articles += 1;
                    terminal_this_run += 1;
                }
                Ok(UnitOutcome::PublishFailed) => {
                    stats.publish_failed += 1;
                    terminal_this_run += 1;
                    needs_delay = true;
                }
                Err(HotpressError::Auth(detail)) => {
                    stats.publish_failed += 1;
                    stats.auth_aborted = true;
                    error!(
                        detail = %detail,
                        "Session expired mid-run, abandoning remaining units"
                    );
                    self.ledger.set_cursor(offset + 1)?;
                    break;
                }
                Err(other) => return Err(other),
            }

            self.ledger.set_cursor(offset + 1)?;
        }

        Ok(())
    }

    /// Full mode: crawl, then publish the crawl's output. Identical to
    /// running the two modes back to back.
    pub async fn run_full(
        &mut self,
        crawl_limit: usize,
        topics_path: &Path,
        opts: &PublishOptions,
    ) -> Result<RunStats> {
        let mut stats = RunStats::default();
        let admitted = self.run_crawl(crawl_limit, topics_path, &mut stats).await?;
        self.run_publish(&admitted, opts, &mut stats).await?;
        Ok(stats)
    }

    /// Drive one unit to a terminal state. Per-unit failures come back as
    /// outcomes; only run-fatal errors (dead session, storage corruption)
    /// come back as `Err`.
    async fn process_unit(
        &mut self,
        ft: &FilteredTopic,
        opts: &PublishOptions,
    ) -> Result<UnitOutcome> {
        let topic = &ft.topic;
        info!(title = %topic.title, rank = topic.rank, "Processing unit");
        self.ledger.mark_outcome(&topic.id, UnitState::Admitted)?;

        // Single generation attempt; failure is isolated to this unit.
        let article = match self.generator.generate(topic).await {
            Ok(article) => article,
            Err(e) => {
                warn!(title = %topic.title, error = %e, "Generation failed, skipping unit");
                self.ledger
                    .mark_outcome(&topic.id, UnitState::GenerationFailed)?;
                return Ok(UnitOutcome::GenerationFailed);
            }
        };
        if !opts.generate_delay.is_zero() {
            tokio::time::sleep(opts.generate_delay).await;
        }
        self.ledger.mark_outcome(&topic.id, UnitState::Generated)?;

        // Second safety pass, this time over the generated text.
        let verdict = self.filter.classify(&article.body).await?;
        if let Err(HotpressError::Rejected { reason }) = verdict.ensure_admissible() {
            info!(
                title = %article.title,
                reason = %reason,
                "Generated article rejected by safety filter"
            );
            self.ledger.mark_outcome(&topic.id, UnitState::FilteredOut)?;
            return Ok(UnitOutcome::ArticleRejected);
        }

        // Cover generation, bounded retries. Exhaustion degrades the unit
        // to the no-image path instead of failing it.
        let mut degraded = false;
        let cover = match opts.cover_mode {
            CoverMode::None => None,
            CoverMode::Generate => {
                let mut attempts = 0;
                let result = self
                    .cover_retry
                    .run("cover generation", |attempt| {
                        attempts = attempt;
                        self.illustrator.generate(&article, &opts.cover_params)
                    })
                    .await;
                match result {
                    Ok(png) => {
                        let path = artifacts::save_cover(&opts.image_dir, &article.title, &png)?;
                        let image = CoverImage {
                            article_id: article.id,
                            path,
                            attempts,
                        };
                        Some((image, png))
                    }
                    Err(e) => {
                        warn!(
                            title = %article.title,
                            error = %e,
                            "Cover generation exhausted its retries, publishing without image"
                        );
                        degraded = true;
                        self.ledger
                            .mark_outcome(&topic.id, UnitState::ImageFailedDegraded)?;
                        None
                    }
                }
            }
        };

        artifacts::save_article(&opts.article_dir, &article)?;

        let publish_result = self
            .publisher
            .publish(&article, cover.as_ref().map(|(_, png)| png.as_slice()))
            .await;

        match publish_result {
            Ok(post_id) => {
                // Persist the record before anything else — a crash after
                // this point must not re-publish the unit.
                self.ledger.record(PublishRecord {
                    topic_id: topic.id.clone(),
                    article_id: article.id,
                    title: article.title.clone(),
                    published_at: Utc::now(),
                    platform_post_id: post_id,
                })?;
                if let Some((image, _)) = &cover {
                    artifacts::remove_cover(&image.path);
                }
                info!(title = %article.title, "Unit published");
                Ok(UnitOutcome::Published { degraded })
            }
            Err(HotpressError::Auth(detail)) => {
                self.ledger
                    .mark_outcome(&topic.id, UnitState::PublishFailedSkipped)?;
                Err(HotpressError::Auth(detail))
            }
            Err(e) => {
                warn!(title = %article.title, error = %e, "Publish failed, skipping unit");
                self.ledger
                    .mark_outcome(&topic.id, UnitState::PublishFailedSkipped)?;
                Ok(UnitOutcome::PublishFailed)
            }
        }
    }
}
