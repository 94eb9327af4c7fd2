//! Publish ledger — the durable record of processed content units.
//!
//! The presence of a `PublishRecord` is the single source of truth for
//! "already published": `has` answers the dedup check, `record` appends and
//! persists before the orchestrator moves to the next unit. Persistence is
//! atomic (write to a sibling temp file, then rename), so a crash mid-write
//! never corrupts previously committed records.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use hotpress_common::{HotpressError, PublishRecord, Result, UnitState};

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    records: Vec<PublishRecord>,
    /// Terminal/intermediate outcome per topic id. Never rolled back.
    outcomes: BTreeMap<String, UnitState>,
    /// Offset of the last fully processed unit in the topic sequence.
    cursor: usize,
}

pub struct PublishLedger {
    path: PathBuf,
    state: LedgerFile,
    published: HashSet<String>,
}

impl PublishLedger {
    /// Open the ledger at `path`, starting empty if the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)
                .map_err(|e| HotpressError::Storage(format!("{}: {e}", path.display())))?
        } else {
            LedgerFile::default()
        };
        let published = state.records.iter().map(|r| r.topic_id.clone()).collect();
        Ok(Self {
            path,
            state,
            published,
        })
    }

    /// True iff a PublishRecord exists for this topic.
    pub fn has(&self, topic_id: &str) -> bool {
        self.published.contains(topic_id)
    }

    /// Append a publish record and persist immediately. A second record for
    /// the same topic id is an invariant violation, not a normal outcome.
    pub fn record(&mut self, record: PublishRecord) -> Result<()> {
        if self.published.contains(&record.topic_id) {
            return Err(HotpressError::DuplicateRecord {
                topic_id: record.topic_id,
            });
        }
        self.published.insert(record.topic_id.clone());
        self.state
            .outcomes
            .insert(record.topic_id.clone(), UnitState::Published);
        self.state.records.push(record);
        self.persist()
    }

    /// Record a unit's lifecycle state. Within one attempt transitions must
    /// be monotonic, and a terminal state never changes again; a later run
    /// clears the slate with `begin_attempt` first.
    pub fn mark_outcome(&mut self, topic_id: &str, state: UnitState) -> Result<()> {
        if let Some(prev) = self.state.outcomes.get(topic_id) {
            if prev.is_terminal() && *prev != state {
                return Err(HotpressError::Storage(format!(
                    "unit {topic_id} already terminal ({prev}), refusing {state}"
                )));
            }
            if prev.rank() > state.rank() {
                return Err(HotpressError::Storage(format!(
                    "non-monotonic transition for {topic_id}: {prev} -> {state}"
                )));
            }
        }
        self.state.outcomes.insert(topic_id.to_string(), state);
        self.persist()
    }

    /// Start a fresh attempt for a unit: drop whatever outcome a prior run
    /// left behind, failed or partial. Only `Published` is permanent —
    /// callers skip published units before getting here, so finding one is
    /// an invariant violation.
    pub fn begin_attempt(&mut self, topic_id: &str) -> Result<()> {
        match self.state.outcomes.get(topic_id) {
            None => Ok(()),
            Some(UnitState::Published) => Err(HotpressError::Storage(format!(
                "unit {topic_id} is published, refusing a new attempt"
            ))),
            Some(_) => {
                self.state.outcomes.remove(topic_id);
                self.persist()
            }
        }
    }

    pub fn outcome(&self, topic_id: &str) -> Option<UnitState> {
        self.state.outcomes.get(topic_id).copied()
    }

    /// Advance the source-sequence cursor past `offset`.
    pub fn set_cursor(&mut self, offset: usize) -> Result<()> {
        if offset > self.state.cursor {
            self.state.cursor = offset;
            self.persist()?;
        }
        Ok(())
    }

    pub fn cursor(&self) -> usize {
        self.state.cursor
    }

    pub fn records(&self) -> &[PublishRecord] {
        &self.state.records
    }

    pub fn len(&self) -> usize {
        self.state.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.records.is_empty()
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(&self.state)?;
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), records = self.state.records.len(), "Ledger persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn record(topic_id: &str) -> PublishRecord {
        PublishRecord {
            topic_id: topic_id.to_string(),
            article_id: Uuid::new_v4(),
            title: "t".to_string(),
            published_at: Utc::now(),
            platform_post_id: None,
        }
    }

    #[test]
    fn record_then_reopen_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let mut ledger = PublishLedger::open(&path).unwrap();
        assert!(!ledger.has("a"));
        ledger.record(record("a")).unwrap();
        ledger.record(record("b")).unwrap();

        let reopened = PublishLedger::open(&path).unwrap();
        assert!(reopened.has("a"));
        assert!(reopened.has("b"));
        assert!(!reopened.has("c"));
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.outcome("a"), Some(UnitState::Published));
    }

    #[test]
    fn duplicate_record_is_an_invariant_violation() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = PublishLedger::open(dir.path().join("ledger.json")).unwrap();
        ledger.record(record("a")).unwrap();
        let err = ledger.record(record("a")).unwrap_err();
        assert!(matches!(err, HotpressError::DuplicateRecord { topic_id } if topic_id == "a"));
        // The first record survives the rejected second write.
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn crash_safe_persist_keeps_prior_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        {
            let mut ledger = PublishLedger::open(&path).unwrap();
            ledger.record(record("a")).unwrap();
        }
        // Simulate a crash that left a stale temp file behind.
        std::fs::write(path.with_extension("json.tmp"), "{garbage").unwrap();
        let mut ledger = PublishLedger::open(&path).unwrap();
        assert!(ledger.has("a"));
        ledger.record(record("b")).unwrap();
        assert_eq!(PublishLedger::open(&path).unwrap().len(), 2);
    }

    #[test]
    fn outcomes_are_monotonic() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = PublishLedger::open(dir.path().join("ledger.json")).unwrap();
        ledger.mark_outcome("a", UnitState::Admitted).unwrap();
        ledger.mark_outcome("a", UnitState::Generated).unwrap();
        // Backwards transition refused.
        assert!(ledger.mark_outcome("a", UnitState::Admitted).is_err());
        // Terminal state never changes.
        ledger.mark_outcome("a", UnitState::Published).unwrap();
        assert!(ledger
            .mark_outcome("a", UnitState::PublishFailedSkipped)
            .is_err());
        assert_eq!(ledger.outcome("a"), Some(UnitState::Published));
    }

    #[test]
    fn new_attempt_clears_prior_failed_or_partial_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let mut ledger = PublishLedger::open(&path).unwrap();

        // A failed unit from a previous run gets a clean slate.
        ledger.mark_outcome("a", UnitState::Admitted).unwrap();
        ledger
            .mark_outcome("a", UnitState::GenerationFailed)
            .unwrap();
        ledger.begin_attempt("a").unwrap();
        assert_eq!(ledger.outcome("a"), None);
        ledger.mark_outcome("a", UnitState::Admitted).unwrap();

        // So does a unit a crash left mid-pipeline.
        ledger.mark_outcome("b", UnitState::Generated).unwrap();
        ledger.begin_attempt("b").unwrap();
        assert_eq!(ledger.outcome("b"), None);

        // Published is permanent.
        ledger.record(record("c")).unwrap();
        assert!(ledger.begin_attempt("c").is_err());
        assert_eq!(ledger.outcome("c"), Some(UnitState::Published));

        // The cleared slate survives a reopen.
        let reopened = PublishLedger::open(&path).unwrap();
        assert_eq!(reopened.outcome("b"), None);
    }

    #[test]
    fn cursor_never_moves_backwards() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = PublishLedger::open(dir.path().join("ledger.json")).unwrap();
        ledger.set_cursor(3).unwrap();
        ledger.set_cursor(1).unwrap();
        assert_eq!(ledger.cursor(), 3);
    }
}
