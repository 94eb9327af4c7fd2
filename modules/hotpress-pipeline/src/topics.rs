//! Filtered-topic set persistence — the handoff between crawl and publish
//! modes. A crawl run writes the admitted set here; a publish run consumes
//! it. Plain JSON so the operator can inspect and prune it by hand.

use std::path::Path;

use tracing::info;

use hotpress_common::{FilteredTopic, HotpressError, Result};

pub fn save_filtered_topics(path: &Path, topics: &[FilteredTopic]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_string_pretty(topics)?)?;
    std::fs::rename(&tmp, path)?;
    info!(path = %path.display(), count = topics.len(), "Filtered topics saved");
    Ok(())
}

pub fn load_filtered_topics(path: &Path) -> Result<Vec<FilteredTopic>> {
    if !path.exists() {
        return Err(HotpressError::Storage(format!(
            "filtered topics file not found: {}",
            path.display()
        )));
    }
    let raw = std::fs::read_to_string(path)?;
    let topics: Vec<FilteredTopic> = serde_json::from_str(&raw)
        .map_err(|e| HotpressError::Storage(format!("{}: {e}", path.display())))?;
    info!(path = %path.display(), count = topics.len(), "Filtered topics loaded");
    Ok(topics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotpress_common::Topic;

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filtered.json");
        let topics = vec![
            FilteredTopic::admitted(Topic::new("https://t/1", "话题一", 1)),
            FilteredTopic::admitted(Topic::new("https://t/2", "话题二", 2)),
        ];
        save_filtered_topics(&path, &topics).unwrap();
        let loaded = load_filtered_topics(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].topic.id, "https://t/1");
        assert!(loaded[0].admissible);
    }

    #[test]
    fn missing_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_filtered_topics(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, HotpressError::Storage(_)));
    }
}
