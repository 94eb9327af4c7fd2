//! Per-article output artifacts: markdown text and cover images, written
//! under the configured directories with timestamped, sanitized filenames.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{info, warn};

use hotpress_common::{Article, Result};

/// Keep alphanumerics (any script), spaces, hyphens, underscores; then
/// collapse spaces to underscores. Mirrors what the platform tolerates in
/// filenames.
pub fn sanitize_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let cleaned = cleaned.trim().replace(' ', "_");
    if cleaned.is_empty() {
        "article".to_string()
    } else {
        cleaned
    }
}

fn stamped_name(title: &str, ext: &str) -> String {
    format!(
        "{}_{}.{ext}",
        Local::now().format("%Y%m%d_%H%M%S"),
        sanitize_filename(title)
    )
}

/// Write the article as markdown (`# title` heading plus body).
pub fn save_article(dir: &Path, article: &Article) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(stamped_name(&article.title, "md"));
    let content = format!("# {}\n\n{}", article.title, article.body);
    std::fs::write(&path, content)?;
    info!(path = %path.display(), "Article saved");
    Ok(path)
}

/// Write cover-image bytes next to the other covers.
pub fn save_cover(dir: &Path, title: &str, png: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(stamped_name(title, "png"));
    std::fs::write(&path, png)?;
    info!(path = %path.display(), "Cover image saved");
    Ok(path)
}

/// Remove a temporary cover after its article went out. Best effort — a
/// leftover file is not worth failing the unit over.
pub fn remove_cover(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "Failed to remove cover image");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_punctuation_and_spaces() {
        assert_eq!(sanitize_filename("A Title: With? Marks!"), "A_Title_With_Marks");
        assert_eq!(sanitize_filename("热点话题解读"), "热点话题解读");
        assert_eq!(sanitize_filename("???"), "article");
    }

    #[test]
    fn save_article_writes_markdown_with_heading() {
        let dir = tempfile::tempdir().unwrap();
        let article = Article::new("https://t/1", "标题", "正文内容。");
        let path = save_article(dir.path(), &article).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# 标题\n\n"));
        assert!(content.ends_with("正文内容。"));
        assert_eq!(path.extension().unwrap(), "md");
    }

    #[test]
    fn save_and_remove_cover() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_cover(dir.path(), "title", b"\x89PNG").unwrap();
        assert!(path.exists());
        remove_cover(&path);
        assert!(!path.exists());
    }
}
