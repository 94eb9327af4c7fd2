pub mod error;
mod markdown;

pub use error::{PublishError, Result};
pub use markdown::markdown_to_html;

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

const PUBLISH_URL: &str = "https://mp.toutiao.com/profile_v4/graphic/publish";
const LOGIN_MARKER: &str = "/auth/page/login";

/// One browser cookie from an externally captured Toutiao session.
/// Acquisition is out of scope; the file is produced by a manual login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default)]
    pub path: Option<String>,
}

/// Load session cookies from a JSON file (a list of cookie objects).
pub fn load_cookies(path: impl AsRef<Path>) -> Result<Vec<Cookie>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| PublishError::Cookie(format!("{}: {e}", path.display())))?;
    let cookies: Vec<Cookie> = serde_json::from_str(&raw)
        .map_err(|e| PublishError::Cookie(format!("{}: {e}", path.display())))?;
    if cookies.is_empty() {
        return Err(PublishError::Cookie(format!(
            "{}: no cookies in file",
            path.display()
        )));
    }
    info!(count = cookies.len(), "Session cookies loaded");
    Ok(cookies)
}

/// Confirmation returned by a successful publish action.
#[derive(Debug, Clone)]
pub struct PublishReceipt {
    pub platform_post_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FunctionResult {
    status: String,
    #[serde(rename = "postId")]
    post_id: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Publisher that drives the Toutiao MP editor through a Browserless
/// `/function` endpoint. The page-automation script runs server-side inside
/// Browserless; this client owns the session cookies and the HTTP contract.
///
/// One publisher equals one authenticated browser session. It must not be
/// shared across concurrent publishes.
pub struct ToutiaoPublisher {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    cookies: Vec<Cookie>,
}

impl ToutiaoPublisher {
    pub fn new(base_url: &str, token: Option<&str>, cookies: Vec<Cookie>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(180))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
            cookies,
        }
    }

    fn endpoint(&self) -> String {
        let mut endpoint = format!("{}/function", self.base_url);
        if let Some(token) = &self.token {
            endpoint.push_str(&format!("?token={token}"));
        }
        endpoint
    }

    async fn run_function(&self, code: &str, context: serde_json::Value) -> Result<FunctionResult> {
        let body = json!({ "code": code, "context": context });

        let response = self
            .http
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PublishError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let result: FunctionResult = response
            .json()
            .await
            .map_err(|e| PublishError::Flow(format!("unreadable function result: {e}")))?;
        Ok(result)
    }

    /// Check that the stored cookies still carry a live session.
    pub async fn verify_session(&self) -> Result<()> {
        let context = json!({
            "cookies": self.cookies,
            "publishUrl": PUBLISH_URL,
            "loginMarker": LOGIN_MARKER,
        });
        let result = self.run_function(SESSION_CHECK_SCRIPT, context).await?;
        match result.status.as_str() {
            "ok" => Ok(()),
            "auth_required" => Err(PublishError::Auth(
                result.detail.unwrap_or_else(|| "login page".to_string()),
            )),
            other => Err(PublishError::Flow(format!("session check: {other}"))),
        }
    }

    /// Publish one article. `html` is the editor-ready body; `cover_png` is
    /// attached when present, otherwise the article goes out without a cover.
    pub async fn publish(
        &self,
        title: &str,
        html: &str,
        cover_png: Option<&[u8]>,
    ) -> Result<PublishReceipt> {
        debug!(title, has_cover = cover_png.is_some(), "Publishing article");

        let cover_b64 =
            cover_png.map(|bytes| base64::engine::general_purpose::STANDARD.encode(bytes));
        let context = json!({
            "cookies": self.cookies,
            "publishUrl": PUBLISH_URL,
            "loginMarker": LOGIN_MARKER,
            "title": title,
            "contentHtml": html,
            "coverPng": cover_b64,
        });

        let result = self.run_function(PUBLISH_SCRIPT, context).await?;
        match result.status.as_str() {
            "published" => {
                info!(title, post_id = ?result.post_id, "Article published");
                Ok(PublishReceipt {
                    platform_post_id: result.post_id,
                })
            }
            "auth_required" => Err(PublishError::Auth(
                result.detail.unwrap_or_else(|| "login page".to_string()),
            )),
            other => Err(PublishError::Flow(format!(
                "{other}: {}",
                result.detail.unwrap_or_default()
            ))),
        }
    }
}

// Puppeteer scripts executed inside Browserless. The element selectors live
// here, at the outermost I/O edge; nothing in the pipeline depends on them.

const SESSION_CHECK_SCRIPT: &str = r#"
module.exports = async ({ page, context }) => {
  await page.setCookie(...context.cookies);
  await page.goto(context.publishUrl, { waitUntil: "networkidle2" });
  if (page.url().includes(context.loginMarker)) {
    return { data: { status: "auth_required", detail: page.url() }, type: "application/json" };
  }
  return { data: { status: "ok" }, type: "application/json" };
};
"#;

const PUBLISH_SCRIPT: &str = r#"
module.exports = async ({ page, context }) => {
  await page.setCookie(...context.cookies);
  await page.goto(context.publishUrl, { waitUntil: "networkidle2" });
  if (page.url().includes(context.loginMarker)) {
    return { data: { status: "auth_required", detail: page.url() }, type: "application/json" };
  }

  await page.waitForSelector(".editor-title textarea", { timeout: 30000 });
  await page.type(".editor-title textarea", context.title);
  await page.evaluate((html) => {
    const editor = document.querySelector(".ProseMirror");
    editor.innerHTML = html;
    editor.dispatchEvent(new Event("input", { bubbles: true }));
  }, context.contentHtml);

  if (context.coverPng) {
    await page.click(".article-cover .upload-trigger");
    const input = await page.waitForSelector("input[type=file]", { timeout: 15000 });
    const buffer = Buffer.from(context.coverPng, "base64");
    await input.uploadFile({ name: "cover.png", mimeType: "image/png", buffer });
    await page.waitForSelector(".article-cover .preview", { timeout: 30000 });
  }

  await page.click(".publish-btn");
  await page.waitForNavigation({ waitUntil: "networkidle2", timeout: 60000 });
  const match = page.url().match(/pgc_id=(\d+)/);
  return {
    data: { status: "published", postId: match ? match[1] : null },
    type: "application/json",
  };
};
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_cookies_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toutiao.json");
        std::fs::write(
            &path,
            r#"[{"name": "sessionid", "value": "abc", "domain": ".toutiao.com", "path": "/"}]"#,
        )
        .unwrap();
        let cookies = load_cookies(&path).unwrap();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "sessionid");
    }

    #[test]
    fn load_cookies_rejects_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toutiao.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(matches!(load_cookies(&path), Err(PublishError::Cookie(_))));
    }

    #[test]
    fn parses_function_results() {
        let ok: FunctionResult =
            serde_json::from_str(r#"{"status": "published", "postId": "7123456"}"#).unwrap();
        assert_eq!(ok.status, "published");
        assert_eq!(ok.post_id.as_deref(), Some("7123456"));

        let auth: FunctionResult =
            serde_json::from_str(r#"{"status": "auth_required", "detail": "redirected"}"#).unwrap();
        assert_eq!(auth.status, "auth_required");
        assert!(auth.post_id.is_none());
    }
}
