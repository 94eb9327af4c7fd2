use std::env;

use tracing::info;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // DeepSeek (article generation + safety classification)
    pub deepseek_api_key: String,
    pub deepseek_base_url: String,
    pub deepseek_model: String,

    // Tencent Hunyuan (cover image generation)
    pub hunyuan_secret_id: String,
    pub hunyuan_secret_key: String,
    pub hunyuan_region: String,

    // Browserless (platform publish automation)
    pub browserless_url: String,
    pub browserless_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            deepseek_api_key: required_env("DEEPSEEK_API_KEY"),
            deepseek_base_url: env::var("DEEPSEEK_BASE_URL")
                .unwrap_or_else(|_| "https://api.deepseek.com/v1".to_string()),
            deepseek_model: env::var("DEEPSEEK_MODEL")
                .unwrap_or_else(|_| "deepseek-chat".to_string()),
            hunyuan_secret_id: required_env("HUNYUAN_SECRET_ID"),
            hunyuan_secret_key: required_env("HUNYUAN_SECRET_KEY"),
            hunyuan_region: env::var("HUNYUAN_REGION")
                .unwrap_or_else(|_| "ap-guangzhou".to_string()),
            browserless_url: env::var("BROWSERLESS_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            browserless_token: env::var("BROWSERLESS_TOKEN").ok(),
        }
    }

    /// Minimal config for crawl-only runs — no image or publish credentials
    /// needed, only the classifier.
    pub fn crawl_from_env() -> Self {
        Self {
            deepseek_api_key: required_env("DEEPSEEK_API_KEY"),
            deepseek_base_url: env::var("DEEPSEEK_BASE_URL")
                .unwrap_or_else(|_| "https://api.deepseek.com/v1".to_string()),
            deepseek_model: env::var("DEEPSEEK_MODEL")
                .unwrap_or_else(|_| "deepseek-chat".to_string()),
            hunyuan_secret_id: String::new(),
            hunyuan_secret_key: String::new(),
            hunyuan_region: String::new(),
            browserless_url: String::new(),
            browserless_token: None,
        }
    }

    /// Log the configuration with secrets redacted.
    pub fn log_redacted(&self) {
        info!(
            deepseek_base_url = %self.deepseek_base_url,
            deepseek_model = %self.deepseek_model,
            deepseek_api_key = %redact(&self.deepseek_api_key),
            hunyuan_secret_id = %redact(&self.hunyuan_secret_id),
            hunyuan_region = %self.hunyuan_region,
            browserless_url = %self.browserless_url,
            "Config loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn redact(secret: &str) -> String {
    if secret.len() <= 6 {
        "***".to_string()
    } else {
        format!("{}***", &secret[..4])
    }
}
