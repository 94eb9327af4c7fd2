pub mod error;
mod sign;

pub use error::{HunyuanError, Result};

use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const HOST: &str = "hunyuan.tencentcloudapi.com";
const ACTION: &str = "TextToImageLite";
const VERSION: &str = "2023-09-01";
const SERVICE: &str = "hunyuan";

/// Parameters for one text-to-image call.
#[derive(Debug, Clone, Default)]
pub struct ImageRequest {
    pub prompt: String,
    pub negative_prompt: String,
    /// Style preset number, per the TextToImageLite Style enum.
    pub style: Option<String>,
    /// e.g. "1024:1024"
    pub resolution: Option<String>,
    /// Whether the platform watermark is stamped on the image.
    pub watermark: bool,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(rename = "Response")]
    response: ApiResponse,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(rename = "ResultImage")]
    result_image: Option<String>,
    #[serde(rename = "Error")]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Message")]
    message: String,
}

/// Client for Tencent Hunyuan TextToImageLite. The API returns a short-lived
/// image URL; `generate` downloads it and returns the raw bytes.
pub struct HunyuanClient {
    http: reqwest::Client,
    secret_id: String,
    secret_key: String,
    region: String,
}

impl HunyuanClient {
    pub fn new(secret_id: &str, secret_key: &str, region: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            secret_id: secret_id.to_string(),
            secret_key: secret_key.to_string(),
            region: region.to_string(),
        }
    }

    /// Generate one image and return its PNG bytes.
    pub async fn generate(&self, request: &ImageRequest) -> Result<Vec<u8>> {
        let mut payload = json!({
            "Prompt": request.prompt,
            "RspImgType": "url",
        });
        if !request.negative_prompt.is_empty() {
            payload["NegativePrompt"] = json!(request.negative_prompt);
        }
        if let Some(style) = &request.style {
            payload["Style"] = json!(style);
        }
        if let Some(resolution) = &request.resolution {
            payload["Resolution"] = json!(resolution);
        }
        payload["LogoAdd"] = json!(if request.watermark { 1 } else { 0 });

        let body = payload.to_string();
        let timestamp = Utc::now().timestamp();
        let date = Utc
            .timestamp_opt(timestamp, 0)
            .single()
            .unwrap_or_else(Utc::now)
            .format("%Y-%m-%d")
            .to_string();

        let canonical = sign::canonical_request(HOST, &body);
        let sts = sign::string_to_sign(timestamp, &date, SERVICE, &canonical);
        let signature = sign::signature(&self.secret_key, &date, SERVICE, &sts);
        let authorization = sign::authorization(&self.secret_id, &date, SERVICE, &signature);

        debug!(action = ACTION, region = %self.region, "Hunyuan image request");

        let response = self
            .http
            .post(format!("https://{HOST}"))
            .header("Authorization", authorization)
            .header("Content-Type", sign::CONTENT_TYPE)
            .header("Host", HOST)
            .header("X-TC-Timestamp", timestamp.to_string())
            .header("X-TC-Action", ACTION)
            .header("X-TC-Version", VERSION)
            .header("X-TC-Region", &self.region)
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(HunyuanError::Api { status, message });
        }

        let envelope: ApiEnvelope = response.json().await?;
        if let Some(err) = envelope.response.error {
            return Err(HunyuanError::Service(format!("{}: {}", err.code, err.message)));
        }
        let image_url = envelope
            .response
            .result_image
            .ok_or_else(|| HunyuanError::MissingImage("ResultImage absent".to_string()))?;

        let image_resp = self.http.get(&image_url).send().await?;
        if !image_resp.status().is_success() {
            return Err(HunyuanError::Api {
                status: image_resp.status().as_u16(),
                message: format!("image download failed: {image_url}"),
            });
        }
        Ok(image_resp.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_success_envelope() {
        let json = r#"{"Response": {"ResultImage": "https://img.example/x.png", "RequestId": "r1"}}"#;
        let envelope: ApiEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(
            envelope.response.result_image.as_deref(),
            Some("https://img.example/x.png")
        );
        assert!(envelope.response.error.is_none());
    }

    #[test]
    fn parses_error_envelope() {
        let json = r#"{"Response": {"Error": {"Code": "RequestLimitExceeded", "Message": "slow down"}, "RequestId": "r2"}}"#;
        let envelope: ApiEnvelope = serde_json::from_str(json).unwrap();
        let err = envelope.response.error.unwrap();
        assert_eq!(err.code, "RequestLimitExceeded");
        assert!(envelope.response.result_image.is_none());
    }
}
