//! TC3-HMAC-SHA256 request signing for Tencent Cloud APIs.
//!
//! Reference: the canonical request covers only the `content-type` and `host`
//! headers; the derived key chain is date → service → "tc3_request".

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

pub fn canonical_request(host: &str, body: &str) -> String {
    format!(
        "POST\n/\n\ncontent-type:{CONTENT_TYPE}\nhost:{host}\n\ncontent-type;host\n{}",
        sha256_hex(body.as_bytes())
    )
}

pub fn string_to_sign(timestamp: i64, date: &str, service: &str, canonical: &str) -> String {
    format!(
        "TC3-HMAC-SHA256\n{timestamp}\n{date}/{service}/tc3_request\n{}",
        sha256_hex(canonical.as_bytes())
    )
}

pub fn signature(secret_key: &str, date: &str, service: &str, string_to_sign: &str) -> String {
    let secret_date = hmac_sha256(format!("TC3{secret_key}").as_bytes(), date.as_bytes());
    let secret_service = hmac_sha256(&secret_date, service.as_bytes());
    let secret_signing = hmac_sha256(&secret_service, b"tc3_request");
    hex::encode(hmac_sha256(&secret_signing, string_to_sign.as_bytes()))
}

pub fn authorization(
    secret_id: &str,
    date: &str,
    service: &str,
    signature: &str,
) -> String {
    format!(
        "TC3-HMAC-SHA256 Credential={secret_id}/{date}/{service}/tc3_request, \
         SignedHeaders=content-type;host, Signature={signature}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_request_shape() {
        let canonical = canonical_request("hunyuan.tencentcloudapi.com", "{}");
        let lines: Vec<&str> = canonical.lines().collect();
        assert_eq!(lines[0], "POST");
        assert_eq!(lines[1], "/");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], format!("content-type:{CONTENT_TYPE}"));
        assert_eq!(lines[4], "host:hunyuan.tencentcloudapi.com");
        assert_eq!(lines[6], "content-type;host");
        // Trailing line is the hex SHA-256 of the body.
        assert_eq!(lines[7].len(), 64);
    }

    #[test]
    fn signature_is_deterministic_and_key_sensitive() {
        let sts = string_to_sign(1700000000, "2023-11-14", "hunyuan", "canonical");
        let a = signature("key-a", "2023-11-14", "hunyuan", &sts);
        let b = signature("key-a", "2023-11-14", "hunyuan", &sts);
        let c = signature("key-b", "2023-11-14", "hunyuan", &sts);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn authorization_header_format() {
        let auth = authorization("AKID123", "2023-11-14", "hunyuan", "deadbeef");
        assert!(auth.starts_with("TC3-HMAC-SHA256 Credential=AKID123/2023-11-14/hunyuan/tc3_request,"));
        assert!(auth.ends_with("Signature=deadbeef"));
        assert!(auth.contains("SignedHeaders=content-type;host"));
    }
}
