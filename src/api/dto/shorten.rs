//! DTOs for link shortening endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::Link;

/// Request to shorten a URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL to shorten (must be valid HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    #[validate(length(max = 2048, message = "URL is too long"))]
    pub url: String,

    /// Optional expiry timestamp. After this time, the link returns 410 Gone.
    pub expires_at: Option<DateTime<Utc>>,

    /// Optional free-form owner tag.
    #[validate(length(max = 255))]
    pub owner: Option<String>,
}

/// A freshly created short link.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub id: i64,
    pub code: String,
    pub short_url: String,
    pub original_url: String,
    pub owner: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
}

impl ShortenResponse {
    pub fn new(link: Link, code: String, short_url: String) -> Self {
        Self {
            id: link.id,
            code,
            short_url,
            original_url: link.target_url,
            owner: link.owner,
            expires_at: link.expires_at,
            click_count: link.click_count,
            created_at: link.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        let ok = ShortenRequest {
            url: "https://example.com/a".to_string(),
            expires_at: None,
            owner: Some("alice".to_string()),
        };
        assert!(ok.validate().is_ok());

        let bad_url = ShortenRequest {
            url: "example".to_string(),
            expires_at: None,
            owner: None,
        };
        assert!(bad_url.validate().is_err());

        let long_owner = ShortenRequest {
            url: "https://example.com".to_string(),
            expires_at: None,
            owner: Some("x".repeat(256)),
        };
        assert!(long_owner.validate().is_err());
    }
}
