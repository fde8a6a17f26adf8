//! Click entity representing a single redirect event.

use chrono::{DateTime, Utc};

/// Longest IP address text kept (IPv6 with an embedded IPv4 tail).
pub const MAX_IP_LEN: usize = 45;
/// Longest user agent kept.
pub const MAX_USER_AGENT_LEN: usize = 1024;
/// Longest referrer kept.
pub const MAX_REFERRER_LEN: usize = 1024;

/// A durable click recorded when a shortened link is followed.
///
/// Owned by its link: deleting the link deletes its clicks.
#[derive(Debug, Clone, PartialEq)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

impl Click {
    /// Creates a new Click instance.
    pub fn new(
        id: i64,
        link_id: i64,
        clicked_at: DateTime<Utc>,
        ip: Option<String>,
        user_agent: Option<String>,
        referrer: Option<String>,
    ) -> Self {
        Self {
            id,
            link_id,
            clicked_at,
            ip,
            user_agent,
            referrer,
        }
    }
}

/// Request metadata captured by the redirect handler.
///
/// All fields are best-effort; missing headers are simply `None`.
#[derive(Debug, Clone, Default)]
pub struct ClickMeta {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

impl ClickMeta {
    pub fn new(ip: Option<String>, user_agent: Option<&str>, referrer: Option<&str>) -> Self {
        Self {
            ip,
            user_agent: user_agent.map(str::to_string),
            referrer: referrer.map(str::to_string),
        }
    }
}

/// Input data for recording a click against an existing link.
///
/// Built from [`ClickMeta`] with every field truncated to its column bound.
#[derive(Debug, Clone)]
pub struct NewClick {
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

impl NewClick {
    pub fn from_meta(link_id: i64, clicked_at: DateTime<Utc>, meta: ClickMeta) -> Self {
        Self {
            link_id,
            clicked_at,
            ip: meta.ip.map(|v| truncate_chars(v, MAX_IP_LEN)),
            user_agent: meta
                .user_agent
                .map(|v| truncate_chars(v, MAX_USER_AGENT_LEN)),
            referrer: meta.referrer.map(|v| truncate_chars(v, MAX_REFERRER_LEN)),
        }
    }
}

/// Truncates to at most `max` characters without splitting a code point.
fn truncate_chars(mut value: String, max: usize) -> String {
    if let Some((idx, _)) = value.char_indices().nth(max) {
        value.truncate(idx);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_creation_with_all_fields() {
        let now = Utc::now();
        let click = Click::new(
            1,
            42,
            now,
            Some("192.168.1.1".to_string()),
            Some("Mozilla/5.0".to_string()),
            Some("https://google.com".to_string()),
        );

        assert_eq!(click.id, 1);
        assert_eq!(click.link_id, 42);
        assert_eq!(click.clicked_at, now);
        assert_eq!(click.ip.as_deref(), Some("192.168.1.1"));
        assert_eq!(click.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(click.referrer.as_deref(), Some("https://google.com"));
    }

    #[test]
    fn test_click_meta_from_headers() {
        let meta = ClickMeta::new(Some("10.0.0.1".to_string()), Some("Chrome/120"), None);

        assert_eq!(meta.ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(meta.user_agent.as_deref(), Some("Chrome/120"));
        assert!(meta.referrer.is_none());
    }

    #[test]
    fn test_new_click_truncates_long_fields() {
        let meta = ClickMeta {
            ip: Some("1".repeat(100)),
            user_agent: Some("a".repeat(5000)),
            referrer: Some("r".repeat(1024)),
        };

        let click = NewClick::from_meta(7, Utc::now(), meta);

        assert_eq!(click.link_id, 7);
        assert_eq!(click.ip.unwrap().len(), MAX_IP_LEN);
        assert_eq!(click.user_agent.unwrap().len(), MAX_USER_AGENT_LEN);
        assert_eq!(click.referrer.unwrap().len(), MAX_REFERRER_LEN);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let value = "é".repeat(10);
        let truncated = truncate_chars(value, 3);
        assert_eq!(truncated, "ééé");
    }

    #[test]
    fn test_new_click_minimal() {
        let click = NewClick::from_meta(3, Utc::now(), ClickMeta::default());

        assert!(click.ip.is_none());
        assert!(click.user_agent.is_none());
        assert!(click.referrer.is_none());
    }
}
