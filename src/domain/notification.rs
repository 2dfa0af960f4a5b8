use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Raised when a recent-stream refresh brings articles not seen before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoveltyNotification {
    pub id: u64,
    pub count: usize,
    pub raised_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl NoveltyNotification {
    pub fn new(id: u64, count: usize, raised_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id,
            count,
            raised_at,
            expires_at: raised_at + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Format: "{count} new article(s) added"
    pub fn format(&self) -> String {
        if self.count == 1 {
            "1 new article added".to_string()
        } else {
            format!("{} new articles added", self.count)
        }
    }
}
