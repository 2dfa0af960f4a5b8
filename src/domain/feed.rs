use serde::{Deserialize, Serialize};

use super::Article;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Recent,
    Trending,
    Search,
}

impl FeedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::Recent => "recent",
            FeedKind::Trending => "trending",
            FeedKind::Search => "search",
        }
    }
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trailing window of the most-popular API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendingPeriod {
    #[default]
    Day,
    Week,
    Month,
}

impl TrendingPeriod {
    pub fn days(&self) -> u32 {
        match self {
            TrendingPeriod::Day => 1,
            TrendingPeriod::Week => 7,
            TrendingPeriod::Month => 30,
        }
    }
}

impl std::str::FromStr for TrendingPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(TrendingPeriod::Day),
            "7" => Ok(TrendingPeriod::Week),
            "30" => Ok(TrendingPeriod::Month),
            _ => Err(format!("Unsupported period: {} (expected 1, 7 or 30)", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// What the presentation layer sees of one feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedState {
    pub articles: Vec<Article>,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Non-error outcome worth showing, e.g. a search without results
    pub notice: Option<String>,
    pub status: FeedStatus,
}

impl FeedState {
    pub fn begin_loading(&mut self) {
        self.is_loading = true;
        self.error = None;
        self.notice = None;
        self.status = FeedStatus::Loading;
    }

    /// Replace the articles wholesale
    pub fn apply_articles(&mut self, articles: Vec<Article>) {
        self.articles = articles;
        self.error = None;
        self.notice = None;
        self.status = FeedStatus::Ready;
    }

    pub fn apply_notice(&mut self, notice: impl Into<String>) {
        self.articles.clear();
        self.error = None;
        self.notice = Some(notice.into());
        self.status = FeedStatus::Ready;
    }

    /// Record a failure; the last loaded articles stay visible
    pub fn apply_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.status = FeedStatus::Failed;
    }

    pub fn is_ready(&self) -> bool {
        self.status == FeedStatus::Ready
    }
}
