pub mod article;
pub mod feed;
pub mod filters;
pub mod notification;
pub mod search;

pub use article::{parse_timestamp, Article, EngagementCounts, Media};
pub use feed::{FeedKind, FeedState, FeedStatus, TrendingPeriod};
pub use filters::{FilterChanges, FilterState, FilterUpdate, ALL_SECTIONS};
pub use notification::NoveltyNotification;
pub use search::{SearchOptions, SearchSort};
