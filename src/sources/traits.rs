use async_trait::async_trait;

use crate::domain::{Article, SearchOptions, TrendingPeriod};
use crate::errors::ApiResult;

/// Where article collections come from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Latest articles of the real-time stream, optionally scoped to a section
    async fn fetch_recent(&self, section: &str) -> ApiResult<Vec<Article>>;

    /// Most viewed articles over the trailing period
    async fn fetch_trending(&self, period: TrendingPeriod) -> ApiResult<Vec<Article>>;

    /// Free-text article search; an empty query returns nothing without a request
    async fn search(&self, query: &str, options: &SearchOptions) -> ApiResult<Vec<Article>>;
}

#[async_trait]
impl<T: NewsSource + ?Sized> NewsSource for std::sync::Arc<T> {
    async fn fetch_recent(&self, section: &str) -> ApiResult<Vec<Article>> {
        (**self).fetch_recent(section).await
    }

    async fn fetch_trending(&self, period: TrendingPeriod) -> ApiResult<Vec<Article>> {
        (**self).fetch_trending(period).await
    }

    async fn search(&self, query: &str, options: &SearchOptions) -> ApiResult<Vec<Article>> {
        (**self).search(query, options).await
    }
}
