pub mod article_store;
pub mod novelty_tracker;

pub use article_store::{
    ArticleStore, DayFilter, PollHandle, StoreEvent, StoreSettings, NO_SEARCH_RESULTS,
};
pub use novelty_tracker::{NoveltyOutcome, NoveltyTracker};
