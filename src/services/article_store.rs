use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use tokio::sync::{broadcast, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::{
    Article, FeedKind, FeedState, FeedStatus, FilterChanges, FilterState, FilterUpdate,
    NoveltyNotification, SearchOptions,
};
use crate::errors::ApiResult;
use crate::services::novelty_tracker::NoveltyTracker;
use crate::sources::NewsSource;

pub const NO_SEARCH_RESULTS: &str = "No articles found for your search query";

const EVENT_CAPACITY: usize = 64;

/// Same-day filtering applied to a feed's successful results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayFilter {
    Off,
    /// Keep articles published today (local time); if none are, keep everything
    TodayWithFallback,
}

impl DayFilter {
    pub fn apply(&self, articles: Vec<Article>, now: DateTime<Local>) -> Vec<Article> {
        match self {
            DayFilter::Off => articles,
            DayFilter::TodayWithFallback => {
                let today: Vec<Article> = articles
                    .iter()
                    .filter(|a| a.published_on_day_of(now))
                    .cloned()
                    .collect();

                if today.is_empty() {
                    debug!(count = articles.len(), "No articles from today, keeping all");
                    articles
                } else {
                    today
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub poll_interval: Duration,
    pub notification_ttl: Duration,
    pub recent_day_filter: DayFilter,
    pub trending_day_filter: DayFilter,
    pub search_day_filter: DayFilter,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            notification_ttl: Duration::from_secs(5),
            recent_day_filter: DayFilter::TodayWithFallback,
            trending_day_filter: DayFilter::Off,
            search_day_filter: DayFilter::Off,
        }
    }
}

impl StoreSettings {
    pub fn day_filter(&self, kind: FeedKind) -> DayFilter {
        match kind {
            FeedKind::Recent => self.recent_day_filter,
            FeedKind::Trending => self.trending_day_filter,
            FeedKind::Search => self.search_day_filter,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    FeedUpdated(FeedKind),
    NoveltyRaised(NoveltyNotification),
    NoveltyDismissed(u64),
}

/// Feed state plus the request bookkeeping behind it.
#[derive(Debug, Default)]
struct FeedSlot {
    state: FeedState,
    /// Status after the last applied outcome
    settled: FeedStatus,
    issued: u64,
    applied: u64,
    /// Requests numbered below this were issued under old filters
    epoch: u64,
    in_flight: usize,
}

impl FeedSlot {
    fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.in_flight += 1;
        self.state.begin_loading();
        self.issued
    }

    /// Release request `seq` and report whether its response may be applied.
    /// Nothing is applied once the store is `closed`.
    fn settle(&mut self, seq: u64, closed: bool) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.state.is_loading = self.in_flight > 0;

        let current = !closed && seq > self.applied && seq >= self.epoch;
        if current {
            self.applied = seq;
        } else if self.in_flight == 0 && self.state.status == FeedStatus::Loading {
            self.state.status = self.settled;
        }
        current
    }

    fn invalidate_in_flight(&mut self) {
        self.epoch = self.issued + 1;
    }

    fn apply_articles(&mut self, articles: Vec<Article>) {
        self.state.apply_articles(articles);
        self.settled = self.state.status;
    }

    fn apply_notice(&mut self, notice: &str) {
        self.state.apply_notice(notice);
        self.settled = self.state.status;
    }

    fn apply_error(&mut self, message: String) {
        self.state.apply_error(message);
        self.settled = self.state.status;
    }
}

struct StoreState {
    recent: FeedSlot,
    trending: FeedSlot,
    search: FeedSlot,
    filters: FilterState,
    novelty: NoveltyTracker,
    notification: Option<NoveltyNotification>,
    /// Articles behind the active notification
    fresh: Vec<Article>,
    dismiss: Option<CancellationToken>,
}

impl StoreState {
    fn slot(&self, kind: FeedKind) -> &FeedSlot {
        match kind {
            FeedKind::Recent => &self.recent,
            FeedKind::Trending => &self.trending,
            FeedKind::Search => &self.search,
        }
    }

    fn slot_mut(&mut self, kind: FeedKind) -> &mut FeedSlot {
        match kind {
            FeedKind::Recent => &mut self.recent,
            FeedKind::Trending => &mut self.trending,
            FeedKind::Search => &mut self.search,
        }
    }
}

struct StoreInner<S> {
    source: S,
    settings: StoreSettings,
    state: Mutex<StoreState>,
    events: broadcast::Sender<StoreEvent>,
    shutdown: CancellationToken,
    section_changed: Notify,
}

/// Owns the article feeds, the filters and the polling lifecycle.
///
/// Cloning is cheap and yields a handle to the same store. Failures never
/// escape: they end up as the `error` of the feed that failed.
pub struct ArticleStore<S: NewsSource + 'static> {
    inner: Arc<StoreInner<S>>,
}

impl<S: NewsSource + 'static> Clone for ArticleStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: NewsSource + 'static> ArticleStore<S> {
    pub fn new(source: S, settings: StoreSettings) -> Self {
        let ttl = chrono::Duration::from_std(settings.notification_ttl)
            .unwrap_or_else(|_| chrono::Duration::seconds(5));
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let state = StoreState {
            recent: FeedSlot::default(),
            trending: FeedSlot::default(),
            search: FeedSlot::default(),
            filters: FilterState::default(),
            novelty: NoveltyTracker::in_memory(ttl),
            notification: None,
            fresh: Vec::new(),
            dismiss: None,
        };

        Self {
            inner: Arc::new(StoreInner {
                source,
                settings,
                state: Mutex::new(state),
                events,
                shutdown: CancellationToken::new(),
                section_changed: Notify::new(),
            }),
        }
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.inner.settings
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }

    pub async fn feed(&self, kind: FeedKind) -> FeedState {
        self.inner.state.lock().await.slot(kind).state.clone()
    }

    pub async fn filters(&self) -> FilterState {
        self.inner.state.lock().await.filters.clone()
    }

    /// Articles of a feed narrowed to the current section filter.
    pub async fn visible_articles(&self, kind: FeedKind) -> Vec<Article> {
        let state = self.inner.state.lock().await;
        let articles = &state.slot(kind).state.articles;

        if state.filters.shows_all_sections() {
            return articles.clone();
        }

        articles
            .iter()
            .filter(|a| a.normalized_section().as_deref() == Some(state.filters.section.as_str()))
            .cloned()
            .collect()
    }

    pub async fn active_notification(&self) -> Option<NoveltyNotification> {
        self.inner.state.lock().await.notification.clone()
    }

    /// The articles the active notification reports, in feed order. Empty
    /// when no notification is showing.
    pub async fn new_articles(&self) -> Vec<Article> {
        self.inner.state.lock().await.fresh.clone()
    }

    pub async fn known_identities(&self) -> usize {
        self.inner.state.lock().await.novelty.known_count()
    }

    pub async fn refresh_recent(&self) -> FeedState {
        let (seq, section) = {
            let mut state = self.inner.state.lock().await;
            let seq = state.recent.begin();
            (seq, state.filters.section.clone())
        };
        self.emit(StoreEvent::FeedUpdated(FeedKind::Recent));

        debug!(seq, section = %section, "Fetching latest articles");
        let result = self.inner.source.fetch_recent(&section).await;
        self.complete(FeedKind::Recent, seq, result).await
    }

    pub async fn refresh_trending(&self) -> FeedState {
        let (seq, period) = {
            let mut state = self.inner.state.lock().await;
            let seq = state.trending.begin();
            (seq, state.filters.trending_period)
        };
        self.emit(StoreEvent::FeedUpdated(FeedKind::Trending));

        debug!(seq, days = period.days(), "Fetching popular articles");
        let result = self.inner.source.fetch_trending(period).await;
        self.complete(FeedKind::Trending, seq, result).await
    }

    /// Run a search into the search feed. An empty query changes nothing.
    pub async fn search(&self, query: &str, options: &SearchOptions) -> FeedState {
        let query = query.trim();
        if query.is_empty() {
            return self.feed(FeedKind::Search).await;
        }

        let seq = self.inner.state.lock().await.search.begin();
        self.emit(StoreEvent::FeedUpdated(FeedKind::Search));

        debug!(seq, query, "Searching articles");
        let result = self.inner.source.search(query, options).await;
        self.complete(FeedKind::Search, seq, result).await
    }

    /// Merge `update` into the filters without fetching anything. The next
    /// refresh or poll tick picks the new values up.
    pub async fn set_filters(&self, update: FilterUpdate) -> FilterChanges {
        let mut state = self.inner.state.lock().await;
        let changes = state.filters.merge(update);
        if changes.section {
            state.recent.invalidate_in_flight();
        }
        changes
    }

    /// Merge `update` into the filters and re-fetch whatever depends on the
    /// fields that changed.
    pub async fn update_filters(&self, update: FilterUpdate) -> FilterState {
        let changes = self.set_filters(update).await;
        let filters = self.filters().await;

        if changes.section {
            info!(section = %filters.section, "Section filter changed");
            self.inner.section_changed.notify_waiters();
            self.refresh_recent().await;
        }
        if changes.trending_period {
            self.refresh_trending().await;
        }
        if changes.search_query && !filters.search_query.trim().is_empty() {
            self.search(&filters.search_query, &SearchOptions::default())
                .await;
        }

        filters
    }

    async fn complete(
        &self,
        kind: FeedKind,
        seq: u64,
        result: ApiResult<Vec<Article>>,
    ) -> FeedState {
        let mut state = self.inner.state.lock().await;

        let closed = self.inner.shutdown.is_cancelled();
        if !state.slot_mut(kind).settle(seq, closed) {
            debug!(feed = %kind, seq, "Discarding stale response");
            return state.slot(kind).state.clone();
        }

        match result {
            Ok(articles) => {
                let fetched = articles.len();
                let articles = self.inner.settings.day_filter(kind).apply(articles, Local::now());
                debug!(feed = %kind, fetched, kept = articles.len(), "Applying articles");

                if kind == FeedKind::Search && articles.is_empty() {
                    state.search.apply_notice(NO_SEARCH_RESULTS);
                } else {
                    if kind == FeedKind::Recent {
                        self.observe_novelty(&mut state, &articles, Utc::now());
                    }
                    state.slot_mut(kind).apply_articles(articles);
                }
            }
            Err(err) => {
                warn!(feed = %kind, "Fetch failed: {}", err);
                state.slot_mut(kind).apply_error(err.to_string());
            }
        }

        let snapshot = state.slot(kind).state.clone();
        drop(state);

        self.emit(StoreEvent::FeedUpdated(kind));
        snapshot
    }

    fn observe_novelty(&self, state: &mut StoreState, articles: &[Article], now: DateTime<Utc>) {
        let outcome = state.novelty.observe(articles, now);
        let Some(notification) = outcome.notification else {
            return;
        };

        info!(count = notification.count, "New articles arrived");

        if let Some(previous) = state.dismiss.take() {
            previous.cancel();
        }
        let token = self.inner.shutdown.child_token();
        state.dismiss = Some(token.clone());
        state.notification = Some(notification.clone());
        state.fresh = outcome.new_articles;

        self.spawn_dismiss(notification.id, token);
        self.emit(StoreEvent::NoveltyRaised(notification));
    }

    fn spawn_dismiss(&self, id: u64, token: CancellationToken) {
        let inner = Arc::clone(&self.inner);
        let ttl = inner.settings.notification_ttl;

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(ttl) => {
                    let mut state = inner.state.lock().await;
                    if state.notification.as_ref().map(|n| n.id) == Some(id) {
                        state.notification = None;
                        state.fresh.clear();
                        state.dismiss = None;
                        drop(state);
                        let _ = inner.events.send(StoreEvent::NoveltyDismissed(id));
                    }
                }
            }
        });
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }

    /// Load trending once and poll the recent stream until the returned
    /// handle is shut down or dropped.
    pub fn start(&self) -> PollHandle {
        let token = self.inner.shutdown.child_token();

        let store = self.clone();
        let cancel = token.clone();
        let trending = tokio::spawn(async move {
            if !cancel.is_cancelled() {
                store.refresh_trending().await;
            }
        });

        let store = self.clone();
        let cancel = token.clone();
        let recent = tokio::spawn(async move { store.poll_recent(cancel).await });

        info!(interval = ?self.inner.settings.poll_interval, "Polling started");

        PollHandle {
            token,
            tasks: vec![trending, recent],
        }
    }

    /// In-flight fetches are not interrupted; cancellation only stops new ticks.
    async fn poll_recent(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.inner.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = self.inner.section_changed.notified() => {
                    // the filter change already fetched; restart the period
                    ticker.reset();
                }
                _ = ticker.tick() => {
                    self.refresh_recent().await;
                }
            }
        }

        debug!("Polling stopped");
    }

    /// Tear the store down: stop polling, cancel notification timers and
    /// ignore responses that arrive afterwards.
    pub fn shutdown(&self) {
        info!("Shutting down article store");
        self.inner.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }
}

/// Cancellation handle of a running poll loop. Dropping it stops polling.
pub struct PollHandle {
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl PollHandle {
    /// Stop polling and wait for the poll tasks to finish.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!("Poll task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
