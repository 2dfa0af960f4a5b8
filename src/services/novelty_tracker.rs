use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::domain::{Article, NoveltyNotification};
use crate::storage::{IdentityRepository, MemoryIdentityRepository};

/// Result of folding one recent-stream snapshot into the tracker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoveltyOutcome {
    pub new_articles: Vec<Article>,
    pub notification: Option<NoveltyNotification>,
}

pub struct NoveltyTracker<R: IdentityRepository = MemoryIdentityRepository> {
    repository: R,
    ttl: Duration,
    next_id: u64,
}

impl NoveltyTracker<MemoryIdentityRepository> {
    pub fn in_memory(ttl: Duration) -> Self {
        Self::new(MemoryIdentityRepository::new(), ttl)
    }
}

impl<R: IdentityRepository> NoveltyTracker<R> {
    pub fn new(repository: R, ttl: Duration) -> Self {
        Self {
            repository,
            ttl,
            next_id: 1,
        }
    }

    /// Record a snapshot and report what it added.
    ///
    /// The very first snapshot only seeds the known set. Articles sharing an
    /// identity key count once.
    pub fn observe(&mut self, articles: &[Article], now: DateTime<Utc>) -> NoveltyOutcome {
        let keys: Vec<String> = articles.iter().map(Article::identity_key).collect();
        let had_history = !self.repository.is_empty();

        let unknown = self.repository.get_unknown(&keys);
        let mut taken = HashSet::new();
        let new_articles: Vec<Article> = articles
            .iter()
            .zip(&keys)
            .filter(|(_, key)| unknown.contains(key) && taken.insert(*key))
            .map(|(article, _)| article.clone())
            .collect();

        self.repository.mark_known(&keys);

        let notification = if !unknown.is_empty() && had_history {
            let id = self.next_id;
            self.next_id += 1;
            Some(NoveltyNotification::new(id, unknown.len(), now, self.ttl))
        } else {
            None
        };

        debug!(
            snapshot = articles.len(),
            new = unknown.len(),
            known = self.repository.len(),
            notified = notification.is_some(),
            "Observed recent snapshot"
        );

        NoveltyOutcome {
            new_articles,
            notification,
        }
    }

    pub fn known_count(&self) -> usize {
        self.repository.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::traits::MockIdentityRepository;

    fn article(uri: &str) -> Article {
        Article::new(format!("Story {}", uri)).with_uri(uri)
    }

    fn tracker() -> NoveltyTracker {
        NoveltyTracker::in_memory(Duration::seconds(5))
    }

    #[test]
    fn test_first_load_is_silent() {
        let mut tracker = tracker();
        let outcome = tracker.observe(&[article("1"), article("2"), article("3")], Utc::now());

        assert!(outcome.notification.is_none());
        assert_eq!(outcome.new_articles.len(), 3);
        assert_eq!(tracker.known_count(), 3);
    }

    #[test]
    fn test_second_load_notifies_once_with_count() {
        let mut tracker = tracker();
        let now = Utc::now();
        tracker.observe(&[article("1"), article("2")], now);

        let outcome = tracker.observe(
            &[article("4"), article("1"), article("2"), article("3")],
            now,
        );

        let notification = outcome.notification.unwrap();
        assert_eq!(notification.count, 2);
        assert_eq!(notification.expires_at, now + Duration::seconds(5));
        let titles: Vec<&str> = outcome.new_articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Story 4", "Story 3"]);
    }

    #[test]
    fn test_unchanged_load_is_silent() {
        let mut tracker = tracker();
        let now = Utc::now();
        tracker.observe(&[article("1")], now);
        tracker.observe(&[article("1"), article("2")], now);

        let outcome = tracker.observe(&[article("2"), article("1")], now);

        assert!(outcome.notification.is_none());
        assert!(outcome.new_articles.is_empty());
        assert_eq!(tracker.known_count(), 2);
    }

    #[test]
    fn test_known_set_survives_articles_dropping_out() {
        let mut tracker = tracker();
        let now = Utc::now();
        tracker.observe(&[article("1"), article("2")], now);
        tracker.observe(&[article("3")], now);

        // "1" left the feed and came back: not new
        let outcome = tracker.observe(&[article("1")], now);
        assert!(outcome.notification.is_none());
        assert_eq!(tracker.known_count(), 3);
    }

    #[test]
    fn test_duplicate_identities_collapse() {
        let mut tracker = tracker();
        let now = Utc::now();
        tracker.observe(&[article("seed")], now);

        let twin = Article::new("No identifiers").with_section("world");
        let outcome = tracker.observe(&[twin.clone(), twin], now);

        assert_eq!(outcome.notification.unwrap().count, 1);
        assert_eq!(outcome.new_articles.len(), 1);
    }

    #[test]
    fn test_notification_ids_increase() {
        let mut tracker = tracker();
        let now = Utc::now();
        tracker.observe(&[article("1")], now);
        let first = tracker.observe(&[article("2")], now).notification.unwrap();
        let second = tracker.observe(&[article("3")], now).notification.unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn test_uses_repository() {
        let mut repo = MockIdentityRepository::new();
        repo.expect_is_empty().return_const(false);
        repo.expect_get_unknown()
            .returning(|keys| keys.to_vec());
        repo.expect_mark_known().times(1).return_const(());
        repo.expect_len().return_const(10usize);

        let mut tracker = NoveltyTracker::new(repo, Duration::seconds(5));
        let outcome = tracker.observe(&[article("1")], Utc::now());

        assert_eq!(outcome.notification.unwrap().count, 1);
    }
}
