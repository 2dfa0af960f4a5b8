use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::color::{string_hash, ColorResolver};
use super::geometry::{freshness_bucket, orbit_speed, size_for};
use crate::domain::{Article, FeedKind};

/// One renderable point of the scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Star {
    pub identity: String,
    pub title: String,
    pub section: Option<String>,
    pub color: &'static str,
    pub size: f64,
    pub orbit: u8,
    pub speed: f64,
    pub position: [f64; 3],
    pub feed: FeedKind,
}

/// Half extents and z offset of the box a feed's stars are scattered in.
fn feed_volume(kind: FeedKind) -> ([f64; 3], f64) {
    match kind {
        FeedKind::Recent => ([50.0, 20.0, 50.0], 0.0),
        FeedKind::Trending | FeedKind::Search => ([75.0, 30.0, 75.0], -50.0),
    }
}

pub struct StarfieldLayout<'a> {
    colors: &'a ColorResolver,
}

impl<'a> StarfieldLayout<'a> {
    pub fn new(colors: &'a ColorResolver) -> Self {
        Self { colors }
    }

    pub fn star_for(&self, kind: FeedKind, article: &Article, now: DateTime<Utc>) -> Star {
        let identity = article.identity_key();
        let orbit = freshness_bucket(article, now);

        Star {
            position: position_for(kind, &identity),
            color: self.colors.color_for(article.section.as_deref()),
            size: size_for(article),
            orbit,
            speed: orbit_speed(orbit),
            title: article.title.clone(),
            section: article.section.clone(),
            identity,
            feed: kind,
        }
    }

    pub fn layout(&self, kind: FeedKind, articles: &[Article], now: DateTime<Utc>) -> Vec<Star> {
        articles
            .iter()
            .map(|article| self.star_for(kind, article, now))
            .collect()
    }
}

/// Deterministic position inside the feed's volume, so a star keeps its
/// place across refreshes.
fn position_for(kind: FeedKind, identity: &str) -> [f64; 3] {
    let (extents, z_offset) = feed_volume(kind);
    let mut position = [0.0; 3];

    for (axis, slot) in position.iter_mut().enumerate() {
        let salted = format!("{}#{}", identity, axis);
        let unit = (string_hash(&salted) % 10_000) as f64 / 10_000.0;
        *slot = (unit - 0.5) * 2.0 * extents[axis];
    }
    position[2] += z_offset;

    position
}

/// Group articles by section; articles without one go under `"default"`.
pub fn group_by_section(articles: &[Article]) -> BTreeMap<String, Vec<&Article>> {
    let mut groups: BTreeMap<String, Vec<&Article>> = BTreeMap::new();
    for article in articles {
        let section = article
            .section
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("default");
        groups.entry(section.to_string()).or_default().push(article);
    }
    groups
}
