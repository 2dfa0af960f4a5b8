use chrono::{DateTime, Utc};

use crate::domain::Article;

pub const MIN_SIZE: f64 = 0.5;
pub const MAX_SIZE: f64 = 3.0;
pub const OUTERMOST_ORBIT: u8 = 5;

/// Exclusive upper bounds, in hours, of orbits 0 through 4.
const ORBIT_BOUNDS_HOURS: [f64; 5] = [1.0, 3.0, 6.0, 12.0, 24.0];

/// Star size from keyword count and engagement counters, clamped to
/// `[MIN_SIZE, MAX_SIZE]`.
pub fn size_for(article: &Article) -> f64 {
    let mut size = 1.0;

    size += (article.keywords.len() as f64 * 0.1).min(0.5);

    if let Some(counts) = &article.counts {
        size += log_weight(counts.views) * 0.2;
        size += log_weight(counts.shares) * 0.3;
    }

    size.clamp(MIN_SIZE, MAX_SIZE)
}

/// log10 of a counter; missing, non-positive and non-finite counters weigh 0
fn log_weight(counter: Option<f64>) -> f64 {
    match counter {
        Some(value) if value.is_finite() && value > 0.0 => value.log10(),
        _ => 0.0,
    }
}

/// Orbit index by age: 0 is under an hour old, 5 is a day or older.
/// Undated articles sit on the outermost orbit.
pub fn freshness_bucket(article: &Article, now: DateTime<Utc>) -> u8 {
    let Some(published) = article.published else {
        return OUTERMOST_ORBIT;
    };

    let hours = (now - published).num_milliseconds() as f64 / 3_600_000.0;

    ORBIT_BOUNDS_HOURS
        .iter()
        .position(|bound| hours < *bound)
        .map(|bucket| bucket as u8)
        .unwrap_or(OUTERMOST_ORBIT)
}

/// Angular speed per frame; inner orbits move faster.
pub fn orbit_speed(bucket: u8) -> f64 {
    match bucket {
        0 => 0.01,
        1 => 0.008,
        2 => 0.006,
        3 => 0.004,
        4 => 0.002,
        5 => 0.001,
        _ => 0.005,
    }
}
