use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementCounts {
    pub views: Option<f64>,
    pub shares: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub format: String,
    pub url: String,
    pub caption: Option<String>,
}

/// A news article normalized from any of the upstream response shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub uri: Option<String>,
    pub url: Option<String>,
    pub id: Option<String>,
    pub title: String,
    pub section: Option<String>,
    pub subsection: Option<String>,
    pub byline: Option<String>,
    pub summary: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub keywords: Vec<String>,
    pub counts: Option<EngagementCounts>,
    pub media: Vec<Media>,
}

impl Article {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            uri: None,
            url: None,
            id: None,
            title: title.into(),
            section: None,
            subsection: None,
            byline: None,
            summary: None,
            published: None,
            keywords: Vec::new(),
            counts: None,
            media: Vec::new(),
        }
    }

    /// Key used to recognise the same article across fetches.
    ///
    /// The first non-empty of uri, url and id; otherwise the serialized
    /// record, so two records without any of those collapse when identical.
    pub fn identity_key(&self) -> String {
        [&self.uri, &self.url, &self.id]
            .into_iter()
            .flatten()
            .find(|value| !value.is_empty())
            .cloned()
            .unwrap_or_else(|| serde_json::to_string(self).unwrap_or_else(|_| self.title.clone()))
    }

    /// Lowercased section name, if any
    pub fn normalized_section(&self) -> Option<String> {
        self.section
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
    }

    /// Whether the article was published on or after local midnight of `now`'s day.
    pub fn published_on_day_of(&self, now: DateTime<Local>) -> bool {
        let Some(published) = self.published else {
            return false;
        };
        let midnight = now.date_naive().and_time(NaiveTime::MIN);
        match Local.from_local_datetime(&midnight).earliest() {
            Some(start) => published >= start.with_timezone(&Utc),
            None => false,
        }
    }

    /// First image attachment, preferring the larger renditions
    pub fn lead_image(&self) -> Option<&Media> {
        const PREFERRED: &[&str] = &["superJumbo", "mediumThreeByTwo440", "Large Thumbnail"];
        PREFERRED
            .iter()
            .find_map(|format| self.media.iter().find(|m| m.format == *format))
            .or_else(|| self.media.first())
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn with_published(mut self, published: Option<DateTime<Utc>>) -> Self {
        self.published = published;
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_counts(mut self, counts: Option<EngagementCounts>) -> Self {
        self.counts = counts;
        self
    }

    pub fn with_media(mut self, media: Vec<Media>) -> Self {
        self.media = media;
        self
    }
}

/// Parse the timestamp formats used across the NYT APIs.
///
/// Newswire sends RFC 3339, article search sends `+0000` offsets and the
/// most-popular API sends bare dates (taken as UTC midnight).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}
