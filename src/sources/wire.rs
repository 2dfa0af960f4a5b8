//! Upstream JSON shapes and their conversion into [`Article`].
//!
//! The envelope fields are required; a response without them is rejected as
//! malformed. Inside a record only the title is required, everything else
//! tolerates null, missing or the empty-string placeholders the APIs send
//! for empty lists.

use serde::de::{Deserializer, IgnoredAny};
use serde::Deserialize;

use crate::domain::{parse_timestamp, Article, EngagementCounts, Media};
use crate::errors::{ApiError, ApiResult};

const WEB_ROOT: &str = "https://www.nytimes.com/";

#[derive(Debug, Deserialize)]
struct ResultsEnvelope {
    results: Vec<StreamRecord>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    response: SearchResponse,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    docs: Vec<SearchDoc>,
}

/// Record shared by the newswire and most-popular APIs
#[derive(Debug, Deserialize)]
struct StreamRecord {
    title: String,
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    id: Option<String>,
    #[serde(default)]
    section: Option<String>,
    #[serde(default)]
    subsection: Option<String>,
    #[serde(default)]
    byline: Option<String>,
    #[serde(default, rename = "abstract")]
    summary: Option<String>,
    #[serde(default)]
    published_date: Option<String>,
    #[serde(default)]
    pub_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    des_facet: Vec<String>,
    #[serde(default)]
    counts: Option<CountsRecord>,
    #[serde(default, deserialize_with = "lenient_list")]
    multimedia: Vec<MultimediaRecord>,
    #[serde(default, deserialize_with = "lenient_list")]
    media: Vec<PopularMediaRecord>,
}

#[derive(Debug, Deserialize)]
struct CountsRecord {
    #[serde(default)]
    views: Option<f64>,
    #[serde(default)]
    shares: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MultimediaRecord {
    url: String,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    crop_name: Option<String>,
    #[serde(default)]
    caption: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PopularMediaRecord {
    #[serde(default)]
    caption: Option<String>,
    #[serde(default, rename = "media-metadata", deserialize_with = "lenient_list")]
    metadata: Vec<MediaMetadataRecord>,
}

#[derive(Debug, Deserialize)]
struct MediaMetadataRecord {
    url: String,
    #[serde(default)]
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    headline: Headline,
    #[serde(default, rename = "_id")]
    id: Option<String>,
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    web_url: Option<String>,
    #[serde(default)]
    section_name: Option<String>,
    #[serde(default)]
    subsection_name: Option<String>,
    #[serde(default)]
    byline: Option<SearchByline>,
    #[serde(default, rename = "abstract")]
    summary: Option<String>,
    #[serde(default)]
    pub_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    keywords: Vec<Keyword>,
    #[serde(default, deserialize_with = "lenient_list")]
    multimedia: Vec<MultimediaRecord>,
}

#[derive(Debug, Deserialize)]
struct Headline {
    main: String,
}

#[derive(Debug, Deserialize)]
struct SearchByline {
    #[serde(default)]
    original: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Keyword {
    value: String,
}

/// Parse a `{ "results": [...] }` body.
pub fn parse_results(api: &'static str, body: &str) -> ApiResult<Vec<Article>> {
    let envelope: ResultsEnvelope =
        serde_json::from_str(body).map_err(|e| ApiError::malformed(api, e.to_string()))?;
    Ok(envelope.results.into_iter().map(Article::from).collect())
}

/// Parse a `{ "response": { "docs": [...] } }` body.
pub fn parse_search(api: &'static str, body: &str) -> ApiResult<Vec<Article>> {
    let envelope: SearchEnvelope =
        serde_json::from_str(body).map_err(|e| ApiError::malformed(api, e.to_string()))?;
    Ok(envelope.response.docs.into_iter().map(Article::from).collect())
}

impl From<StreamRecord> for Article {
    fn from(record: StreamRecord) -> Self {
        let published = record
            .published_date
            .as_deref()
            .or(record.pub_date.as_deref())
            .and_then(parse_timestamp);

        let mut media: Vec<Media> = record.multimedia.into_iter().map(Media::from).collect();
        for item in record.media {
            media.extend(item.metadata.into_iter().map(|meta| Media {
                format: meta.format.unwrap_or_default(),
                url: meta.url,
                caption: item.caption.clone().filter(|c| !c.is_empty()),
            }));
        }

        Article {
            uri: record.uri,
            url: record.url,
            id: record.id,
            title: record.title,
            section: record.section,
            subsection: record.subsection.filter(|s| !s.is_empty()),
            byline: record.byline.filter(|s| !s.is_empty()),
            summary: record.summary.filter(|s| !s.is_empty()),
            published,
            keywords: record.des_facet,
            counts: record.counts.map(|c| EngagementCounts {
                views: c.views,
                shares: c.shares,
            }),
            media,
        }
    }
}

impl From<SearchDoc> for Article {
    fn from(doc: SearchDoc) -> Self {
        Article {
            uri: doc.uri,
            url: doc.web_url,
            id: doc.id,
            title: doc.headline.main,
            section: doc.section_name,
            subsection: doc.subsection_name.filter(|s| !s.is_empty()),
            byline: doc
                .byline
                .and_then(|b| b.original)
                .filter(|s| !s.is_empty()),
            summary: doc.summary.filter(|s| !s.is_empty()),
            published: doc.pub_date.as_deref().and_then(parse_timestamp),
            keywords: doc.keywords.into_iter().map(|k| k.value).collect(),
            counts: None,
            media: doc.multimedia.into_iter().map(Media::from).collect(),
        }
    }
}

impl From<MultimediaRecord> for Media {
    fn from(record: MultimediaRecord) -> Self {
        let url = if record.url.starts_with("http") {
            record.url
        } else {
            format!("{}{}", WEB_ROOT, record.url.trim_start_matches('/'))
        };

        Media {
            format: record
                .format
                .or(record.subtype)
                .or(record.crop_name)
                .unwrap_or_default(),
            url,
            caption: record.caption.filter(|c| !c.is_empty()),
        }
    }
}

/// Lists the APIs may send as `""` or `null` when empty
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient<T> {
        List(Vec<T>),
        Other(IgnoredAny),
    }

    Ok(match Lenient::<T>::deserialize(deserializer)? {
        Lenient::List(items) => items,
        Lenient::Other(_) => Vec::new(),
    })
}

/// Ids arrive as numbers from most-popular and as strings elsewhere
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
