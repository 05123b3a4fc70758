use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Year used when a search does not specify a start year.
pub const DEFAULT_YEAR_START: i32 = 1900;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Audio,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for MediaType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            "audio" => Ok(MediaType::Audio),
            other => Err(anyhow::anyhow!("unknown media type `{}` (expected image, video, audio)", other)),
        }
    }
}

/// One search as submitted by the form. Replaced wholesale on every submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchParams {
    pub keywords: String,
    pub media_type: MediaType,
    pub year_start: i32,
}

impl SearchParams {
    pub fn new(keywords: impl Into<String>, media_type: MediaType, year_start: Option<i32>) -> Self {
        Self { keywords: keywords.into(), media_type, year_start: year_start.unwrap_or(DEFAULT_YEAR_START) }
    }

    /// Cache key for this exact value. Keywords are kept verbatim.
    pub fn cache_key(&self) -> String {
        format!("search|{}|{}|{}", self.media_type, self.year_start, self.keywords)
    }
}

// --- Archive response shape ---
//
// Field types are lenient: anything that is not the expected JSON type decodes
// as `None`, so malformed link data degrades to "preview unavailable" instead of
// rejecting the whole response. Structural checks live in `validate`.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub collection: Collection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub items: Vec<ResultItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub href: Option<String>,
    #[serde(deserialize_with = "first_record")]
    pub data: Vec<ItemMetadata>,
    #[serde(default, deserialize_with = "lenient_links")]
    pub links: Option<Vec<LinkRef>>,
}

impl ResultItem {
    /// First metadata record. Only that one is kept when decoding.
    pub fn metadata(&self) -> Option<&ItemMetadata> { self.data.first() }

    pub fn title(&self) -> &str { self.metadata().map(|m| m.title.as_str()).unwrap_or_default() }

    pub fn media_type(&self) -> Option<MediaType> { self.metadata().and_then(|m| m.media_type()) }

    pub fn description(&self) -> Option<&str> { self.metadata().and_then(|m| m.description.as_deref()) }

    pub fn links(&self) -> &[LinkRef] { self.links.as_deref().unwrap_or_default() }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, rename = "media_type", deserialize_with = "lenient_string")]
    pub media_type_raw: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub nasa_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date_created: Option<String>,
}

impl ItemMetadata {
    pub fn media_type(&self) -> Option<MediaType> {
        self.media_type_raw.as_deref().and_then(|s| s.parse().ok())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkRef {
    #[serde(default, deserialize_with = "lenient_string")]
    pub href: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rel: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub render: Option<String>,
}

impl LinkRef {
    /// Non-empty href, if any.
    pub fn url(&self) -> Option<&str> { self.href.as_deref().filter(|h| !h.is_empty()) }
}

fn lenient_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where D: Deserializer<'de> {
    let v = Option::<serde_json::Value>::deserialize(d)?;
    Ok(v.and_then(|v| v.as_str().map(str::to_owned)))
}

// Non-object entries keep their slot as an empty link so `links[0]` keeps its meaning.
fn lenient_links<'de, D>(d: D) -> Result<Option<Vec<LinkRef>>, D::Error>
where D: Deserializer<'de> {
    let v = Option::<serde_json::Value>::deserialize(d)?;
    Ok(match v {
        Some(serde_json::Value::Array(list)) => Some(
            list.into_iter().map(|l| serde_json::from_value::<LinkRef>(l).unwrap_or_default()).collect(),
        ),
        _ => None,
    })
}

// Only `data[0]` is read, so later records may be anything.
fn first_record<'de, D>(d: D) -> Result<Vec<ItemMetadata>, D::Error>
where D: Deserializer<'de> {
    let list = Vec::<serde_json::Value>::deserialize(d)?;
    match list.into_iter().next() {
        Some(first) => Ok(vec![serde_json::from_value(first).map_err(serde::de::Error::custom)?]),
        None => Ok(Vec::new()),
    }
}
