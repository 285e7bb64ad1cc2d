/// Plex Media Server response types for deserialization.
///
/// Every Plex JSON response wraps its payload in a `MediaContainer`. Lists
/// are omitted entirely when empty, hence the `#[serde(default)]` throughout.
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct PlexResponse<T> {
    #[serde(rename = "MediaContainer")]
    pub media_container: T,
}

/// Container returned by `GET /library/sections`.
#[derive(Debug, Default, Deserialize)]
pub(super) struct PlexSectionContainer {
    #[serde(rename = "Directory", default)]
    pub directories: Vec<PlexSection>,
}

/// A library section (e.g. "TV Shows", "Movies").
#[derive(Debug, Deserialize)]
pub(super) struct PlexSection {
    pub key: String,
    pub title: String,
}

/// Container returned by section listings and `allLeaves`.
#[derive(Debug, Default, Deserialize)]
pub(super) struct PlexMetadataContainer {
    #[serde(rename = "Metadata", default)]
    pub metadata: Vec<PlexMetadata>,
}

/// A show, movie or episode entry.
#[derive(Debug, Deserialize)]
pub(super) struct PlexMetadata {
    #[serde(rename = "ratingKey")]
    pub rating_key: Option<String>,
    pub title: Option<String>,
    pub year: Option<i32>,
    /// Season number for episodes
    #[serde(rename = "parentIndex")]
    pub parent_index: Option<i64>,
    /// Episode number for episodes
    pub index: Option<i64>,
    #[serde(rename = "Media", default)]
    pub media: Vec<PlexMedia>,
}

/// One media version of an item.
#[derive(Debug, Deserialize)]
pub(super) struct PlexMedia {
    #[serde(rename = "Part", default)]
    pub parts: Vec<PlexPart>,
}

/// One file backing a media version.
#[derive(Debug, Deserialize)]
pub(super) struct PlexPart {
    pub file: Option<String>,
}
