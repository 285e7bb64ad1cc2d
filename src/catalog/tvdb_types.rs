/// TheTVDB v4 API response types for deserialization.
///
/// These structures mirror the JSON response format of the endpoints the
/// auditor uses. Fields the auditor never reads are left out.
use serde::{Deserialize, Serialize};

/// Request body for `POST /login`.
#[derive(Debug, Serialize)]
pub(super) struct TvdbLoginRequest<'a> {
    pub apikey: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<&'a str>,
}

/// Response of `POST /login`.
#[derive(Debug, Deserialize)]
pub(super) struct TvdbLoginResponse {
    pub data: TvdbLoginData,
}

#[derive(Debug, Deserialize)]
pub(super) struct TvdbLoginData {
    pub token: String,
}

/// Response of `GET /search`.
#[derive(Debug, Deserialize)]
pub(super) struct TvdbSearchResponse {
    /// Absent or null when nothing matched
    #[serde(default)]
    pub data: Option<Vec<TvdbSearchResult>>,
}

/// A single search hit.
#[derive(Debug, Deserialize)]
pub(super) struct TvdbSearchResult {
    /// Numeric series id, delivered as a string
    pub tvdb_id: String,
    pub name: Option<String>,
    /// First-aired year; the API has shipped this both as a string and as a
    /// number
    #[serde(default)]
    pub year: Option<serde_json::Value>,
}

impl TvdbSearchResult {
    /// Returns the year as a number, if it is present and parseable
    pub fn parsed_year(&self) -> Option<i32> {
        match self.year.as_ref()? {
            serde_json::Value::String(year) => year.trim().parse().ok(),
            serde_json::Value::Number(year) => year.as_i64().and_then(|y| i32::try_from(y).ok()),
            _ => None,
        }
    }
}

/// Response of `GET /series/{id}/episodes/default`.
#[derive(Debug, Deserialize)]
pub(super) struct TvdbEpisodesResponse {
    #[serde(default)]
    pub data: Option<TvdbEpisodesData>,
    #[serde(default)]
    pub links: Option<TvdbLinks>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TvdbEpisodesData {
    #[serde(default)]
    pub episodes: Option<Vec<TvdbEpisode>>,
}

/// Pagination links; `next` is null on the last page.
#[derive(Debug, Deserialize)]
pub(super) struct TvdbLinks {
    #[serde(default)]
    pub next: Option<serde_json::Value>,
}

/// A single episode record.
#[derive(Debug, Deserialize)]
pub(super) struct TvdbEpisode {
    /// Season number (0 for specials)
    #[serde(rename = "seasonNumber")]
    pub season_number: Option<i64>,
    /// Episode number within the season
    pub number: Option<i64>,
    /// Episode title (may be null for unnamed episodes)
    pub name: Option<String>,
    /// Air date as `YYYY-MM-DD` (may be null)
    pub aired: Option<String>,
}
