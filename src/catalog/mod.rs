//! Remote episode catalog access
//!
//! This module provides the raw structures a remote catalog hands back
//! (series candidates and episode pages) and the trait catalog backends
//! implement. [`CatalogClient`] layers best-match selection and paginated
//! episode retrieval on top of any [`CatalogProvider`].
mod client;
mod tvdb;
mod tvdb_types;

pub use client::{CatalogClient, EpisodeListing, select_best_match};
pub use tvdb::{TVDB_API_BASE, TvdbProvider};

use thiserror::Error;

/// Errors that can occur while talking to a remote catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog rejected our credentials
    ///
    /// `body` carries the provider's response verbatim; it frequently holds
    /// the only hint that a subscriber PIN is required.
    #[error(
        "Authentication failed: HTTP {status}\nResponse: {body}\n\nNote: Some TVDB API keys require a PIN. Check your API key settings at https://thetvdb.com/dashboard/account/apikeys"
    )]
    Authentication { status: u16, body: String },

    /// The request could not be sent or timed out
    #[error("Request failed: {0}")]
    Request(String),

    /// The catalog answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// The response body did not match the expected shape
    #[error("Failed to parse API response: {0}")]
    Parse(String),
}

/// A candidate series returned by a catalog search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesMatch {
    /// Opaque identifier the catalog uses for this series
    pub id: String,
    /// Display name, when the catalog provides one
    pub name: Option<String>,
    /// First-aired year, when known
    pub year: Option<i32>,
}

/// An episode as delivered by the catalog, before normalization
///
/// Every field is optional because catalogs routinely omit numbering for
/// unaired or special content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteEpisode {
    pub season_number: Option<i64>,
    pub episode_number: Option<i64>,
    pub title: Option<String>,
    pub air_date: Option<String>,
}

/// One page of a series' episode listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodePage {
    /// Episodes on this page
    pub episodes: Vec<RemoteEpisode>,
    /// Whether the catalog advertised a following page
    pub has_next: bool,
}

/// Trait for remote catalogs that can search series and list their episodes.
///
/// Implementors are authenticated sessions: construction performs any login
/// step, so every method here may assume valid credentials. Implementations
/// must be shareable across worker threads.
pub trait CatalogProvider: Send + Sync {
    /// Searches the catalog for series matching `query`.
    ///
    /// An empty result is a valid answer, not an error.
    fn search_series(&self, query: &str) -> Result<Vec<SeriesMatch>, CatalogError>;

    /// Fetches a single page (zero-based) of a series' episode listing.
    fn episodes_page(&self, series_id: &str, page: u32) -> Result<EpisodePage, CatalogError>;
}
