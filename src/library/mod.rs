//! Local media library access
//!
//! This module provides the structures describing what a media server holds
//! (shows, their episodes, movies and their files) and the trait library
//! backends implement.
mod plex;
mod plex_types;

pub use plex::PlexLibrary;

use thiserror::Error;

/// Errors that can occur while reading the local library
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The request could not be sent or timed out
    #[error("Request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// The response body did not match the expected shape
    #[error("Failed to parse library response: {0}")]
    Parse(String),

    /// No library section carries the requested title
    #[error("Library section not found: {0}")]
    SectionNotFound(String),
}

/// A television show held in the local library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Show {
    /// Provider-specific key used to list the show's episodes
    pub key: String,
    /// Display name
    pub name: String,
    /// Release year, when known
    pub year: Option<i32>,
}

/// An episode file as the library reports it, before normalization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalEpisode {
    pub season_number: Option<i64>,
    pub episode_number: Option<i64>,
}

/// A movie held in the local library together with its media files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    pub title: String,
    pub year: Option<i32>,
    /// Number of media parts the server holds for this movie
    pub parts: usize,
    /// Paths of those parts; parts the server reports without a path are
    /// counted but not listed
    pub files: Vec<String>,
}

/// Trait for local libraries that can enumerate shows, episodes and movies.
pub trait LibraryProvider: Send + Sync {
    /// Lists every show in the named library section.
    fn list_shows(&self, section: &str) -> Result<Vec<Show>, LibraryError>;

    /// Lists every episode the library holds for `show`.
    fn list_episodes(&self, show: &Show) -> Result<Vec<LocalEpisode>, LibraryError>;

    /// Lists every movie in the named library section.
    fn list_movies(&self, section: &str) -> Result<Vec<Movie>, LibraryError>;
}
