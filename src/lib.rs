//! Episode Auditor - find the gaps in a media library
//!
//! This library compares the TV shows held by a Plex Media Server against
//! TheTVDB and reports every aired episode the library lacks. It also finds
//! movies stored more than once.

mod catalog;
mod config;
mod duplicates;
mod inventory;
mod library;
mod range_format;
mod report;
mod scanner;

use thiserror::Error;

// Re-export error types
pub use catalog::CatalogError;
pub use config::ConfigError;
pub use library::LibraryError;
pub use report::ReportError;

pub use catalog::{
    CatalogClient, CatalogProvider, EpisodeListing, EpisodePage, RemoteEpisode, SeriesMatch,
    TVDB_API_BASE, TvdbProvider, select_best_match,
};
pub use config::{
    CatalogSettings, ConfigFile, ConfigOverrides, DEFAULT_MOVIE_SECTION, DEFAULT_TIMEOUT,
    LibrarySettings, Settings,
};
pub use duplicates::find_duplicates;
pub use inventory::{
    EpisodeDetails, LocalInventory, MissingTable, RemoteInventory, UNKNOWN_TITLE, diff,
    normalize_local, normalize_remote,
};
pub use library::{LibraryProvider, LocalEpisode, Movie, PlexLibrary, Show};
pub use range_format::format_episode_ranges;
pub use report::{REPORT_HEADER, Report, ReportRow, SeasonSummary};
pub use scanner::{
    DEFAULT_TV_SECTION, DEFAULT_WORKERS, ScanOptions, ShowResult, ShowStatus, check_show,
    find_missing_episodes,
};

/// Progress event emitted during an audit
///
/// These events allow library users to track progress and provide feedback
/// while shows are being checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Logging in to the remote catalog
    AuthenticatingCatalog,

    /// Listing the shows of a library section
    FetchingShows { section: String },

    /// Shows found in the section
    ShowsFound { count: usize },

    /// Shows are now being checked concurrently
    CheckingShows { workers: usize },

    /// A single show has been checked
    ///
    /// `index` is the show's zero-based position in the library listing;
    /// events arrive in completion order, not in index order.
    ShowChecked {
        index: usize,
        total: usize,
        show_name: String,
        status: ShowStatus,
    },

    /// Every show has been checked
    Complete {
        shows_checked: usize,
        shows_with_missing: usize,
        missing_episodes: usize,
    },
}

/// Top-level error type for audit operations
#[derive(Debug, Error)]
pub enum AuditError {
    /// Error while resolving configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error while talking to the remote catalog
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Error while reading the local library
    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    /// Error while writing the report
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// The worker pool could not be started
    #[error("Failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Audits the configured library for missing episodes
///
/// Authenticates with TheTVDB, then checks every show of the configured
/// TV section against it. Catalog credentials are validated before any
/// network request is made.
///
/// Progress events are emitted through the provided callback, allowing
/// callers to display status or remain silent.
///
/// # Errors
///
/// Fails if catalog credentials are missing, if TheTVDB rejects them, or if
/// the library section cannot be listed. Problems with individual shows never
/// fail the audit.
///
/// # Examples
///
/// ```no_run
/// use episode_auditor::{ConfigFile, ConfigOverrides, Settings, audit_missing_episodes};
///
/// let settings = Settings::resolve(ConfigOverrides::default(), ConfigFile::load_default()?)?;
/// let report = audit_missing_episodes(&settings, |_| {})?;
/// report.write_csv(std::io::stdout())?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn audit_missing_episodes<F>(
    settings: &Settings,
    mut progress_callback: F,
) -> Result<Report, AuditError>
where
    F: FnMut(ProgressEvent) + Send,
{
    let credentials = settings.catalog()?;
    let library = plex_library(settings)?;

    progress_callback(ProgressEvent::AuthenticatingCatalog);
    let provider = TvdbProvider::login(
        &credentials.api_key,
        credentials.pin.as_deref(),
        settings.timeout,
    )?;
    let catalog = CatalogClient::new(provider);

    let options = ScanOptions {
        section: settings.tv_section.clone(),
        workers: settings.workers,
    };
    find_missing_episodes(&library, &catalog, &options, progress_callback)
}

/// Lists movies of the configured movie section stored in more than one file
pub fn audit_duplicate_movies(settings: &Settings) -> Result<Vec<Movie>, AuditError> {
    let library = plex_library(settings)?;
    let movies = library.list_movies(&settings.movie_section)?;
    Ok(find_duplicates(movies))
}

fn plex_library(settings: &Settings) -> Result<PlexLibrary, LibraryError> {
    PlexLibrary::new(
        &settings.library.url,
        &settings.library.token,
        settings.timeout,
    )
}
