//! Library scanning
//!
//! Checks every show of a library section against the catalog on a bounded
//! pool of worker threads and assembles the missing-episode report.

use crate::catalog::{CatalogClient, CatalogProvider};
use crate::inventory::{MissingTable, diff, normalize_local, normalize_remote};
use crate::library::{LibraryProvider, Show};
use crate::report::Report;
use crate::{AuditError, ProgressEvent};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// Default number of shows checked concurrently
///
/// This bounds the number of catalog requests in flight at once and keeps
/// the scan below the catalog's rate limits.
pub const DEFAULT_WORKERS: usize = 10;

/// Default name of the library section holding TV shows
pub const DEFAULT_TV_SECTION: &str = "TV Shows";

/// Parameters of a library scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Library section to enumerate
    pub section: String,
    /// Maximum number of shows checked at the same time (at least 1)
    pub workers: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            section: DEFAULT_TV_SECTION.to_string(),
            workers: DEFAULT_WORKERS,
        }
    }
}

/// How checking a single show turned out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowStatus {
    /// The catalog has no series matching the show
    NotFound,
    /// The library could not list the show's episodes
    LibraryReadFailed,
    /// Every catalog episode is present locally
    Complete {
        /// The catalog listing was cut short by a failed page
        partial: bool,
    },
    /// Some catalog episodes are absent locally
    Missing {
        count: usize,
        /// The catalog listing was cut short by a failed page
        partial: bool,
    },
}

/// Result of checking one show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowResult {
    pub show_name: String,
    pub status: ShowStatus,
    /// Missing episodes; `None` when nothing is missing or nothing could be
    /// compared
    pub missing: Option<MissingTable>,
}

impl ShowResult {
    fn without_gaps(show: &Show, status: ShowStatus) -> Self {
        Self {
            show_name: show.name.clone(),
            status,
            missing: None,
        }
    }
}

/// Checks a single show for missing episodes
///
/// Reads the show's local episodes, resolves it in the catalog, fetches the
/// catalog's episode listing and diffs the two. Every failure along the way
/// is logged and turned into a [`ShowStatus`]; this function never fails.
pub fn check_show<L, P>(library: &L, catalog: &CatalogClient<P>, show: &Show) -> ShowResult
where
    L: LibraryProvider + ?Sized,
    P: CatalogProvider,
{
    let local_episodes = match library.list_episodes(show) {
        Ok(episodes) => episodes,
        Err(e) => {
            warn!(show = %show.name, error = %e, "failed to list local episodes");
            return ShowResult::without_gaps(show, ShowStatus::LibraryReadFailed);
        }
    };
    let local = normalize_local(&local_episodes);

    let Some(series) = catalog.resolve(&show.name, show.year) else {
        debug!(show = %show.name, "no catalog match");
        return ShowResult::without_gaps(show, ShowStatus::NotFound);
    };
    debug!(
        show = %show.name,
        series_id = %series.id,
        series_name = series.name.as_deref().unwrap_or_default(),
        "resolved show"
    );

    let listing = catalog.fetch_episodes(&series.id);
    let partial = !listing.complete;
    let remote = normalize_remote(listing.episodes);

    let missing = diff(&local, &remote);
    if missing.is_empty() {
        return ShowResult::without_gaps(show, ShowStatus::Complete { partial });
    }

    ShowResult {
        show_name: show.name.clone(),
        status: ShowStatus::Missing {
            count: missing.episode_count(),
            partial,
        },
        missing: Some(missing),
    }
}

/// Scans a library section and reports every missing episode
///
/// Shows are checked on a pool of `options.workers` threads, so at most that
/// many shows talk to the catalog at once. Results are collected as shows
/// finish; the call returns only after every show has been checked. The
/// resulting report is ordered independently of completion order.
///
/// Progress events are delivered through `progress_callback`. Per-show
/// events arrive in completion order, one at a time.
///
/// # Errors
///
/// Fails only if the section cannot be listed or the worker pool cannot be
/// started. Problems with individual shows are reported as progress events.
pub fn find_missing_episodes<L, P, F>(
    library: &L,
    catalog: &CatalogClient<P>,
    options: &ScanOptions,
    mut progress_callback: F,
) -> Result<Report, AuditError>
where
    L: LibraryProvider + ?Sized,
    P: CatalogProvider,
    F: FnMut(ProgressEvent) + Send,
{
    progress_callback(ProgressEvent::FetchingShows {
        section: options.section.clone(),
    });
    let shows = library.list_shows(&options.section)?;
    let total = shows.len();
    progress_callback(ProgressEvent::ShowsFound { count: total });

    let workers = options.workers.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|index| format!("audit-worker-{index}"))
        .build()?;
    progress_callback(ProgressEvent::CheckingShows { workers });

    let progress = Mutex::new(progress_callback);
    let collected: Mutex<BTreeMap<(String, usize), MissingTable>> = Mutex::new(BTreeMap::new());

    pool.scope(|scope| {
        for (index, show) in shows.iter().enumerate() {
            let progress = &progress;
            let collected = &collected;

            scope.spawn(move |_| {
                let result = check_show(library, catalog, show);

                {
                    let mut callback = progress.lock().unwrap_or_else(PoisonError::into_inner);
                    callback(ProgressEvent::ShowChecked {
                        index,
                        total,
                        show_name: result.show_name.clone(),
                        status: result.status,
                    });
                }

                if let Some(missing) = result.missing {
                    collected
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .insert((result.show_name, index), missing);
                }
            });
        }
    });

    let mut progress_callback = progress.into_inner().unwrap_or_else(PoisonError::into_inner);
    let collected = collected
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);
    let report = Report::from_missing(total, collected);

    progress_callback(ProgressEvent::Complete {
        shows_checked: report.shows_checked(),
        shows_with_missing: report.shows_with_missing(),
        missing_episodes: report.total_missing(),
    });

    Ok(report)
}
