//! Catalog client with best-match resolution and paginated retrieval
//!
//! This module wraps a [`CatalogProvider`] with the policies the auditor
//! applies on top of raw catalog calls: picking one series out of several
//! search hits, and walking every episode page while tolerating failures.

use super::{CatalogProvider, RemoteEpisode, SeriesMatch};
use tracing::{debug, warn};

/// Everything retrieved for one series' episode listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeListing {
    /// Episodes from every page fetched successfully, in page order
    pub episodes: Vec<RemoteEpisode>,
    /// False if a page failed and the listing was cut short
    pub complete: bool,
}

/// A catalog session shared by all workers of a scan
///
/// The client holds no mutable state; every method takes `&self` and may be
/// called from many threads at once.
pub struct CatalogClient<P>
where
    P: CatalogProvider,
{
    /// The underlying catalog provider
    provider: P,
}

impl<P> CatalogClient<P>
where
    P: CatalogProvider,
{
    /// Creates a client around an authenticated provider
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    #[cfg(test)]
    pub(crate) fn provider(&self) -> &P {
        &self.provider
    }

    /// Resolves a show to a single catalog series
    ///
    /// Returns `None` when the catalog knows no such series. A failed search
    /// is logged and treated the same way, so one unreachable lookup never
    /// aborts a scan.
    pub fn resolve(&self, show_name: &str, show_year: Option<i32>) -> Option<SeriesMatch> {
        let candidates = match self.provider.search_series(show_name) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(show = show_name, error = %e, "catalog search failed");
                return None;
            }
        };

        debug!(
            show = show_name,
            candidates = candidates.len(),
            "catalog search finished"
        );
        select_best_match(candidates, show_year)
    }

    /// Fetches a series' full episode listing, page by page
    ///
    /// Pages are requested from zero upwards until the provider reports no
    /// further page or returns an empty batch. A failing page ends the walk:
    /// the episodes gathered so far are returned and the listing is flagged
    /// incomplete. Nothing is retried.
    pub fn fetch_episodes(&self, series_id: &str) -> EpisodeListing {
        let mut episodes = Vec::new();
        let mut page = 0u32;

        loop {
            let batch = match self.provider.episodes_page(series_id, page) {
                Ok(batch) => batch,
                Err(e) => {
                    warn!(
                        series_id,
                        page,
                        error = %e,
                        "failed to fetch episodes page, continuing with partial data"
                    );
                    return EpisodeListing {
                        episodes,
                        complete: false,
                    };
                }
            };

            if batch.episodes.is_empty() {
                break;
            }
            episodes.extend(batch.episodes);

            if !batch.has_next {
                break;
            }
            page += 1;
        }

        EpisodeListing {
            episodes,
            complete: true,
        }
    }
}

/// Picks one series out of a catalog's search results
///
/// With a known year, the first candidate whose year matches exactly wins.
/// Otherwise, or if no candidate matches the year, the first candidate is
/// used. Titles are not compared.
pub fn select_best_match(candidates: Vec<SeriesMatch>, year: Option<i32>) -> Option<SeriesMatch> {
    let index = year
        .and_then(|year| {
            candidates
                .iter()
                .position(|candidate| candidate.year == Some(year))
        })
        .unwrap_or(0);

    candidates.into_iter().nth(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogError, EpisodePage};
    use std::sync::Mutex;

    fn series(id: &str, year: Option<i32>) -> SeriesMatch {
        SeriesMatch {
            id: id.to_string(),
            name: None,
            year,
        }
    }

    fn episode(season: i64, number: i64) -> RemoteEpisode {
        RemoteEpisode {
            season_number: Some(season),
            episode_number: Some(number),
            title: Some(format!("S{season}E{number}")),
            air_date: None,
        }
    }

    /// Serves a fixed list of pages; `None` entries fail
    struct PagedCatalog {
        search: Option<Vec<SeriesMatch>>,
        pages: Vec<Option<Vec<RemoteEpisode>>>,
        requested: Mutex<Vec<u32>>,
    }

    impl PagedCatalog {
        fn with_pages(pages: Vec<Option<Vec<RemoteEpisode>>>) -> Self {
            Self {
                search: Some(Vec::new()),
                pages,
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    impl CatalogProvider for PagedCatalog {
        fn search_series(&self, _query: &str) -> Result<Vec<SeriesMatch>, CatalogError> {
            self.search
                .clone()
                .ok_or_else(|| CatalogError::Request("operation timed out".to_string()))
        }

        fn episodes_page(&self, _series_id: &str, page: u32) -> Result<EpisodePage, CatalogError> {
            self.requested.lock().unwrap().push(page);
            let index = page as usize;
            match self.pages.get(index) {
                Some(Some(episodes)) => Ok(EpisodePage {
                    episodes: episodes.clone(),
                    has_next: index + 1 < self.pages.len(),
                }),
                Some(None) => Err(CatalogError::Http {
                    status: 502,
                    url: format!("/series/1/episodes/default?page={page}"),
                }),
                None => Ok(EpisodePage::default()),
            }
        }
    }

    #[test]
    fn test_select_prefers_matching_year() {
        let candidates = vec![series("1", Some(2010)), series("2", Some(2015))];
        assert_eq!(
            select_best_match(candidates.clone(), Some(2015)).unwrap().id,
            "2"
        );
        assert_eq!(
            select_best_match(candidates.clone(), Some(1999)).unwrap().id,
            "1"
        );
        assert_eq!(select_best_match(candidates, None).unwrap().id, "1");
    }

    #[test]
    fn test_select_first_year_match_wins() {
        let candidates = vec![
            series("1", None),
            series("2", Some(2005)),
            series("3", Some(2005)),
        ];
        assert_eq!(select_best_match(candidates, Some(2005)).unwrap().id, "2");
    }

    #[test]
    fn test_select_without_candidates() {
        assert_eq!(select_best_match(Vec::new(), Some(2015)), None);
    }

    #[test]
    fn test_resolve_treats_search_failure_as_not_found() {
        let mut catalog = PagedCatalog::with_pages(Vec::new());
        catalog.search = None;
        let client = CatalogClient::new(catalog);

        assert_eq!(client.resolve("Firefly", Some(2002)), None);
    }

    #[test]
    fn test_resolve_single_result_ignores_year() {
        let mut catalog = PagedCatalog::with_pages(Vec::new());
        catalog.search = Some(vec![series("78874", Some(2002))]);
        let client = CatalogClient::new(catalog);

        assert_eq!(client.resolve("Firefly", Some(1999)).unwrap().id, "78874");
    }

    #[test]
    fn test_fetch_walks_all_pages() {
        let client = CatalogClient::new(PagedCatalog::with_pages(vec![
            Some(vec![episode(1, 1), episode(1, 2)]),
            Some(vec![episode(1, 3)]),
            Some(vec![episode(2, 1)]),
        ]));

        let listing = client.fetch_episodes("1");

        assert!(listing.complete);
        assert_eq!(listing.episodes.len(), 4);
        assert_eq!(*client.provider().requested.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_fetch_stops_at_failed_page() {
        let client = CatalogClient::new(PagedCatalog::with_pages(vec![
            Some(vec![episode(1, 1)]),
            Some(vec![episode(1, 2)]),
            None,
            Some(vec![episode(2, 1)]),
            Some(vec![episode(2, 2)]),
        ]));

        let listing = client.fetch_episodes("1");

        assert!(!listing.complete);
        assert_eq!(listing.episodes, vec![episode(1, 1), episode(1, 2)]);
        assert_eq!(*client.provider().requested.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_fetch_stops_at_empty_batch() {
        let client = CatalogClient::new(PagedCatalog::with_pages(vec![
            Some(vec![episode(1, 1)]),
            Some(Vec::new()),
            Some(vec![episode(1, 2)]),
        ]));

        let listing = client.fetch_episodes("1");

        assert!(listing.complete);
        assert_eq!(listing.episodes, vec![episode(1, 1)]);
    }

    #[test]
    fn test_fetch_first_page_failure_yields_nothing() {
        let client = CatalogClient::new(PagedCatalog::with_pages(vec![None]));

        let listing = client.fetch_episodes("1");

        assert!(!listing.complete);
        assert!(listing.episodes.is_empty());
    }
}
