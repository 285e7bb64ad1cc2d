//! Episode inventories and gap calculation
//!
//! Both sides of a comparison are normalized into per-season structures
//! keyed by season number, then diffed. Season zero (specials) and entries
//! lacking a season or episode number never make it into an inventory.

use crate::catalog::RemoteEpisode;
use crate::library::LocalEpisode;
use std::collections::{BTreeMap, BTreeSet};

/// Title used when the catalog has no name for an episode
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Catalog metadata kept for each remote episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeDetails {
    pub title: String,
    /// Air date as the catalog formats it, empty when unknown
    pub air_date: String,
}

/// Episodes held locally: season number to episode numbers
pub type LocalInventory = BTreeMap<u32, BTreeSet<u32>>;

/// Episodes known to the catalog: season number to episode number to details
pub type RemoteInventory = BTreeMap<u32, BTreeMap<u32, EpisodeDetails>>;

/// Catalog episodes absent from the local library, grouped by season
///
/// A table never contains a season without episodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingTable {
    seasons: BTreeMap<u32, BTreeMap<u32, EpisodeDetails>>,
}

impl MissingTable {
    /// Returns true if no episode is missing
    pub fn is_empty(&self) -> bool {
        self.seasons.is_empty()
    }

    /// Total number of missing episodes across all seasons
    pub fn episode_count(&self) -> usize {
        self.seasons.values().map(BTreeMap::len).sum()
    }

    /// Iterates seasons in ascending order
    pub fn seasons(&self) -> impl Iterator<Item = (u32, &BTreeMap<u32, EpisodeDetails>)> {
        self.seasons.iter().map(|(season, episodes)| (*season, episodes))
    }

    /// Missing episodes of one season, if any
    pub fn season(&self, season: u32) -> Option<&BTreeMap<u32, EpisodeDetails>> {
        self.seasons.get(&season)
    }

    fn insert(&mut self, season: u32, episode: u32, details: EpisodeDetails) {
        self.seasons.entry(season).or_default().insert(episode, details);
    }
}

/// Validates a raw season/episode pair
///
/// Both numbers must be present and positive; anything else is either a
/// special or unnumbered content.
fn episode_key(season: Option<i64>, episode: Option<i64>) -> Option<(u32, u32)> {
    let season = u32::try_from(season?).ok().filter(|&s| s > 0)?;
    let episode = u32::try_from(episode?).ok().filter(|&e| e > 0)?;
    Some((season, episode))
}

/// Groups the library's episodes into per-season sets
pub fn normalize_local(episodes: &[LocalEpisode]) -> LocalInventory {
    let mut inventory = LocalInventory::new();

    for episode in episodes {
        if let Some((season, number)) = episode_key(episode.season_number, episode.episode_number)
        {
            inventory.entry(season).or_default().insert(number);
        }
    }

    inventory
}

/// Groups the catalog's episodes into per-season maps
///
/// When the same season/episode pair appears more than once, the later entry
/// wins. A missing title becomes [`UNKNOWN_TITLE`], a missing air date an
/// empty string.
pub fn normalize_remote(episodes: Vec<RemoteEpisode>) -> RemoteInventory {
    let mut inventory = RemoteInventory::new();

    for episode in episodes {
        let Some((season, number)) = episode_key(episode.season_number, episode.episode_number)
        else {
            continue;
        };

        let details = EpisodeDetails {
            title: episode.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            air_date: episode.air_date.unwrap_or_default(),
        };
        inventory.entry(season).or_default().insert(number, details);
    }

    inventory
}

/// Computes which catalog episodes the library lacks
///
/// Seasons absent locally count as empty. Local-only seasons or episodes are
/// ignored.
pub fn diff(local: &LocalInventory, remote: &RemoteInventory) -> MissingTable {
    let mut missing = MissingTable::default();

    for (season, episodes) in remote {
        let held = local.get(season);

        for (number, details) in episodes {
            if !held.is_some_and(|held| held.contains(number)) {
                missing.insert(*season, *number, details.clone());
            }
        }
    }

    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(season: Option<i64>, episode: Option<i64>) -> LocalEpisode {
        LocalEpisode {
            season_number: season,
            episode_number: episode,
        }
    }

    fn remote(season: i64, episode: i64, title: &str) -> RemoteEpisode {
        RemoteEpisode {
            season_number: Some(season),
            episode_number: Some(episode),
            title: Some(title.to_string()),
            air_date: Some(format!("2010-01-{episode:02}")),
        }
    }

    fn details(title: &str) -> EpisodeDetails {
        EpisodeDetails {
            title: title.to_string(),
            air_date: String::new(),
        }
    }

    #[test]
    fn test_normalize_local_drops_unnumbered_and_specials() {
        let inventory = normalize_local(&[
            local(Some(1), Some(1)),
            local(Some(1), Some(2)),
            local(Some(1), Some(2)),
            local(Some(2), Some(5)),
            local(None, Some(3)),
            local(Some(3), None),
            local(Some(0), Some(1)),
            local(Some(-1), Some(1)),
        ]);

        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory[&1], BTreeSet::from([1, 2]));
        assert_eq!(inventory[&2], BTreeSet::from([5]));
    }

    #[test]
    fn test_normalize_remote_last_entry_wins() {
        let inventory = normalize_remote(vec![remote(1, 1, "A"), remote(1, 1, "B")]);

        assert_eq!(inventory[&1].len(), 1);
        assert_eq!(inventory[&1][&1].title, "B");
    }

    #[test]
    fn test_normalize_remote_defaults() {
        let inventory = normalize_remote(vec![
            RemoteEpisode {
                season_number: Some(2),
                episode_number: Some(4),
                title: None,
                air_date: None,
            },
            RemoteEpisode {
                season_number: Some(0),
                episode_number: Some(1),
                title: Some("Special".to_string()),
                air_date: None,
            },
            RemoteEpisode {
                season_number: Some(1),
                episode_number: None,
                ..Default::default()
            },
        ]);

        assert_eq!(inventory.len(), 1);
        assert_eq!(
            inventory[&2][&4],
            EpisodeDetails {
                title: UNKNOWN_TITLE.to_string(),
                air_date: String::new(),
            }
        );
    }

    #[test]
    fn test_diff_reports_absent_episodes_and_seasons() {
        let local = LocalInventory::from([(1, BTreeSet::from([1, 2]))]);
        let remote = RemoteInventory::from([
            (
                1,
                BTreeMap::from([(1, details("a")), (2, details("b")), (3, details("c"))]),
            ),
            (2, BTreeMap::from([(1, details("d"))])),
        ]);

        let missing = diff(&local, &remote);

        assert_eq!(missing.episode_count(), 2);
        assert_eq!(
            missing.season(1),
            Some(&BTreeMap::from([(3, details("c"))]))
        );
        assert_eq!(
            missing.season(2),
            Some(&BTreeMap::from([(1, details("d"))]))
        );
    }

    #[test]
    fn test_diff_against_empty_library_returns_everything() {
        let remote = normalize_remote(vec![
            remote(1, 1, "Pilot"),
            remote(1, 2, "Second"),
            remote(3, 7, "Later"),
        ]);

        let missing = diff(&LocalInventory::new(), &remote);

        assert_eq!(missing.episode_count(), 3);
        let seasons: Vec<u32> = missing.seasons().map(|(season, _)| season).collect();
        assert_eq!(seasons, vec![1, 3]);
    }

    #[test]
    fn test_diff_ignores_local_only_content() {
        let local = LocalInventory::from([
            (1, BTreeSet::from([1, 2, 99])),
            (5, BTreeSet::from([1, 2, 3])),
        ]);
        let remote = RemoteInventory::from([(
            1,
            BTreeMap::from([(1, details("a")), (2, details("b"))]),
        )]);

        let missing = diff(&local, &remote);

        assert!(missing.is_empty());
        assert_eq!(missing.season(5), None);
    }
}
