//! Compact episode-number ranges
//!
//! Turns a run of episode numbers like `1, 2, 3, 5, 7, 8, 9` into the
//! human-readable form `1-3, 5, 7-9`.

/// Formats an ascending list of distinct numbers as comma-separated ranges
///
/// Each maximal run of consecutive numbers becomes `start-end`; isolated
/// numbers are printed on their own. An empty slice yields an empty string.
///
/// The input must already be sorted ascending and free of duplicates. The
/// function does not re-sort; unsorted input produces unspecified (but
/// non-panicking) output.
///
/// # Examples
///
/// ```
/// use episode_auditor::format_episode_ranges;
///
/// assert_eq!(format_episode_ranges(&[1, 2, 3, 5, 7, 8, 9]), "1-3, 5, 7-9");
/// assert_eq!(format_episode_ranges(&[4]), "4");
/// assert_eq!(format_episode_ranges(&[]), "");
/// ```
pub fn format_episode_ranges(episodes: &[u32]) -> String {
    let Some((&first, rest)) = episodes.split_first() else {
        return String::new();
    };

    let mut ranges = Vec::new();
    let mut start = first;
    let mut end = first;

    for &episode in rest {
        if end.checked_add(1) == Some(episode) {
            end = episode;
        } else {
            ranges.push(format_range(start, end));
            start = episode;
            end = episode;
        }
    }
    ranges.push(format_range(start, end));

    ranges.join(", ")
}

fn format_range(start: u32, end: u32) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{start}-{end}")
    }
}
