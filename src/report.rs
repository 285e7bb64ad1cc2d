//! Missing-episode report
//!
//! Flattens the per-show missing tables of a scan into ordered rows and
//! renders them as CSV.

use crate::inventory::MissingTable;
use crate::range_format::format_episode_ranges;
use std::collections::BTreeMap;
use std::io;
use thiserror::Error;

/// Column headers of the CSV report
pub const REPORT_HEADER: [&str; 5] = [
    "Show Name",
    "Season",
    "Episode",
    "Episode Title",
    "Air Date",
];

/// Errors that can occur while writing a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One missing episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub show_name: String,
    pub season: u32,
    pub episode: u32,
    pub title: String,
    pub air_date: String,
}

/// Missing episodes of one season, compacted into ranges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonSummary {
    pub show_name: String,
    pub season: u32,
    /// Episode numbers such as `1-3, 7`
    pub episodes: String,
}

/// The outcome of a full library scan
///
/// Rows are ordered by show name (byte-wise), then season, then episode,
/// independent of the order in which shows finished processing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    rows: Vec<ReportRow>,
    summaries: Vec<SeasonSummary>,
    shows_checked: usize,
    shows_with_missing: usize,
}

impl Report {
    /// Builds a report from the missing tables collected during a scan
    ///
    /// Tables are keyed by show name and the show's position in the library
    /// listing, which keeps same-named shows apart while ordering them
    /// deterministically. Empty tables are skipped.
    pub fn from_missing(
        shows_checked: usize,
        missing: BTreeMap<(String, usize), MissingTable>,
    ) -> Self {
        let mut report = Report {
            shows_checked,
            ..Default::default()
        };

        for ((show_name, _), table) in missing {
            if table.is_empty() {
                continue;
            }
            report.shows_with_missing += 1;

            for (season, episodes) in table.seasons() {
                let numbers: Vec<u32> = episodes.keys().copied().collect();
                report.summaries.push(SeasonSummary {
                    show_name: show_name.clone(),
                    season,
                    episodes: format_episode_ranges(&numbers),
                });

                for (episode, details) in episodes {
                    report.rows.push(ReportRow {
                        show_name: show_name.clone(),
                        season,
                        episode: *episode,
                        title: details.title.clone(),
                        air_date: details.air_date.clone(),
                    });
                }
            }
        }

        // Same-named shows arrive as separate tables; merge their rows into
        // name, season, episode order. The sort is stable, so listing
        // position still breaks ties.
        report.rows.sort_by(|a, b| {
            (a.show_name.as_bytes(), a.season, a.episode).cmp(&(
                b.show_name.as_bytes(),
                b.season,
                b.episode,
            ))
        });
        report.summaries.sort_by(|a, b| {
            (a.show_name.as_bytes(), a.season).cmp(&(b.show_name.as_bytes(), b.season))
        });

        report
    }

    /// Missing episodes in report order
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Per-season range summaries in report order
    pub fn season_summaries(&self) -> &[SeasonSummary] {
        &self.summaries
    }

    /// Number of shows that were checked
    pub fn shows_checked(&self) -> usize {
        self.shows_checked
    }

    /// Number of shows with at least one missing episode
    pub fn shows_with_missing(&self) -> usize {
        self.shows_with_missing
    }

    /// Total number of missing episodes
    pub fn total_missing(&self) -> usize {
        self.rows.len()
    }

    /// Writes the report as CSV, header first
    ///
    /// The header is written even when no episode is missing.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), ReportError> {
        let mut csv = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);

        csv.write_record(REPORT_HEADER)?;
        for row in &self.rows {
            let season = row.season.to_string();
            let episode = row.episode.to_string();
            csv.write_record([
                row.show_name.as_str(),
                season.as_str(),
                episode.as_str(),
                row.title.as_str(),
                row.air_date.as_str(),
            ])?;
        }
        csv.flush()?;

        Ok(())
    }
}
