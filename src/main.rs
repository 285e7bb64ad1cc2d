use clap::{Parser, Subcommand};
use episode_auditor::{
    AuditError, ConfigFile, ConfigOverrides, ProgressEvent, Report, Settings, ShowStatus,
    audit_duplicate_movies, audit_missing_episodes,
};
use std::io;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "episode-auditor", version)]
#[command(about = "Find missing TV episodes and duplicate movies in a Plex library")]
struct Cli {
    /// Path to a TOML config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Plex server URL, e.g. http://localhost:32400
    #[arg(long, env = "PLEX_URL", global = true)]
    plex_url: Option<String>,

    /// Plex access token
    #[arg(long, env = "PLEX_TOKEN", global = true, hide_env_values = true)]
    plex_token: Option<String>,

    /// Per-request HTTP timeout in seconds [default: 10]
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report episodes listed on TheTVDB but absent from the library, as CSV
    Missing {
        /// Library section holding TV shows [default: TV Shows]
        #[arg(long)]
        section: Option<String>,

        /// Number of shows checked concurrently [default: 10]
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        workers: Option<u16>,

        /// TheTVDB API key
        #[arg(long, env = "TVDB_API_KEY", hide_env_values = true)]
        tvdb_api_key: Option<String>,

        /// TheTVDB subscriber PIN, required by some API keys
        #[arg(long, env = "TVDB_PIN", hide_env_values = true)]
        tvdb_pin: Option<String>,

        /// Also print missing episode ranges per season to stderr
        #[arg(long)]
        summary: bool,
    },

    /// List movies stored in more than one file
    Duplicates {
        /// Library section holding movies [default: Movies]
        #[arg(long)]
        section: Option<String>,
    },
}

/// Handles progress events and prints formatted output to stderr
fn handle_progress_event(event: ProgressEvent) {
    match event {
        ProgressEvent::AuthenticatingCatalog => {
            eprintln!("Connecting to TVDB...");
        }
        ProgressEvent::FetchingShows { section } => {
            eprintln!("\nFetching TV shows from Plex section '{}'...", section);
        }
        ProgressEvent::ShowsFound { count } => {
            eprintln!("Found {} shows in your library", count);
        }
        ProgressEvent::CheckingShows { workers } => {
            eprintln!(
                "\nChecking shows for missing episodes ({} in parallel)...",
                workers
            );
            eprintln!("(This may take a while for large libraries)\n");
        }
        ProgressEvent::ShowChecked {
            index,
            total,
            show_name,
            status,
        } => {
            let outcome = match status {
                ShowStatus::NotFound => "⚠ Not found on TVDB".to_string(),
                ShowStatus::LibraryReadFailed => {
                    "⚠ Could not read episodes from Plex".to_string()
                }
                ShowStatus::Complete { partial } => format!("✓{}", partial_note(partial)),
                ShowStatus::Missing { count, partial } => {
                    format!("✗ {} missing{}", count, partial_note(partial))
                }
            };
            eprintln!("[{}/{}] {}... {}", index + 1, total, show_name, outcome);
        }
        ProgressEvent::Complete { .. } => {}
    }
}

fn partial_note(partial: bool) -> &'static str {
    if partial {
        " (TVDB episode list incomplete)"
    } else {
        ""
    }
}

fn print_banner(title: &str) {
    eprintln!("\n{}", "=".repeat(70));
    eprintln!("{}", title);
    eprintln!("{}", "=".repeat(70));
}

fn print_summary(report: &Report, ranges: bool) {
    print_banner("GENERATING REPORT");
    eprintln!(
        "\nShows with missing episodes: {}/{}",
        report.shows_with_missing(),
        report.shows_checked()
    );
    eprintln!("Total missing episodes: {}", report.total_missing());

    if ranges {
        eprintln!();
        for season in report.season_summaries() {
            eprintln!(
                "  {} S{:02}: {}",
                season.show_name, season.season, season.episodes
            );
        }
    }
    eprintln!();
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "episode_auditor=debug"
    } else {
        "episode_auditor=warn"
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), AuditError> {
    let file = match &cli.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::load_default()?,
    };

    let mut overrides = ConfigOverrides {
        plex_url: cli.plex_url,
        plex_token: cli.plex_token,
        timeout_secs: cli.timeout,
        ..Default::default()
    };

    match cli.command {
        Command::Missing {
            section,
            workers,
            tvdb_api_key,
            tvdb_pin,
            summary,
        } => {
            overrides.tv_section = section;
            overrides.workers = workers.map(usize::from);
            overrides.tvdb_api_key = tvdb_api_key;
            overrides.tvdb_pin = tvdb_pin;
            let settings = Settings::resolve(overrides, file)?;

            let report = audit_missing_episodes(&settings, handle_progress_event)?;
            print_summary(&report, summary);

            report.write_csv(io::stdout().lock())?;

            print_banner("✓ CSV output complete");
        }
        Command::Duplicates { section } => {
            overrides.movie_section = section;
            let settings = Settings::resolve(overrides, file)?;

            eprintln!(
                "Checking Plex section '{}' for duplicates...",
                settings.movie_section
            );
            let duplicates = audit_duplicate_movies(&settings)?;
            for movie in &duplicates {
                for file in &movie.files {
                    println!("{}", file);
                }
            }
            eprintln!("Duplicates found: {}", duplicates.len());
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("\nError: {e}");
        process::exit(1);
    }
}
