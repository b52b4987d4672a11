//! Collect command: run the pipeline and export the report

use crate::collector::config::{
    CollectorConfig, DEFAULT_BASE_DELAY_MS, DEFAULT_BASE_URL, DEFAULT_MAX_FRIENDS,
    DEFAULT_MAX_WORKERS, MAX_ATTEMPTS,
};
use crate::collector::{CandidateSelection, RunExecutor, RunReport, RunRequest};
use crate::output::csv::{read_candidates_csv, write_report, ReportRecord};
use crate::output::path::ReportPathBuilder;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use super::CliError;

/// Upper bound for --max-workers; the pacer serialises requests anyway
const MAX_WORKERS: usize = 16;

/// Parse and validate the worker count
fn parse_workers(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if value == 0 {
        return Err("max workers must be at least 1".to_string());
    }
    if value > MAX_WORKERS {
        return Err(format!("max workers {value} exceeds maximum of {MAX_WORKERS}"));
    }
    Ok(value)
}

/// Aggregate the Steam libraries of a profile and its friends
#[derive(Parser, Debug)]
#[command(name = "steam-family-aggregator")]
#[command(about = "Merge the game libraries of a Steam profile and its friends", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Seed profile: SteamID64 or vanity name
    #[arg(long)]
    pub seed: Option<String>,

    /// Extra candidates from a CSV with `vanity,steam64_id` columns
    #[arg(long)]
    pub input_csv: Option<PathBuf>,

    /// Include at most this many accessible friends besides the seed
    #[arg(long, default_value_t = DEFAULT_MAX_FRIENDS)]
    pub max_friends: usize,

    /// Include every accessible friend (overrides --max-friends)
    #[arg(long, default_value_t = false)]
    pub all_friends: bool,

    /// Directory receiving the CSV report
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Concurrent library fetches (default: 3, max: 16)
    ///
    /// Every worker waits on the same host pacer, so more workers overlap
    /// transfers but never raise the request rate.
    #[arg(long, default_value_t = DEFAULT_MAX_WORKERS, value_parser = parse_workers)]
    pub max_workers: usize,

    /// Minimum milliseconds between two requests (jitter is added on top)
    #[arg(long, default_value_t = DEFAULT_BASE_DELAY_MS)]
    pub base_delay_ms: u64,

    /// Total attempts per request, including the first (range: 1-20)
    #[arg(long, default_value_t = MAX_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..=20))]
    pub max_attempts: u32,

    /// Steam Community host
    #[arg(long, env = "STEAM_COMMUNITY_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Print rows as JSON to stdout instead of writing a CSV file
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl Cli {
    /// Collector configuration from the flags
    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig::default()
            .with_base_url(self.base_url.clone())
            .with_base_delay(Duration::from_millis(self.base_delay_ms))
            .with_max_attempts(self.max_attempts)
            .with_max_workers(self.max_workers)
    }

    /// Candidate selection from the flags
    pub fn selection(&self) -> CandidateSelection {
        if self.all_friends {
            CandidateSelection::All
        } else {
            CandidateSelection::FirstAccessible(self.max_friends)
        }
    }

    /// Build the run request, reading the candidate CSV if given
    pub fn run_request(&self) -> Result<RunRequest, CliError> {
        if self.seed.is_none() && self.input_csv.is_none() {
            return Err(CliError::InvalidArgument(
                "provide --seed or --input-csv".to_string(),
            ));
        }

        let mut request = RunRequest::new().with_selection(self.selection());
        if let Some(seed) = &self.seed {
            request = request.with_seed(seed.clone());
        }
        if let Some(path) = &self.input_csv {
            request = request.with_candidates(read_candidates_csv(path)?);
        }
        Ok(request)
    }

    /// Execute the run and export the result
    pub async fn execute(&self) -> Result<(), CliError> {
        let request = self.run_request()?;
        let config = self.collector_config();
        info!(
            base_url = %config.base_url,
            base_delay_ms = self.base_delay_ms,
            max_attempts = config.max_attempts,
            workers = config.max_workers,
            "Starting run"
        );

        let executor = RunExecutor::from_config(&config)?;
        let report = executor.run(request.clone()).await?;
        log_report_details(&report);

        if self.json {
            let records: Vec<ReportRecord<'_>> = report.rows.iter().map(ReportRecord::from).collect();
            println!("{}", serde_json::to_string_pretty(&records)?);
        } else {
            let builder = ReportPathBuilder::new(self.output_dir.clone())
                .with_seed_label(request.seed_label().or(report.seed.as_ref().map(|s| s.as_str())));
            builder.ensure_directories()?;
            let path = builder.build();
            let written = write_report(&path, &report.rows)?;
            println!("Wrote {written} rows to {}", path.display());
        }

        println!("{}", report.summary());
        Ok(())
    }
}

fn log_report_details(report: &RunReport) {
    for unresolved in &report.unresolved {
        warn!(label = %unresolved.label, reason = %unresolved.reason, "Unresolved handle");
    }
    for excluded in &report.excluded {
        info!(steam_id = %excluded.steam_id, name = %excluded.name, "Excluded (private or inaccessible)");
    }
    for failed in &report.failed {
        warn!(steam_id = %failed.steam_id, name = %failed.name, reason = %failed.reason, "Fetch failed");
    }
}
