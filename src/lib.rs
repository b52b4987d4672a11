//! # Steam Family Aggregator Library
//!
//! Collects the game libraries of a Steam profile and its friends and merges
//! them into one ranked report of combined playtime.
//!
//! ## Features
//!
//! - **Polite Access**: one shared, jittered pacer per host plus exponential
//!   backoff on 429/5xx responses and network failures
//! - **Friends Discovery**: paginated friends listing with markup fallbacks
//! - **Access Probing**: private or unreachable libraries are detected up front
//!   and excluded from the run instead of failing it
//! - **Exact Aggregation**: playtime is summed as decimals and ranked with a
//!   total, deterministic order
//!
//! ## Quick Start
//!
//! ```no_run
//! use steam_family_aggregator::collector::{CandidateSelection, CollectorConfig, RunExecutor, RunRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = RunExecutor::from_config(&CollectorConfig::default())?;
//! let request = RunRequest::new()
//!     .with_seed("gabelogannewell")
//!     .with_selection(CandidateSelection::FirstAccessible(5));
//!
//! let report = executor.run(request).await?;
//! for row in &report.rows {
//!     println!("{} {} {}h", row.app_id, row.name, row.hours_forever);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`identifier`] - Canonical SteamID64 handling
//! - [`fetcher`] - HTTP access, retries, parsing, and the [`fetcher::ProfileSource`] seam
//! - [`collector`] - Pacing, per-run access cache, and run orchestration
//! - [`aggregate`] - Pure merge and ranking of fetched libraries
//! - [`output`] - CSV ingestion of extra candidates and report export
//! - [`cli`] - Command line front end

#![warn(missing_docs)]
#![warn(clippy::all)]

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Library aggregation
pub mod aggregate;

/// CLI command implementations
pub mod cli;

/// Run orchestration, pacing and access caching
pub mod collector;

/// Steam Community access
pub mod fetcher;

/// Canonical identifier parsing and validation
pub mod identifier;

/// Candidate ingestion and report output
pub mod output;

// Re-export commonly used types
pub use aggregate::aggregate;
pub use identifier::SteamId;

/// One game in one profile's library
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntry {
    /// Steam application id
    pub app_id: String,
    /// Display name (may be empty)
    pub name: String,
    /// Lifetime playtime in hours
    pub hours_forever: Decimal,
    /// Playtime over the last two weeks in hours
    pub hours_recent: Decimal,
}

impl GameEntry {
    /// Build a validated entry
    pub fn new(
        app_id: impl Into<String>,
        name: impl Into<String>,
        hours_forever: Decimal,
        hours_recent: Decimal,
    ) -> Result<Self, String> {
        let entry = Self {
            app_id: app_id.into(),
            name: name.into(),
            hours_forever,
            hours_recent,
        };
        entry.validate()?;
        Ok(entry)
    }

    /// Validate entry data integrity
    pub fn validate(&self) -> Result<(), String> {
        if self.app_id.trim().is_empty() {
            return Err("App id cannot be empty".to_string());
        }

        if self.hours_forever < Decimal::ZERO {
            return Err(format!(
                "Lifetime hours must be non-negative, got {}",
                self.hours_forever
            ));
        }

        if self.hours_recent < Decimal::ZERO {
            return Err(format!(
                "Recent hours must be non-negative, got {}",
                self.hours_recent
            ));
        }

        Ok(())
    }
}

/// One game merged across every included profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AggregateRow {
    /// Steam application id
    pub app_id: String,
    /// First non-empty name seen for this app
    pub name: String,
    /// Summed lifetime hours, rounded to one decimal
    pub hours_forever: Decimal,
    /// Summed two-week hours, rounded to one decimal
    pub hours_recent: Decimal,
    /// Number of distinct profiles owning the app
    pub owners_count: usize,
}

/// Where a candidate profile came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateSource {
    /// The run's seed profile
    #[serde(rename = "seed")]
    Seed,
    /// Listed on the seed's friends page
    #[serde(rename = "friend")]
    Friend,
    /// Supplied by the caller (CSV, command line)
    #[serde(rename = "external")]
    External,
}

impl std::fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CandidateSource::Seed => "seed",
            CandidateSource::Friend => "friend",
            CandidateSource::External => "external",
        };
        write!(f, "{s}")
    }
}

/// A profile that may be included in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationCandidate {
    /// Canonical identity
    pub steam_id: SteamId,
    /// Best-effort display name
    pub name: String,
    /// Discovery source
    pub source: CandidateSource,
}

impl RelationCandidate {
    /// The seed itself, labelled with the handle it was given as
    pub fn seed(steam_id: SteamId, name: impl Into<String>) -> Self {
        Self {
            steam_id,
            name: name.into(),
            source: CandidateSource::Seed,
        }
    }

    /// Candidate found on the seed's friends list
    pub fn friend(steam_id: SteamId, name: impl Into<String>) -> Self {
        Self {
            steam_id,
            name: name.into(),
            source: CandidateSource::Friend,
        }
    }

    /// Candidate supplied by the caller
    pub fn external(steam_id: SteamId, name: impl Into<String>) -> Self {
        Self {
            steam_id,
            name: name.into(),
            source: CandidateSource::External,
        }
    }
}

/// Whether a profile's library can be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accessibility {
    /// Library endpoint answered with a well-formed document
    #[serde(rename = "accessible")]
    Accessible,
    /// Probe failed: private, missing, or unreadable
    #[serde(rename = "inaccessible")]
    Inaccessible,
    /// Not probed in this run
    #[serde(rename = "unknown")]
    Unknown,
}

impl From<bool> for Accessibility {
    fn from(accessible: bool) -> Self {
        if accessible {
            Accessibility::Accessible
        } else {
            Accessibility::Inaccessible
        }
    }
}
