//! Run orchestration, host pacing and access caching
//!
//! # Overview
//!
//! A run goes through these steps:
//!
//! 1. **Resolution**: the seed handle and every extra handle become canonical ids
//! 2. **Discovery**: the seed's friends are listed and merged with the extras
//! 3. **Probing**: candidates are checked through a per-run [`access::AccessCache`]
//! 4. **Fetching**: accessible libraries are fetched on a bounded worker pool
//! 5. **Aggregation**: fetched libraries are merged by [`crate::aggregate`]
//!
//! Every request of the run, on every worker, waits on one shared
//! [`rate_limit::HostPacer`], so adding workers never raises the request rate.
//!
//! # Quick Start
//!
//! ```no_run
//! use steam_family_aggregator::collector::{CandidateSelection, CollectorConfig, RunExecutor, RunRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = RunExecutor::from_config(&CollectorConfig::default())?;
//! let request = RunRequest::new()
//!     .with_seed("76561197960287930")
//!     .with_candidate("friend-from-csv", "some_vanity")
//!     .with_selection(CandidateSelection::All);
//!
//! let report = executor.run(request).await?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Problems with single profiles never abort a run:
//! - unresolvable handles are listed in [`RunReport::unresolved`]
//! - inaccessible profiles are listed in [`RunReport::excluded`]
//! - failed library fetches are listed in [`RunReport::failed`]
//!
//! A run fails with [`PipelineError`] only when nothing could be fetched at all.

pub mod access;
pub mod config;
pub mod executor;
pub mod rate_limit;
pub mod run;

pub use access::AccessCache;
pub use config::{CollectorConfig, DiscoveryConfig};
pub use executor::RunExecutor;
pub use rate_limit::HostPacer;
pub use run::{CandidateSelection, FailedProfile, RunReport, RunRequest, UnresolvedHandle};

use crate::fetcher::FetcherError;

/// Run-level failures
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Neither the seed nor any candidate had a readable library
    #[error("no accessible profiles: the seed and every selected candidate are private or unreachable")]
    NoAccessibleProfiles,

    /// Every included library failed to fetch
    #[error("failed to fetch any libraries ({failed} failed due to network or parse errors)")]
    NoLibrariesFetched {
        /// Number of profiles whose fetch failed
        failed: usize,
    },

    /// The request cannot be run as given
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The profile source could not be built
    #[error("setup error: {0}")]
    Setup(#[from] FetcherError),
}
