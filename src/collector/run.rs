//! Run request and report structures

use super::config::DEFAULT_MAX_FRIENDS;
use crate::fetcher::ResolveError;
use crate::identifier::SteamId;
use crate::{AggregateRow, RelationCandidate};

/// Which candidates (besides the seed) take part in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSelection {
    /// Every candidate with a readable library
    All,
    /// The first `n` candidates, in discovery order, with a readable library.
    /// Candidates after the n-th accessible one are never probed.
    FirstAccessible(usize),
    /// Exactly these identities, in this order, if readable
    Only(Vec<SteamId>),
}

impl Default for CandidateSelection {
    fn default() -> Self {
        Self::FirstAccessible(DEFAULT_MAX_FRIENDS)
    }
}

/// What to collect
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    /// Seed handle (SteamID64 or vanity); its friends become candidates
    pub seed: Option<String>,
    /// Extra candidates as `(label, handle)` pairs
    pub extra: Vec<(String, String)>,
    /// Candidate selection policy
    pub selection: CandidateSelection,
}

impl RunRequest {
    /// Empty request with the default selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the seed handle
    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    /// Add one extra candidate
    pub fn with_candidate(mut self, label: impl Into<String>, handle: impl Into<String>) -> Self {
        self.extra.push((label.into(), handle.into()));
        self
    }

    /// Add several extra candidates
    pub fn with_candidates<I>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.extra.extend(candidates);
        self
    }

    /// Set the selection policy
    pub fn with_selection(mut self, selection: CandidateSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Label used for the report file name: the seed as given, else `None`
    pub fn seed_label(&self) -> Option<&str> {
        self.seed
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A handle that could not be turned into an identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedHandle {
    /// Caller-facing label (CSV vanity, "seed", ...)
    pub label: String,
    /// Why resolution failed
    pub reason: ResolveError,
}

/// An included profile whose library could not be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedProfile {
    /// Identity of the profile
    pub steam_id: SteamId,
    /// Display name of the profile
    pub name: String,
    /// Error message
    pub reason: String,
}

/// Outcome of one run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Resolved seed, if any
    pub seed: Option<SteamId>,
    /// Aggregated rows in report order
    pub rows: Vec<AggregateRow>,
    /// Profiles whose libraries were fetched, in inclusion order (seed first)
    pub included: Vec<RelationCandidate>,
    /// Profiles probed as inaccessible
    pub excluded: Vec<RelationCandidate>,
    /// Included profiles whose fetch failed
    pub failed: Vec<FailedProfile>,
    /// Handles that never became identities
    pub unresolved: Vec<UnresolvedHandle>,
}

impl RunReport {
    /// One-line summary for logs and terminal output
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} games from {} profiles ({} excluded, {} failed",
            self.rows.len(),
            self.included.len(),
            self.excluded.len(),
            self.failed.len(),
        );
        if !self.unresolved.is_empty() {
            summary.push_str(&format!(", {} unresolved", self.unresolved.len()));
        }
        summary.push(')');
        summary
    }
}
