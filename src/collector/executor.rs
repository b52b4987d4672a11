//! Run executor: resolve, discover, probe, fetch, aggregate

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::access::AccessCache;
use super::config::CollectorConfig;
use super::run::{CandidateSelection, FailedProfile, RunReport, RunRequest, UnresolvedHandle};
use super::PipelineError;
use crate::aggregate::aggregate;
use crate::fetcher::{FetcherResult, ProfileSource, SteamCommunity};
use crate::identifier::SteamId;
use crate::{GameEntry, RelationCandidate};

/// Executes runs against one profile source
///
/// Each run gets a fresh [`AccessCache`]; nothing is shared between runs
/// except the source itself (and therefore its pacer).
pub struct RunExecutor {
    source: Arc<dyn ProfileSource>,
    max_workers: usize,
}

impl RunExecutor {
    /// Create an executor over any profile source
    pub fn new(source: Arc<dyn ProfileSource>, max_workers: usize) -> Self {
        Self {
            source,
            max_workers: max_workers.max(1),
        }
    }

    /// Create an executor over the live community site
    pub fn from_config(config: &CollectorConfig) -> Result<Self, PipelineError> {
        let source = SteamCommunity::from_config(config)?;
        Ok(Self::new(Arc::new(source), config.max_workers))
    }

    /// Worker pool size for probes and fetches
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Run one collection
    ///
    /// # Errors
    /// - `InvalidRequest` when there is neither a seed nor an extra candidate
    /// - `NoAccessibleProfiles` when nothing selected has a readable library
    /// - `NoLibrariesFetched` when every library fetch failed
    pub async fn run(&self, request: RunRequest) -> Result<RunReport, PipelineError> {
        if request.seed_label().is_none() && request.extra.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "provide a seed or at least one candidate".to_string(),
            ));
        }

        let access = AccessCache::new();
        let mut report = RunReport::default();

        let seed = match request.seed_label() {
            Some(handle) => self.resolve_seed(handle, &mut report).await,
            None => None,
        };
        report.seed = seed.as_ref().map(|c| c.steam_id.clone());

        let candidates = self
            .gather_candidates(seed.as_ref(), &request.extra, &mut report)
            .await;
        info!(candidates = candidates.len(), "Candidates gathered");

        let mut included = Vec::new();
        if let Some(seed) = seed {
            if access.check(self.source.as_ref(), &seed.steam_id).await {
                included.push(seed);
            } else {
                warn!(
                    seed = %seed.steam_id,
                    "Seed library appears private or unavailable; continuing with other profiles"
                );
                report.excluded.push(seed);
            }
        }

        let seed_id = report.seed.clone();
        let (accepted, rejected) = self
            .select(&access, candidates, &request.selection, seed_id.as_ref())
            .await;
        included.extend(accepted);
        report.excluded.extend(rejected);
        // One fetch per identity, seed first
        let included = dedupe_candidates(included, None);

        if included.is_empty() {
            return Err(PipelineError::NoAccessibleProfiles);
        }
        info!(
            included = included.len(),
            excluded = report.excluded.len(),
            workers = self.max_workers,
            "Fetching libraries"
        );

        let mut libraries: Vec<(RelationCandidate, Vec<GameEntry>)> = Vec::new();
        for (candidate, result) in self.fetch_all(included).await {
            match result {
                Ok(games) => libraries.push((candidate, games)),
                Err(e) => {
                    warn!(steam_id = %candidate.steam_id, error = %e, "Library fetch failed");
                    report.failed.push(FailedProfile {
                        steam_id: candidate.steam_id,
                        name: candidate.name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if libraries.is_empty() {
            return Err(PipelineError::NoLibrariesFetched {
                failed: report.failed.len(),
            });
        }

        report.rows = aggregate(
            libraries
                .iter()
                .map(|(candidate, games)| (&candidate.steam_id, games)),
        );
        report.included = libraries.into_iter().map(|(candidate, _)| candidate).collect();

        info!("Run complete: {}", report.summary());
        Ok(report)
    }

    async fn resolve_seed(&self, handle: &str, report: &mut RunReport) -> Option<RelationCandidate> {
        match self.source.resolve(handle).await {
            Ok(steam_id) => {
                info!(seed = handle, steam_id = %steam_id, "Seed resolved");
                Some(RelationCandidate::seed(steam_id, handle))
            }
            Err(reason) => {
                warn!(seed = handle, error = %reason, "Seed could not be resolved");
                report.unresolved.push(UnresolvedHandle {
                    label: handle.to_string(),
                    reason,
                });
                None
            }
        }
    }

    /// Friends of the seed followed by the extras, deduplicated, seed removed
    async fn gather_candidates(
        &self,
        seed: Option<&RelationCandidate>,
        extra: &[(String, String)],
        report: &mut RunReport,
    ) -> Vec<RelationCandidate> {
        let mut candidates = Vec::new();

        if let Some(seed) = seed {
            match self.source.discover_friends(&seed.steam_id).await {
                Ok(friends) => candidates.extend(friends),
                Err(e) => warn!(seed = %seed.steam_id, error = %e, "Could not fetch friends"),
            }
        }

        for (label, handle) in extra {
            let label = if label.trim().is_empty() { handle } else { label };
            match self.source.resolve(handle).await {
                Ok(steam_id) => candidates.push(RelationCandidate::external(steam_id, label.trim())),
                Err(reason) => {
                    warn!(label = %label, error = %reason, "Candidate could not be resolved");
                    report.unresolved.push(UnresolvedHandle {
                        label: label.to_string(),
                        reason,
                    });
                }
            }
        }

        dedupe_candidates(candidates, seed.map(|s| &s.steam_id))
    }

    /// Split candidates into accepted and probed-inaccessible per the selection
    async fn select(
        &self,
        access: &AccessCache,
        candidates: Vec<RelationCandidate>,
        selection: &CandidateSelection,
        seed: Option<&SteamId>,
    ) -> (Vec<RelationCandidate>, Vec<RelationCandidate>) {
        let source = self.source.as_ref();
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();

        match selection {
            CandidateSelection::FirstAccessible(limit) => {
                for candidate in candidates {
                    if accepted.len() >= *limit {
                        break;
                    }
                    if access.check(source, &candidate.steam_id).await {
                        accepted.push(candidate);
                    } else {
                        debug!(steam_id = %candidate.steam_id, "Skipping inaccessible candidate");
                        rejected.push(candidate);
                    }
                }
            }
            CandidateSelection::All | CandidateSelection::Only(_) => {
                let chosen = match selection {
                    CandidateSelection::Only(ids) => pick_only(candidates, ids, seed),
                    _ => candidates,
                };
                let probed: Vec<(RelationCandidate, bool)> = stream::iter(chosen)
                    .map(move |candidate| async move {
                        let accessible = access.check(source, &candidate.steam_id).await;
                        (candidate, accessible)
                    })
                    .buffered(self.max_workers)
                    .collect()
                    .await;

                for (candidate, accessible) in probed {
                    if accessible {
                        accepted.push(candidate);
                    } else {
                        rejected.push(candidate);
                    }
                }
            }
        }

        (accepted, rejected)
    }

    async fn fetch_all(
        &self,
        included: Vec<RelationCandidate>,
    ) -> Vec<(RelationCandidate, FetcherResult<Vec<GameEntry>>)> {
        let source = self.source.as_ref();
        stream::iter(included)
            .map(move |candidate| async move {
                let result = source.fetch_library(&candidate.steam_id).await;
                (candidate, result)
            })
            .buffered(self.max_workers)
            .collect()
            .await
    }
}

/// Keep the first candidate per identity and drop the seed
fn dedupe_candidates(
    candidates: Vec<RelationCandidate>,
    seed: Option<&SteamId>,
) -> Vec<RelationCandidate> {
    let mut seen: HashSet<SteamId> = seed.into_iter().cloned().collect();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.steam_id.clone()))
        .collect()
}

/// The requested identities in request order, named from the candidate list
/// when they appear there
///
/// The seed is skipped; it is handled before selection.
fn pick_only(
    candidates: Vec<RelationCandidate>,
    ids: &[SteamId],
    seed: Option<&SteamId>,
) -> Vec<RelationCandidate> {
    let mut picked: Vec<RelationCandidate> = Vec::new();
    for id in ids {
        if seed == Some(id) || picked.iter().any(|c| &c.steam_id == id) {
            continue;
        }
        let candidate = candidates
            .iter()
            .find(|c| &c.steam_id == id)
            .cloned()
            .unwrap_or_else(|| RelationCandidate::external(id.clone(), id.to_string()));
        picked.push(candidate);
    }
    picked
}
