//! Per-run library accessibility cache
//!
//! Each identity gets one `OnceCell`. Concurrent checks of the same identity
//! all await that cell, so the profile is probed once and the verdict is
//! written once.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use crate::fetcher::ProfileSource;
use crate::identifier::SteamId;
use crate::Accessibility;

/// Accessibility verdicts for one run
#[derive(Debug, Default)]
pub struct AccessCache {
    cells: Mutex<HashMap<SteamId, Arc<OnceCell<bool>>>>,
}

impl AccessCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    async fn cell(&self, steam_id: &SteamId) -> Arc<OnceCell<bool>> {
        let mut cells = self.cells.lock().await;
        cells
            .entry(steam_id.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Whether the library is readable, probing only on the first call
    pub async fn check(&self, source: &dyn ProfileSource, steam_id: &SteamId) -> bool {
        let cell = self.cell(steam_id).await;
        *cell
            .get_or_init(|| async {
                let accessible = source.probe_library(steam_id).await;
                debug!(steam_id = %steam_id, accessible, "Cached access verdict");
                accessible
            })
            .await
    }

    /// Cached verdict without probing
    pub async fn verdict(&self, steam_id: &SteamId) -> Accessibility {
        let cells = self.cells.lock().await;
        match cells.get(steam_id).and_then(|cell| cell.get()) {
            Some(accessible) => Accessibility::from(*accessible),
            None => Accessibility::Unknown,
        }
    }

    /// Forget the verdict so the next check probes again
    pub async fn invalidate(&self, steam_id: &SteamId) {
        self.cells.lock().await.remove(steam_id);
    }

    /// Probe again regardless of any cached verdict
    pub async fn reprobe(&self, source: &dyn ProfileSource, steam_id: &SteamId) -> bool {
        self.invalidate(steam_id).await;
        self.check(source, steam_id).await
    }

    /// Number of identities with a settled verdict
    pub async fn len(&self) -> usize {
        let cells = self.cells.lock().await;
        cells.values().filter(|cell| cell.initialized()).count()
    }

    /// Whether no verdict has been settled yet
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
