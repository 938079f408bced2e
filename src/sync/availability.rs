use crate::app::Result;
use crate::domain::{Category, Movie};
use crate::sync::{SyncOutcome, Synchronizer};

impl Synchronizer {
    /// Movies of `category`, syncing first if the local index is empty.
    ///
    /// Favorites are local-only and never trigger a sync. Concurrent callers
    /// that all see an empty index share one sync: whoever gets the lock second
    /// finds the index filled and skips.
    pub async fn ensure_available(&self, category: Category) -> Result<Vec<Movie>> {
        let movies = self.router().movies_in(category)?;
        if !movies.is_empty() {
            return Ok(movies);
        }

        let Some(target) = self.target_for(category).cloned() else {
            tracing::debug!("{} has no remote source; nothing to fetch", category);
            return Ok(movies);
        };

        tracing::info!("{} is empty locally, fetching it now", category);
        let report = self.sync_if_empty(&target).await;
        if let SyncOutcome::Failed { error, .. } = &report.outcome {
            tracing::warn!("Could not fill {}: {}", category, error);
        }

        self.router().movies_in(category)
    }
}
