use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};

use crate::app::{CatalogError, ErrorKind, Result};
use crate::domain::{Category, MovieDetail};
use crate::fetcher::endpoints::redact;
use crate::fetcher::{Endpoints, Fetcher};
use crate::parser::CatalogParser;
use crate::router::{ResourceAddress, Router, Rows};
use crate::sync::{SyncOutcome, SyncReport, SyncStage, SyncTarget};

pub const DEFAULT_DETAIL_WORKERS: usize = 4;

pub struct Synchronizer {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    router: Router,
    parser: CatalogParser,
    endpoints: Endpoints,
    targets: Vec<SyncTarget>,
    pages: u32,
    semaphore: Arc<Semaphore>,
    // One sync at a time, whatever the target
    lock: Mutex<()>,
}

impl Synchronizer {
    pub fn new(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        router: Router,
        endpoints: Endpoints,
        targets: Vec<SyncTarget>,
    ) -> Self {
        Self {
            fetcher,
            router,
            parser: CatalogParser::new(),
            endpoints,
            targets,
            pages: 1,
            semaphore: Arc::new(Semaphore::new(DEFAULT_DETAIL_WORKERS)),
            lock: Mutex::new(()),
        }
    }

    pub fn with_detail_workers(mut self, workers: usize) -> Self {
        self.semaphore = Arc::new(Semaphore::new(workers.max(1)));
        self
    }

    pub fn with_pages(mut self, pages: u32) -> Self {
        self.pages = pages.max(1);
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn targets(&self) -> &[SyncTarget] {
        &self.targets
    }

    pub fn target_for(&self, category: Category) -> Option<&SyncTarget> {
        self.targets.iter().find(|t| t.category == category)
    }

    pub fn target_by_tag(&self, tag: &str) -> Option<&SyncTarget> {
        self.targets.iter().find(|t| t.tag == tag)
    }

    /// Run the full pipeline for one target. Never fails; the report says
    /// what happened.
    pub async fn sync(&self, target: &SyncTarget) -> SyncReport {
        let _guard = self.lock.lock().await;
        self.run_locked(target).await
    }

    /// Sync every configured target, one after another.
    pub async fn sync_all(&self) -> Vec<SyncReport> {
        let mut reports = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            reports.push(self.sync(target).await);
        }
        reports
    }

    /// Sync only if the target's index is still empty once the lock is held.
    pub(crate) async fn sync_if_empty(&self, target: &SyncTarget) -> SyncReport {
        let _guard = self.lock.lock().await;

        match self.router.movies_in(target.category) {
            Ok(movies) if !movies.is_empty() => {
                tracing::debug!("{} filled while waiting for the sync lock", target.tag);
                let mut report = SyncReport::new(target);
                report.outcome = SyncOutcome::Skipped;
                report
            }
            Ok(_) => self.run_locked(target).await,
            Err(e) => {
                tracing::error!("Cannot read {} index: {}", target.tag, e);
                let mut report = SyncReport::new(target);
                report.outcome = SyncOutcome::Failed {
                    stage: SyncStage::Idle,
                    error: e.to_string(),
                };
                report
            }
        }
    }

    async fn run_locked(&self, target: &SyncTarget) -> SyncReport {
        let mut report = SyncReport::new(target);
        tracing::info!("Syncing {}", target.tag);

        match self.pipeline(target, &mut report).await {
            Ok(()) => {
                tracing::info!("{}", report);
                report.stage = SyncStage::Idle;
            }
            Err(e) => {
                tracing::error!("Sync {} failed while {}: {}", target.tag, report.stage, e);
                report.outcome = SyncOutcome::Failed {
                    stage: report.stage,
                    error: e.to_string(),
                };
            }
        }

        report
    }

    async fn pipeline(&self, target: &SyncTarget, report: &mut SyncReport) -> Result<()> {
        report.stage = SyncStage::FetchingList;
        let ids = self.fetch_list(target).await?;
        report.listed = ids.len();
        if ids.is_empty() {
            tracing::warn!("{} list is empty; keeping the current index", target.tag);
            return Ok(());
        }

        report.stage = SyncStage::FetchingDetails;
        let bodies = self.fetch_details(&ids).await;

        report.stage = SyncStage::Parsing;
        let mut details = Vec::with_capacity(bodies.len());
        for (id, body) in bodies {
            let body = match body {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("Skipping movie {}: {}", id, e);
                    report.fetch_failures += 1;
                    continue;
                }
            };
            report.fetched += 1;

            match self.parser.parse_detail(&body) {
                Ok(detail) => details.push(detail),
                Err(e) => {
                    if e.kind() == ErrorKind::RemoteRejected {
                        report.rejected += 1;
                    } else {
                        report.malformed += 1;
                    }
                    tracing::warn!("Dropping movie {}: {}", id, e);
                }
            }
        }

        if details.is_empty() {
            tracing::warn!(
                "No {} movie survived parsing; keeping the current index",
                target.tag
            );
            return Ok(());
        }

        report.stage = SyncStage::Committing;
        self.commit(target, details, report)
    }

    /// Ordered, de-duplicated ids across all configured pages.
    async fn fetch_list(&self, target: &SyncTarget) -> Result<Vec<i64>> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();

        for page in 1..=self.pages {
            let url = self.endpoints.list_url(&target.endpoint, page)?;
            tracing::debug!("Fetching {}", redact(&url));

            let body = self.fetcher.fetch(&url).await?;
            let page_ids = self.parser.parse_id_list(&body)?;
            if page_ids.is_empty() {
                break;
            }
            ids.extend(page_ids.into_iter().filter(|id| seen.insert(*id)));
        }

        Ok(ids)
    }

    /// Detail bodies in list order, at most `detail_workers` in flight.
    async fn fetch_details(&self, ids: &[i64]) -> Vec<(i64, Result<Vec<u8>>)> {
        let mut handles = Vec::with_capacity(ids.len());

        for &id in ids {
            let fetcher = self.fetcher.clone();
            let semaphore = self.semaphore.clone();
            let url = self.endpoints.detail_url(id);

            handles.push(tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return (id, Err(CatalogError::Network("detail workers closed".into())));
                };
                let body = match url {
                    Ok(url) => fetcher.fetch(&url).await,
                    Err(e) => Err(e),
                };
                (id, body)
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (handle, &id) in futures::future::join_all(handles).await.into_iter().zip(ids) {
            match handle {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!("Detail task for movie {} did not finish: {}", id, e);
                    results.push((id, Err(CatalogError::Network(e.to_string()))));
                }
            }
        }

        results
    }

    fn commit(
        &self,
        target: &SyncTarget,
        details: Vec<MovieDetail>,
        report: &mut SyncReport,
    ) -> Result<()> {
        let mut movies = Vec::with_capacity(details.len());
        let mut reviews = Vec::new();
        let mut trailers = Vec::new();
        for detail in details {
            movies.push(detail.movie);
            reviews.extend(detail.reviews);
            trailers.extend(detail.trailers);
        }
        let ids: Vec<i64> = movies.iter().map(|m| m.id).collect();

        report.movies = self
            .router
            .bulk_insert(&ResourceAddress::Movies, Rows::Movies(&movies))?;
        report.reviews = self
            .router
            .bulk_insert(&ResourceAddress::Reviews, Rows::Reviews(&reviews))?;
        report.trailers = self
            .router
            .bulk_insert(&ResourceAddress::Trailers, Rows::Trailers(&trailers))?;

        // Entities above stay even if this fails; the old index survives intact.
        let installed = self.router.replace(&target.address(), &ids)?;
        report.index_size = Some(installed);

        Ok(())
    }
}
