//! Mirrors remote categories into the local cache.
//!
//! ```text
//! Idle → FetchingList → FetchingDetails → Parsing → Committing → Idle
//! ```
//!
//! One lock serializes every run across all targets. Failures are logged and
//! reported, never raised: the next trigger simply tries again.

pub mod availability;
pub mod synchronizer;
pub mod target;

use std::fmt;

pub use synchronizer::{Synchronizer, DEFAULT_DETAIL_WORKERS};
pub use target::SyncTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    Idle,
    FetchingList,
    FetchingDetails,
    Parsing,
    Committing,
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncStage::Idle => "idle",
            SyncStage::FetchingList => "fetching list",
            SyncStage::FetchingDetails => "fetching details",
            SyncStage::Parsing => "parsing",
            SyncStage::Committing => "committing",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Pipeline ran to the end (the index may still be untouched if nothing
    /// usable came back).
    Completed,
    /// Index was already populated by the time the lock was acquired.
    Skipped,
    Failed { stage: SyncStage, error: String },
}

/// What one run did, for logs and the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub tag: String,
    pub listed: usize,
    pub fetched: usize,
    pub fetch_failures: usize,
    pub rejected: usize,
    pub malformed: usize,
    pub movies: usize,
    pub reviews: usize,
    pub trailers: usize,
    /// Size of the installed index, if it was replaced
    pub index_size: Option<usize>,
    pub stage: SyncStage,
    pub outcome: SyncOutcome,
}

impl SyncReport {
    pub fn new(target: &SyncTarget) -> Self {
        Self {
            tag: target.tag.clone(),
            listed: 0,
            fetched: 0,
            fetch_failures: 0,
            rejected: 0,
            malformed: 0,
            movies: 0,
            reviews: 0,
            trailers: 0,
            index_size: None,
            stage: SyncStage::Idle,
            outcome: SyncOutcome::Completed,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, SyncOutcome::Failed { .. })
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            SyncOutcome::Skipped => write!(f, "{}: already populated, skipped", self.tag),
            SyncOutcome::Failed { stage, error } => {
                write!(f, "{}: failed while {}: {}", self.tag, stage, error)
            }
            SyncOutcome::Completed => {
                write!(
                    f,
                    "{}: {} listed, {} fetched, {} fetch errors, {} rejected, {} malformed; \
                     stored {} movies, {} reviews, {} trailers",
                    self.tag,
                    self.listed,
                    self.fetched,
                    self.fetch_failures,
                    self.rejected,
                    self.malformed,
                    self.movies,
                    self.reviews,
                    self.trailers
                )?;
                match self.index_size {
                    Some(size) => write!(f, "; index now {}", size),
                    None => write!(f, "; index unchanged"),
                }
            }
        }
    }
}
