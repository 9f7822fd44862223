//! Module for tracking the operational state of a crawl run.
//!
//! `CrawlerState` holds the atomic counters the dispatch loop consults to
//! decide when the run is over: the number of jobs currently inside a worker
//! slot, and the number of completed jobs that have not yet finished
//! post-processing. The run may only drain once both are zero and the job
//! queue is empty; counting jobs until `postprocess` returns is what keeps
//! pipeline-discovered jobs from being lost at shutdown.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared counters for the crawl's in-flight work.
#[derive(Debug, Default)]
pub struct CrawlerState {
    /// Jobs dispatched to a worker slot whose fetch/preprocess has not finished.
    pub in_flight_jobs: AtomicUsize,
    /// Jobs pushed toward the pipeline whose postprocess has not finished.
    pub pending_results: AtomicUsize,
}

impl CrawlerState {
    /// Creates a new, atomically reference-counted `CrawlerState`.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// True when no job is being fetched or post-processed.
    pub fn is_idle(&self) -> bool {
        self.in_flight_jobs.load(Ordering::SeqCst) == 0
            && self.pending_results.load(Ordering::SeqCst) == 0
    }
}
