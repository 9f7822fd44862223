//! # Statistics Module
//!
//! Collects counters describing a crawl run.
//!
//! The `StatCollector` tracks admission, fetch, and pipeline metrics with
//! atomic counters so that workers and the pipeline can update them
//! concurrently. A snapshot can be rendered with `Display` for the end-of-run
//! summary or exported as JSON.

use crate::error::CrawlError;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
    time::{Duration, Instant},
};

// A consistent snapshot used by the presentation methods.
struct StatsSnapshot {
    jobs_admitted: usize,
    jobs_deduplicated: usize,
    fetches_succeeded: usize,
    fetches_failed: usize,
    preprocess_errors: usize,
    postprocess_errors: usize,
    jobs_postprocessed: usize,
    total_bytes_downloaded: usize,
    response_status_counts: HashMap<u16, usize>,
    elapsed_duration: Duration,
}

impl StatsSnapshot {
    fn jobs_per_second(&self) -> f64 {
        let secs = self.elapsed_duration.as_secs_f64();
        if secs > 0.0 {
            self.jobs_postprocessed as f64 / secs
        } else {
            0.0
        }
    }

    fn formatted_bytes(&self) -> String {
        const KB: usize = 1024;
        const MB: usize = 1024 * KB;
        const GB: usize = 1024 * MB;

        if self.total_bytes_downloaded >= GB {
            format!("{:.2} GB", self.total_bytes_downloaded as f64 / GB as f64)
        } else if self.total_bytes_downloaded >= MB {
            format!("{:.2} MB", self.total_bytes_downloaded as f64 / MB as f64)
        } else if self.total_bytes_downloaded >= KB {
            format!("{:.2} KB", self.total_bytes_downloaded as f64 / KB as f64)
        } else {
            format!("{} B", self.total_bytes_downloaded)
        }
    }
}

/// Collects and stores counters describing the crawl's operation.
#[derive(Debug, serde::Serialize)]
pub struct StatCollector {
    #[serde(skip)]
    pub start_time: Instant,

    // Admission metrics
    pub jobs_admitted: AtomicUsize,
    pub jobs_deduplicated: AtomicUsize,

    // Fetch metrics
    pub fetches_succeeded: AtomicUsize,
    pub fetches_failed: AtomicUsize,
    pub total_bytes_downloaded: AtomicUsize,
    pub response_status_counts: dashmap::DashMap<u16, usize>,

    // Hook metrics
    pub preprocess_errors: AtomicUsize,
    pub postprocess_errors: AtomicUsize,
    pub jobs_postprocessed: AtomicUsize,
}

impl StatCollector {
    /// Creates a new `StatCollector` with all counters at zero.
    pub(crate) fn new() -> Self {
        StatCollector {
            start_time: Instant::now(),
            jobs_admitted: AtomicUsize::new(0),
            jobs_deduplicated: AtomicUsize::new(0),
            fetches_succeeded: AtomicUsize::new(0),
            fetches_failed: AtomicUsize::new(0),
            total_bytes_downloaded: AtomicUsize::new(0),
            response_status_counts: dashmap::DashMap::new(),
            preprocess_errors: AtomicUsize::new(0),
            postprocess_errors: AtomicUsize::new(0),
            jobs_postprocessed: AtomicUsize::new(0),
        }
    }

    fn snapshot(&self) -> StatsSnapshot {
        let mut status_counts: HashMap<u16, usize> = HashMap::new();
        for entry in self.response_status_counts.iter() {
            let (key, value) = entry.pair();
            status_counts.insert(*key, *value);
        }

        StatsSnapshot {
            jobs_admitted: self.jobs_admitted.load(Ordering::SeqCst),
            jobs_deduplicated: self.jobs_deduplicated.load(Ordering::SeqCst),
            fetches_succeeded: self.fetches_succeeded.load(Ordering::SeqCst),
            fetches_failed: self.fetches_failed.load(Ordering::SeqCst),
            preprocess_errors: self.preprocess_errors.load(Ordering::SeqCst),
            postprocess_errors: self.postprocess_errors.load(Ordering::SeqCst),
            jobs_postprocessed: self.jobs_postprocessed.load(Ordering::SeqCst),
            total_bytes_downloaded: self.total_bytes_downloaded.load(Ordering::SeqCst),
            response_status_counts: status_counts,
            elapsed_duration: self.start_time.elapsed(),
        }
    }

    pub(crate) fn increment_jobs_admitted(&self) {
        self.jobs_admitted.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_jobs_deduplicated(&self) {
        self.jobs_deduplicated.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_fetches_succeeded(&self) {
        self.fetches_succeeded.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_fetches_failed(&self) {
        self.fetches_failed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_response_status(&self, status_code: u16) {
        *self.response_status_counts.entry(status_code).or_insert(0) += 1;
    }

    pub(crate) fn add_bytes_downloaded(&self, bytes: usize) {
        self.total_bytes_downloaded
            .fetch_add(bytes, Ordering::SeqCst);
    }

    pub(crate) fn increment_preprocess_errors(&self) {
        self.preprocess_errors.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_postprocess_errors(&self) {
        self.postprocess_errors.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_jobs_postprocessed(&self) {
        self.jobs_postprocessed.fetch_add(1, Ordering::SeqCst);
    }

    /// Converts the counters into a JSON string.
    pub fn to_json_string(&self) -> Result<String, CrawlError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Converts the counters into a pretty-printed JSON string.
    pub fn to_json_string_pretty(&self) -> Result<String, CrawlError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for StatCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StatCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();

        writeln!(f, "\nCrawl Statistics")?;
        writeln!(f, "----------------")?;
        writeln!(f, "  duration : {:?}", snapshot.elapsed_duration)?;
        writeln!(f, "  speed    : {:.2} job/s", snapshot.jobs_per_second())?;
        writeln!(
            f,
            "  admission: admitted: {}, deduplicated: {}",
            snapshot.jobs_admitted, snapshot.jobs_deduplicated
        )?;
        writeln!(
            f,
            "  fetches  : ok: {}, failed: {}, downloaded: {}",
            snapshot.fetches_succeeded,
            snapshot.fetches_failed,
            snapshot.formatted_bytes()
        )?;
        writeln!(
            f,
            "  pipeline : postprocessed: {}, preprocess errors: {}, postprocess errors: {}",
            snapshot.jobs_postprocessed, snapshot.preprocess_errors, snapshot.postprocess_errors
        )?;

        let status_string = if snapshot.response_status_counts.is_empty() {
            "none".to_string()
        } else {
            snapshot
                .response_status_counts
                .iter()
                .map(|(code, count)| format!("{}: {}", code, count))
                .collect::<Vec<String>>()
                .join(", ")
        };

        writeln!(f, "  status   : {}\n", status_string)
    }
}
