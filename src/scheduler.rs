//! # Scheduler Module
//!
//! Implements job admission: the pending-job queue and duplicate detection.
//!
//! ## Overview
//!
//! The `Scheduler` owns the unbounded FIFO of pending jobs and the admission
//! set of every fingerprint accepted during this run. Admission is a single
//! atomic check-and-insert against the set, so concurrent enqueues from
//! multiple workers' `preprocess` calls and the pipeline's `postprocess` are
//! safe; a job whose fingerprint was already admitted is silently dropped and
//! never fetched twice.
//!
//! Both structures are owned per crawl run. Nothing here is process-global,
//! so independent runs never share admission state.
//!
//! [`CrawlerHandle`] is the cloneable admission surface handed to spider
//! hooks; it is how a job discovered mid-crawl feeds back into the queue.

use crate::error::CrawlError;
use crate::job::Job;
use crate::stats::StatCollector;
use dashmap::DashSet;
use kanal::{AsyncReceiver, AsyncSender, unbounded_async};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, trace};

pub struct Scheduler {
    job_tx: AsyncSender<Job>,
    job_rx: AsyncReceiver<Job>,
    admitted: DashSet<String>,
    default_headers: HashMap<String, String>,
    progress: Arc<Notify>,
    stats: Arc<StatCollector>,
}

impl Scheduler {
    /// Creates a scheduler with an empty queue and admission set.
    pub(crate) fn new(
        default_headers: HashMap<String, String>,
        stats: Arc<StatCollector>,
    ) -> Arc<Self> {
        let (job_tx, job_rx) = unbounded_async();
        Arc::new(Scheduler {
            job_tx,
            job_rx,
            admitted: DashSet::new(),
            default_headers,
            progress: Arc::new(Notify::new()),
            stats,
        })
    }

    /// Admits a job to the queue, subject to deduplication.
    ///
    /// Contract default headers are merged in beneath the job's own headers.
    /// Identity covers only (url, params), so the merge cannot affect dedup.
    pub async fn enqueue_job(&self, mut job: Job) -> Result<(), CrawlError> {
        job.merge_default_headers(&self.default_headers);

        let fingerprint = job.fingerprint();
        if !self.admitted.insert(fingerprint) {
            trace!("duplicate job dropped at admission: {}", job);
            self.stats.increment_jobs_deduplicated();
            return Ok(());
        }

        debug!("admitting job: {}", job);
        self.job_tx
            .send(job)
            .await
            .map_err(|_| CrawlError::Internal("job queue closed during admission".into()))?;
        self.stats.increment_jobs_admitted();
        self.progress.notify_one();
        Ok(())
    }

    /// Non-blocking pop of the next pending job, in admission order.
    pub(crate) fn try_next_job(&self) -> Result<Option<Job>, CrawlError> {
        self.job_rx
            .try_recv()
            .map_err(|_| CrawlError::Internal("job queue closed".into()))
    }

    /// Signal handle woken on every admission, worker finish, and
    /// postprocess finish.
    pub(crate) fn progress(&self) -> Arc<Notify> {
        Arc::clone(&self.progress)
    }

    /// Number of jobs waiting in the queue.
    #[inline]
    pub fn len(&self) -> usize {
        self.job_rx.len()
    }

    /// Checks if the queue has no pending jobs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cloneable admission surface handed to spider hooks.
///
/// Allows one more job to be admitted at any time during the run; duplicates
/// are silently dropped.
#[derive(Clone)]
pub struct CrawlerHandle {
    scheduler: Arc<Scheduler>,
}

impl CrawlerHandle {
    pub(crate) fn new(scheduler: Arc<Scheduler>) -> Self {
        CrawlerHandle { scheduler }
    }

    /// Admits one more job. Accepts anything convertible into a [`Job`],
    /// e.g. a bare `Url` for a GET job.
    pub async fn add_job(&self, job: impl Into<Job> + Send) -> Result<(), CrawlError> {
        self.scheduler.enqueue_job(job.into()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn scheduler() -> Arc<Scheduler> {
        Scheduler::new(HashMap::new(), Arc::new(StatCollector::default()))
    }

    #[tokio::test]
    async fn admission_is_fifo() {
        let scheduler = scheduler();
        for path in ["a", "b", "c"] {
            let url = Url::parse(&format!("https://example.com/{path}")).unwrap();
            scheduler.enqueue_job(Job::get(url)).await.unwrap();
        }

        let order: Vec<String> = std::iter::from_fn(|| scheduler.try_next_job().unwrap())
            .map(|job| job.url().path().to_string())
            .collect();
        assert_eq!(order, ["/a", "/b", "/c"]);
    }

    #[tokio::test]
    async fn duplicate_fingerprints_are_dropped() {
        let scheduler = scheduler();
        let url = Url::parse("https://example.com/page").unwrap();

        scheduler
            .enqueue_job(Job::get(url.clone()).with_param("p", "1"))
            .await
            .unwrap();
        // Same identity, different headers: must not be admitted again.
        scheduler
            .enqueue_job(
                Job::get(url.clone())
                    .with_param("p", "1")
                    .with_header("x-a", "b"),
            )
            .await
            .unwrap();
        // Different params: a distinct unit of work.
        scheduler
            .enqueue_job(Job::get(url).with_param("p", "2"))
            .await
            .unwrap();

        assert_eq!(scheduler.len(), 2);
    }

    #[tokio::test]
    async fn default_headers_applied_at_admission() {
        let mut defaults = HashMap::new();
        defaults.insert("user-agent".to_string(), "crawl-engine".to_string());
        let scheduler = Scheduler::new(defaults, Arc::new(StatCollector::default()));

        scheduler
            .enqueue_job(Job::from_url_str("https://example.com/").unwrap())
            .await
            .unwrap();
        let job = scheduler.try_next_job().unwrap().unwrap();
        assert_eq!(job.headers()["user-agent"], "crawl-engine");
    }
}
