//! The core `Crawler` implementation.
//!
//! This module defines the `Crawler` struct, the orchestrator for one crawl
//! run. It seeds admission from the spider, drives the dispatch loop that
//! feeds pending jobs into the bounded worker pool, and detects the terminal
//! condition: the job queue is empty and no job is in flight or awaiting
//! post-processing. It then drains the pool, closes the output queue, waits
//! for the pipeline to finish, and reports completion.
//!
//! Fetch and hook errors never surface from `start`; the engine favors
//! liveness, so a crawl always finishes rather than halting on a bad page.
//! Only construction-time and internal failures are returned to the caller.

use crate::builder::CrawlerConfig;
use crate::crawler::{run_job, spawn_pipeline_task};
use crate::error::CrawlError;
use crate::fetcher::Fetcher;
use crate::scheduler::{CrawlerHandle, Scheduler};
use crate::spider::Spider;
use crate::state::CrawlerState;
use crate::stats::StatCollector;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, trace};

/// Run phases of one crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CrawlPhase {
    Running,
    Draining,
    ShutDown,
}

/// The orchestrator for one crawl run.
pub struct Crawler<S: Spider> {
    scheduler: Arc<Scheduler>,
    spider: Arc<S>,
    fetcher: Arc<dyn Fetcher>,
    config: CrawlerConfig,
    stats: Arc<StatCollector>,
    state: Arc<CrawlerState>,
}

impl<S: Spider> Crawler<S> {
    pub(crate) fn new(
        scheduler: Arc<Scheduler>,
        spider: Arc<S>,
        fetcher: Arc<dyn Fetcher>,
        config: CrawlerConfig,
        stats: Arc<StatCollector>,
    ) -> Self {
        Crawler {
            scheduler,
            spider,
            fetcher,
            config,
            stats,
            state: CrawlerState::new(),
        }
    }

    /// Returns a handle for admitting jobs, usable before or during the run.
    pub fn handle(&self) -> CrawlerHandle {
        CrawlerHandle::new(Arc::clone(&self.scheduler))
    }

    /// Returns the run's statistics collector.
    pub fn stats(&self) -> Arc<StatCollector> {
        Arc::clone(&self.stats)
    }

    /// Runs the crawl to completion.
    ///
    /// Admits the spider's seed jobs, then loops: pending jobs are dispatched
    /// into free worker slots in admission order; when the queue is empty the
    /// loop waits for a progress signal as long as any work is still in
    /// flight, and begins shutdown once nothing is. Returns after the worker
    /// pool is drained and the pipeline has consumed the closed output queue.
    pub async fn start(self) -> Result<(), CrawlError> {
        info!(
            worker_count = self.config.worker_count,
            pipeline_capacity = self.config.pipeline_capacity,
            fetch_timeout = ?self.config.fetch_timeout,
            "crawler starting"
        );

        let Crawler {
            scheduler,
            spider,
            fetcher,
            config,
            stats,
            state,
        } = self;

        let handle = CrawlerHandle::new(Arc::clone(&scheduler));
        let progress = scheduler.progress();

        for job in spider.seed_jobs() {
            scheduler.enqueue_job(job).await?;
        }

        let (out_tx, out_rx) = kanal::bounded_async(config.pipeline_capacity);

        trace!("spawning pipeline task");
        let pipeline_task = spawn_pipeline_task(
            Arc::clone(&spider),
            handle.clone(),
            out_rx,
            Arc::clone(&state),
            Arc::clone(&stats),
            Arc::clone(&progress),
        );

        let pool = Arc::new(Semaphore::new(config.worker_count));
        let mut workers = JoinSet::new();
        let mut phase = CrawlPhase::Running;
        debug!(?phase, "dispatch loop started");

        while phase == CrawlPhase::Running {
            // Reap worker tasks that finished since the last iteration.
            while let Some(res) = workers.try_join_next() {
                if let Err(e) = res {
                    error!("worker task failed: {}", e);
                }
            }

            match scheduler.try_next_job()? {
                Some(job) => {
                    // Awaiting the permit is the pool's own concurrency cap,
                    // distinct from the output queue's backpressure.
                    let permit = Arc::clone(&pool).acquire_owned().await.map_err(|_| {
                        CrawlError::Internal("worker pool semaphore closed".into())
                    })?;

                    trace!("dispatching job: {}", job);
                    state.in_flight_jobs.fetch_add(1, Ordering::SeqCst);
                    workers.spawn(run_job(
                        job,
                        Arc::clone(&spider),
                        Arc::clone(&fetcher),
                        handle.clone(),
                        out_tx.clone(),
                        Arc::clone(&state),
                        Arc::clone(&stats),
                        Arc::clone(&progress),
                        permit,
                    ));
                }
                None => {
                    // Register for the signal before re-checking so a worker
                    // or pipeline finishing in between is not missed.
                    let notified = progress.notified();
                    if state.is_idle() && scheduler.is_empty() {
                        phase = CrawlPhase::Draining;
                    } else {
                        trace!(
                            in_flight = state.in_flight_jobs.load(Ordering::SeqCst),
                            pending = state.pending_results.load(Ordering::SeqCst),
                            "job queue empty, waiting for progress"
                        );
                        notified.await;
                    }
                }
            }
        }

        debug!(?phase, "no pending jobs and no in-flight work");

        // Formality: the idle check already implies the pool is empty.
        while let Some(res) = workers.join_next().await {
            if let Err(e) = res {
                error!("worker task failed during drain: {}", e);
            }
        }

        // All worker clones are gone, so this closes the output queue.
        drop(out_tx);

        trace!("waiting for the pipeline to drain");
        if let Err(e) = pipeline_task.await {
            error!("pipeline task failed: {}", e);
        }

        phase = CrawlPhase::ShutDown;
        info!(?phase, "crawl finished");
        info!("{}", stats);
        Ok(())
    }
}
