//! The sequential post-processing pipeline.
//!
//! A single consumer task pops completed jobs from the output queue in
//! arrival order and applies the terminal `postprocess` hook, one job at a
//! time. Hook failures and panics are logged and the pipeline moves on; a
//! faulty hook never halts the run. The task exits once the output queue is
//! closed and drained, which is how the dispatch loop's shutdown wait
//! completes.

use crate::job::Job;
use crate::scheduler::CrawlerHandle;
use crate::spider::Spider;
use crate::state::CrawlerState;
use crate::stats::StatCollector;
use futures::FutureExt;
use kanal::AsyncReceiver;
use log::{debug, error, trace};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::Notify;

pub(crate) fn spawn_pipeline_task<S: Spider>(
    spider: Arc<S>,
    handle: CrawlerHandle,
    out_rx: AsyncReceiver<Job>,
    state: Arc<CrawlerState>,
    stats: Arc<StatCollector>,
    progress: Arc<Notify>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        trace!("pipeline started");

        while let Ok(job) = out_rx.recv().await {
            trace!("postprocessing: {}", job);
            let url = job.url().clone();
            // A panicking hook must not kill this task: with the single
            // consumer gone, workers would block forever on a full output
            // queue. Contain it and move to the next job.
            match AssertUnwindSafe(spider.postprocess(job, &handle))
                .catch_unwind()
                .await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!("postprocess error for {}: {}", url, e);
                    stats.increment_postprocess_errors();
                }
                Err(_) => {
                    error!("postprocess panicked for {}", url);
                    stats.increment_postprocess_errors();
                }
            }
            stats.increment_jobs_postprocessed();

            // Any jobs the hook enqueued are already in the queue by the
            // time this counter drops, so the run extends rather than ends.
            state.pending_results.fetch_sub(1, Ordering::SeqCst);
            progress.notify_one();
        }

        debug!("pipeline finished: output queue closed and drained");
    })
}
