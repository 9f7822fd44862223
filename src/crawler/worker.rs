//! The worker execution unit: one fetch plus the worker-side hook.
//!
//! Each dispatched job runs here inside its own task, holding one worker-pool
//! permit. On fetch success the response is attached and `preprocess` runs,
//! with any jobs it enqueues admitted through the normal dedup path. On fetch
//! failure the error is logged and attached; the job is never retried and
//! never dropped. Either way the job is pushed to the output queue exactly
//! once, so the pipeline sees every dispatched job. The bounded push blocks
//! while the pipeline is behind, which keeps this slot occupied and is the
//! engine's backpressure.

use crate::fetcher::Fetcher;
use crate::job::Job;
use crate::scheduler::CrawlerHandle;
use crate::spider::Spider;
use crate::state::CrawlerState;
use crate::stats::StatCollector;
use futures::FutureExt;
use kanal::AsyncSender;
use log::{debug, error, trace};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::{Notify, OwnedSemaphorePermit};

/// Releases the worker's in-flight slot and wakes the dispatch loop when the
/// task ends, whether it ran to completion or unwound. Without the wake-up on
/// unwind the loop would wait for a slot that never frees.
struct SlotGuard {
    state: Arc<CrawlerState>,
    progress: Arc<Notify>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.state.in_flight_jobs.fetch_sub(1, Ordering::SeqCst);
        self.progress.notify_one();
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) async fn run_job<S: Spider>(
    mut job: Job,
    spider: Arc<S>,
    fetcher: Arc<dyn Fetcher>,
    handle: CrawlerHandle,
    out_tx: AsyncSender<Job>,
    state: Arc<CrawlerState>,
    stats: Arc<StatCollector>,
    progress: Arc<Notify>,
    _permit: OwnedSemaphorePermit,
) {
    let _slot = SlotGuard {
        state: Arc::clone(&state),
        progress,
    };
    debug!("worker starting: {}", job);

    match fetcher.fetch(&job).await {
        Ok(response) => {
            trace!("fetch succeeded: {} {}", response.status, response.url);
            stats.increment_fetches_succeeded();
            stats.record_response_status(response.status.as_u16());
            stats.add_bytes_downloaded(response.body.len());
            job.attach_response(response);

            // The hook is collaborator code; a panic inside it must not take
            // the counters or the job down with it.
            match AssertUnwindSafe(spider.preprocess(&mut job, &handle))
                .catch_unwind()
                .await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!("preprocess error for {}: {}", job.url(), e);
                    stats.increment_preprocess_errors();
                }
                Err(_) => {
                    error!("preprocess panicked for {}", job.url());
                    stats.increment_preprocess_errors();
                }
            }
        }
        Err(e) => {
            error!("fetch error for {}: {}", job.url(), e);
            stats.increment_fetches_failed();
            job.attach_error(e);
        }
    }

    // Counted before the push so the dispatch loop cannot observe an idle
    // engine while this job is still owed a postprocess call.
    state.pending_results.fetch_add(1, Ordering::SeqCst);
    if out_tx.send(job).await.is_err() {
        error!("output queue closed, completed job could not be forwarded");
        state.pending_results.fetch_sub(1, Ordering::SeqCst);
    }

    debug!("worker finished");
}
