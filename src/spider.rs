//! # Spider Module
//!
//! Defines the `Spider` trait, the work contract an external collaborator
//! plugs into the engine.
//!
//! ## Overview
//!
//! A spider supplies the initial jobs and reacts to each job twice: once in
//! the worker right after its fetch completes (`preprocess`, the place for
//! cheap work such as discovering extra pages from pagination metadata), and
//! once in the sequential pipeline (`postprocess`, the place for the heavier
//! non-network work such as parsing and persistence). Both hooks may enqueue
//! further jobs through the [`CrawlerHandle`] they receive; those jobs pass
//! through the same deduplicating admission path as the seeds.
//!
//! Both hooks are required methods, so a contract that does not implement
//! them fails at compile time rather than at runtime.
//!
//! ## Example
//!
//! ```rust,ignore
//! use crawl_engine::{CrawlError, CrawlerHandle, Job, Spider};
//! use async_trait::async_trait;
//!
//! struct ListingSpider;
//!
//! #[async_trait]
//! impl Spider for ListingSpider {
//!     fn seed_jobs(&self) -> Vec<Job> {
//!         vec![Job::from_url_str("https://example.com/listings").unwrap()]
//!     }
//!
//!     async fn preprocess(&self, job: &mut Job, crawler: &CrawlerHandle) -> Result<(), CrawlError> {
//!         // Inspect the first page and enqueue the remaining ones.
//!         // crawler.add_job(...)?;
//!         Ok(())
//!     }
//!
//!     async fn postprocess(&self, job: Job, _crawler: &CrawlerHandle) -> Result<(), CrawlError> {
//!         // Parse records out of job.response() and persist them.
//!         Ok(())
//!     }
//! }
//! ```

use crate::error::CrawlError;
use crate::job::Job;
use crate::scheduler::CrawlerHandle;
use async_trait::async_trait;
use std::collections::HashMap;

/// The behavior plugged into the engine: job seeding and the two per-job hooks.
#[async_trait]
pub trait Spider: Send + Sync + 'static {
    /// The initial jobs to admit when the crawl starts.
    fn seed_jobs(&self) -> Vec<Job> {
        Vec::new()
    }

    /// Headers merged into every admitted job beneath per-job overrides.
    fn default_headers(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Invoked in the worker after the fetch succeeds, before the job enters
    /// the output queue. Runs concurrently across worker slots. An `Err` or a
    /// panic is logged and the job is still forwarded to the pipeline.
    async fn preprocess(&self, job: &mut Job, crawler: &CrawlerHandle) -> Result<(), CrawlError>;

    /// Invoked by the pipeline, one job at a time, in completion order. This
    /// is the terminal handling step; the engine drops the job afterwards.
    /// An `Err` or a panic is logged and the pipeline continues with the
    /// next job.
    async fn postprocess(&self, job: Job, crawler: &CrawlerHandle) -> Result<(), CrawlError>;
}
