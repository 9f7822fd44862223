//! # crawl-engine
//!
//! A bounded-concurrency crawl engine: fetches units of work (jobs) over
//! HTTP through a pool of M workers, decouples fetch parallelism from a
//! single sequential post-processing pipeline via a bounded output queue of
//! capacity P, supports jobs dynamically discovering further jobs, and
//! terminates deterministically once no work remains.
//!
//! The engine owns scheduling, deduplicating admission, backpressure, and
//! shutdown. Everything site-specific lives behind the [`Spider`] contract:
//! seed jobs, a hook run in the worker right after the fetch (`preprocess`),
//! and a terminal hook run sequentially in completion order (`postprocess`).
//!
//! ## Example
//!
//! ```rust,ignore
//! use crawl_engine::{CrawlError, CrawlerBuilder, CrawlerHandle, Job, Spider};
//!
//! struct MySpider;
//!
//! #[crawl_engine::async_trait]
//! impl Spider for MySpider {
//!     fn seed_jobs(&self) -> Vec<Job> {
//!         vec![Job::from_url_str("https://example.com/").unwrap()]
//!     }
//!
//!     async fn preprocess(&self, job: &mut Job, crawler: &CrawlerHandle) -> Result<(), CrawlError> {
//!         Ok(())
//!     }
//!
//!     async fn postprocess(&self, job: Job, _crawler: &CrawlerHandle) -> Result<(), CrawlError> {
//!         println!("{}", job);
//!         Ok(())
//!     }
//! }
//!
//! async fn run() -> Result<(), CrawlError> {
//!     CrawlerBuilder::new(MySpider).worker_count(4).build()?.start().await
//! }
//! ```

pub mod builder;
pub mod crawler;
pub mod error;
pub mod fetcher;
pub mod job;
pub mod prelude;
pub mod scheduler;
pub mod spider;
pub mod state;
pub mod stats;

pub use builder::{CrawlerBuilder, CrawlerConfig};
pub use crawler::Crawler;
pub use error::CrawlError;
pub use fetcher::{Fetcher, ReqwestFetcher};
pub use job::{Job, JobResponse};
pub use scheduler::{CrawlerHandle, Scheduler};
pub use spider::Spider;
pub use stats::StatCollector;

pub use async_trait::async_trait;
pub use reqwest::Method;
pub use tokio;
pub use url::Url;
