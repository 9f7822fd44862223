//! # Builder Module
//!
//! Provides the `CrawlerBuilder`, a fluent API for constructing and
//! configuring `Crawler` instances.
//!
//! ## Overview
//!
//! The builder assembles the engine around a spider: worker pool size,
//! output-queue capacity, per-fetch timeout, and an optional custom
//! [`Fetcher`]. Invalid parameters are rejected here, before any crawling
//! starts; a run never begins with a broken configuration.
//!
//! ## Example
//!
//! ```rust,ignore
//! use crawl_engine::CrawlerBuilder;
//! use std::time::Duration;
//!
//! async fn run() -> Result<(), crawl_engine::CrawlError> {
//!     let crawler = CrawlerBuilder::new(MySpider)
//!         .worker_count(8)
//!         .pipeline_capacity(200)
//!         .fetch_timeout(Duration::from_secs(5))
//!         .build()?;
//!     crawler.start().await
//! }
//! ```

use crate::crawler::Crawler;
use crate::error::CrawlError;
use crate::fetcher::{Fetcher, ReqwestFetcher};
use crate::scheduler::Scheduler;
use crate::spider::Spider;
use crate::stats::StatCollector;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for one crawl run.
pub struct CrawlerConfig {
    /// Size M of the worker pool: the maximum number of concurrent fetches.
    pub worker_count: usize,
    /// Capacity P of the output queue; the system's sole backpressure bound.
    pub pipeline_capacity: usize,
    /// Timeout applied to each individual fetch.
    pub fetch_timeout: Duration,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        CrawlerConfig {
            worker_count: 4,
            pipeline_capacity: 100,
            fetch_timeout: Duration::from_secs(2),
        }
    }
}

pub struct CrawlerBuilder<S: Spider> {
    config: CrawlerConfig,
    spider: S,
    fetcher: Option<Arc<dyn Fetcher>>,
}

impl<S: Spider> CrawlerBuilder<S> {
    /// Creates a builder for the given spider with default configuration.
    pub fn new(spider: S) -> Self {
        CrawlerBuilder {
            config: CrawlerConfig::default(),
            spider,
            fetcher: None,
        }
    }

    /// Sets the worker pool size M.
    pub fn worker_count(mut self, count: usize) -> Self {
        self.config.worker_count = count;
        self
    }

    /// Sets the output queue capacity P.
    pub fn pipeline_capacity(mut self, capacity: usize) -> Self {
        self.config.pipeline_capacity = capacity;
        self
    }

    /// Sets the per-fetch timeout.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch_timeout = timeout;
        self
    }

    /// Replaces the default HTTP fetcher.
    pub fn fetcher<F>(mut self, fetcher: F) -> Self
    where
        F: Fetcher + 'static,
    {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    /// Validates the configuration and assembles the `Crawler`.
    pub fn build(self) -> Result<Crawler<S>, CrawlError> {
        self.validate()?;

        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(ReqwestFetcher::new(self.config.fetch_timeout)?),
        };

        let stats = Arc::new(StatCollector::default());
        let scheduler = Scheduler::new(self.spider.default_headers(), Arc::clone(&stats));

        Ok(Crawler::new(
            scheduler,
            Arc::new(self.spider),
            fetcher,
            self.config,
            stats,
        ))
    }

    fn validate(&self) -> Result<(), CrawlError> {
        if self.config.worker_count == 0 {
            return Err(CrawlError::Configuration(
                "worker_count must be greater than 0".to_string(),
            ));
        }
        if self.config.pipeline_capacity == 0 {
            return Err(CrawlError::Configuration(
                "pipeline_capacity must be greater than 0".to_string(),
            ));
        }
        if self.config.fetch_timeout.is_zero() {
            return Err(CrawlError::Configuration(
                "fetch_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
