//! A "prelude" for users of the `crawl-engine` crate.
//!
//! Re-exports the most commonly used types and traits so they can be
//! imported in one line.
//!
//! # Example
//!
//! ```
//! use crawl_engine::prelude::*;
//! ```

pub use crate::{
    // Core structs
    Crawler,
    CrawlerBuilder,
    CrawlerHandle,
    Job,
    JobResponse,
    // Core traits
    Fetcher,
    Spider,
    // Errors
    CrawlError,
    // Essential re-exports for trait implementation
    Method,
    Url,
    async_trait,
};
