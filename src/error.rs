//! Error types for the crawl engine.
//!
//! The engine distinguishes three failure classes: transport errors (caught at
//! the worker, attached to the job, never fatal), hook errors (caught at the
//! call site, logged, never fatal), and configuration errors (fatal, surfaced
//! at construction before any crawling starts).

use thiserror::Error;

/// All errors produced by the crawl engine.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Invalid construction parameters. Fatal, raised by the builder.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Transport-level fetch failure (connect, timeout, body read).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// A job URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Serialization failure (stats export, metadata handling).
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal engine failure, e.g. a closed channel during a run.
    #[error("internal error: {0}")]
    Internal(String),
}
