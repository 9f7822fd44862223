//! # Fetcher Module
//!
//! The outbound HTTP seam of the engine.
//!
//! The engine never talks to the network directly; it delegates every request
//! to an injected [`Fetcher`]. The default implementation wraps a shared
//! `reqwest::Client`, which is safe for concurrent use across worker slots.
//! Tests inject their own implementation instead of touching the network.

use crate::error::CrawlError;
use crate::job::{Job, JobResponse};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Performs the network fetch for one job.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Executes the request described by `job` and returns the response.
    ///
    /// Implementations must be safe for concurrent use: the engine invokes
    /// this from up to `worker_count` tasks at once.
    async fn fetch(&self, job: &Job) -> Result<JobResponse, CrawlError>;
}

#[async_trait]
impl<F: Fetcher + ?Sized> Fetcher for Arc<F> {
    async fn fetch(&self, job: &Job) -> Result<JobResponse, CrawlError> {
        (**self).fetch(job).await
    }
}

/// Default `Fetcher` backed by a shared `reqwest::Client`.
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Builds a fetcher whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, CrawlError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(ReqwestFetcher { client })
    }

    /// Wraps an existing client, e.g. one with custom TLS or proxy settings.
    pub fn with_client(client: reqwest::Client) -> Self {
        ReqwestFetcher { client }
    }

    fn header_map(headers: &HashMap<String, String>) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    map.insert(name, value);
                }
                _ => warn!("skipping malformed header: {}", name),
            }
        }
        map
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, job: &Job) -> Result<JobResponse, CrawlError> {
        let response = self
            .client
            .request(job.method().clone(), job.url().clone())
            .query(job.params())
            .headers(Self::header_map(job.headers()))
            .send()
            .await?;

        let status = response.status();
        let url = response.url().clone();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        Ok(JobResponse {
            status,
            url,
            headers,
            body,
        })
    }
}
