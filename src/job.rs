//! # Job Module
//!
//! Defines the `Job`, the unit of fetchable work flowing through the engine.
//!
//! A job is an immutable request descriptor (URL, method, parameters, headers,
//! opaque metadata) that accumulates a response or a fetch error exactly once
//! after execution. Identity is derived from the URL and the ordered parameter
//! set only; two jobs with the same URL and parameters are the same unit of
//! work regardless of headers, metadata, or method.

use crate::error::CrawlError;
use reqwest::{Method, StatusCode};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use url::Url;

/// The response captured for a completed fetch.
///
/// Non-2xx statuses are still successful fetches as far as the engine is
/// concerned; only transport failures are treated as errors.
#[derive(Debug, Clone)]
pub struct JobResponse {
    /// HTTP status of the response.
    pub status: StatusCode,
    /// Final URL after any redirects.
    pub url: Url,
    /// Response headers, flattened to strings.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: String,
}

impl JobResponse {
    pub fn new(status: StatusCode, url: Url, body: impl Into<String>) -> Self {
        JobResponse {
            status,
            url,
            headers: HashMap::new(),
            body: body.into(),
        }
    }
}

/// One unit of fetchable work.
#[derive(Debug)]
pub struct Job {
    url: Url,
    method: Method,
    params: BTreeMap<String, String>,
    headers: HashMap<String, String>,
    meta: Option<serde_json::Value>,
    response: Option<JobResponse>,
    error: Option<CrawlError>,
}

impl Job {
    /// Creates a job with the given URL and method.
    pub fn new(url: Url, method: Method) -> Self {
        Job {
            url,
            method,
            params: BTreeMap::new(),
            headers: HashMap::new(),
            meta: None,
            response: None,
            error: None,
        }
    }

    /// Creates a GET job for the given URL.
    pub fn get(url: Url) -> Self {
        Job::new(url, Method::GET)
    }

    /// Parses the URL and creates a GET job for it.
    pub fn from_url_str(url: &str) -> Result<Self, CrawlError> {
        Ok(Job::get(Url::parse(url)?))
    }

    /// Replaces the job's parameter set.
    pub fn with_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params = params;
        self
    }

    /// Adds a single request parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Adds a per-job header, overriding any contract default of the same name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attaches opaque metadata. The engine never inspects it.
    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn meta(&self) -> Option<&serde_json::Value> {
        self.meta.as_ref()
    }

    /// The response, present once the fetch succeeded.
    pub fn response(&self) -> Option<&JobResponse> {
        self.response.as_ref()
    }

    /// The fetch error, present once the fetch failed.
    pub fn error(&self) -> Option<&CrawlError> {
        self.error.as_ref()
    }

    /// Stable identity over (url, ordered parameter set).
    ///
    /// Headers, metadata, and method are deliberately excluded: two jobs for
    /// the same URL and parameters are the same unit of work.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.url.as_str().as_bytes());
        for (key, value) in &self.params {
            hasher.update(b"\x1f");
            hasher.update(key.as_bytes());
            hasher.update(b"\x1e");
            hasher.update(value.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    /// Merges contract-level default headers beneath per-job overrides.
    pub(crate) fn merge_default_headers(&mut self, defaults: &HashMap<String, String>) {
        for (name, value) in defaults {
            self.headers
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
    }

    /// One-time attachment of the fetch response.
    pub(crate) fn attach_response(&mut self, response: JobResponse) {
        debug_assert!(self.response.is_none() && self.error.is_none());
        self.response = Some(response);
    }

    /// One-time attachment of the fetch error.
    pub(crate) fn attach_error(&mut self, error: CrawlError) {
        debug_assert!(self.response.is_none() && self.error.is_none());
        self.error = Some(error);
    }
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url && self.params == other.params
    }
}

impl Eq for Job {}

impl Hash for Job {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
        self.params.hash(state);
    }
}

impl From<Url> for Job {
    fn from(url: Url) -> Self {
        Job::get(url)
    }
}

impl std::fmt::Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.url)?;
        if !self.params.is_empty() {
            write!(f, " params={:?}", self.params)?;
        }
        match (&self.response, &self.error) {
            (Some(resp), _) => write!(f, " [done, {}]", resp.status),
            (None, Some(err)) => write!(f, " [failed: {}]", err),
            (None, None) => write!(f, " [pending]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn fingerprint_covers_url_and_params_only() {
        let a = Job::get(url("https://example.com/page"))
            .with_param("p", "1")
            .with_header("x-custom", "a");
        let b = Job::new(url("https://example.com/page"), Method::POST)
            .with_param("p", "1")
            .with_meta(serde_json::json!({"k": "v"}));
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a, b);

        let c = Job::get(url("https://example.com/page")).with_param("p", "2");
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_ne!(a, c);
    }

    #[test]
    fn fingerprint_is_order_independent_for_params() {
        let a = Job::get(url("https://example.com/"))
            .with_param("a", "1")
            .with_param("b", "2");
        let b = Job::get(url("https://example.com/"))
            .with_param("b", "2")
            .with_param("a", "1");
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn param_separators_prevent_boundary_collisions() {
        let a = Job::get(url("https://example.com/")).with_param("ab", "c");
        let b = Job::get(url("https://example.com/")).with_param("a", "bc");
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn default_headers_merge_beneath_overrides() {
        let mut job = Job::get(url("https://example.com/")).with_header("user-agent", "custom");
        let mut defaults = HashMap::new();
        defaults.insert("user-agent".to_string(), "default".to_string());
        defaults.insert("accept".to_string(), "text/html".to_string());
        job.merge_default_headers(&defaults);

        assert_eq!(job.headers()["user-agent"], "custom");
        assert_eq!(job.headers()["accept"], "text/html");
    }

    #[test]
    fn display_reflects_lifecycle() {
        let mut job = Job::get(url("https://example.com/"));
        assert!(job.to_string().contains("[pending]"));
        job.attach_response(JobResponse::new(
            StatusCode::OK,
            url("https://example.com/"),
            "body",
        ));
        assert!(job.to_string().contains("[done"));
    }
}
