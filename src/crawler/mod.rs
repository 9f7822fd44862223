//! # Crawler Module
//!
//! Implements the engine that drives a crawl from seed jobs to shutdown.
//!
//! ## Overview
//!
//! The crawler ties together the scheduler (admission and the pending-job
//! queue), the bounded worker pool performing fetches, and the single
//! sequential pipeline applying the terminal hook. The three roles run as
//! separate Tokio tasks communicating over async channels; the bounded
//! output channel between workers and the pipeline is the system's
//! backpressure mechanism.
//!
//! ## Internal components
//!
//! - `run_job`: one worker execution, fetch plus the worker-side hook
//! - `spawn_pipeline_task`: the sequential post-processing consumer

mod core;
mod pipeline;
mod worker;

pub use core::Crawler;
pub(crate) use pipeline::spawn_pipeline_task;
pub(crate) use worker::run_job;
