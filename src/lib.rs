//! YT Converter Client - Rust Implementation
//!
//! Client-side job lifecycle controller for the converter backend: validates
//! source URLs, fetches metadata, submits conversion jobs, and polls for
//! progress, emitting view events on every transition.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod formats;
pub mod validator;

// Re-export main types for easy access
pub use crate::api::{ApiClient, ConvertBackend, JobStatus, JobStatusReport, VideoMetadata};
pub use crate::config::ClientConfig;
pub use crate::controller::{
    JobController, JobProgress, Phase, Snapshot, ViewEvents, DEFAULT_POLL_INTERVAL,
};
pub use crate::error::{ConvertError, NETWORK_ERROR_MESSAGE};
pub use crate::formats::{FormatCatalog, FormatPreset, FormatSelection, Mode};
