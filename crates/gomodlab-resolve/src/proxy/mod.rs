//! Go module proxy interaction
//!
//! This module provides everything needed to talk to a GOPROXY endpoint:
//! - HTTP client construction with user-agent
//! - Case-escaped module path encoding and endpoint URLs
//! - Bounded, cancellable downloads
//! - The four proxy read operations

pub mod client;
pub mod download;
pub mod registry;
pub mod url;

// Re-exports for convenient access
pub use client::{build_client, build_default_client};
pub use download::{FetchOptions, fetch_bounded};
pub use registry::{ProxyClient, parse_latest_version};
pub use url::{encode_path, module_endpoint};
