//! Go module source resolution for gomodlab.
//!
//! This crate answers four read-only questions about Go modules (which
//! versions exist, what a version's go.mod says, which files it contains,
//! and what a file contains) by combining a local module cache, an
//! in-memory archive cache and a GOPROXY endpoint.
//!
//! # Architecture
//!
//! - [`proxy`]: Path encoding and the bounded proxy client
//! - [`archive`]: Parsed module zips shared across calls
//! - [`mirror`]: Extracted modules under `$GOMODCACHE`
//! - [`fallback`]: Local checkout suggestions for unknown modules
//! - [`resolver`]: Tier ordering across the above
//! - [`render`]: Named operations and their text output
//!
//! # Resolution Flow
//!
//! ```text
//! call(operation)
//!     ↓
//! 1. Resolve "latest" alias via @latest
//!     ↓
//! 2. Try module cache
//!     → {GOMODCACHE}/{encoded module}@{version}/
//!     ↓ (absent)
//! 3. Try archive cache
//!     → download {proxy}/{encoded module}/@v/{version}.zip once
//!     ↓ (list versions only, proxy says not found)
//! 4. Suggest {local dir}/{last path segment} if it exists
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use gomodlab_core::Config;
//! use gomodlab_resolve::{ArchiveCache, FetchOptions, ModuleResolver, Operation};
//! use std::sync::Arc;
//!
//! # fn main() -> gomodlab_core::Result<()> {
//! let config = Config::default().apply_env();
//! let resolver = ModuleResolver::from_config(&config, Arc::new(ArchiveCache::new()))?;
//!
//! let output = resolver.call(
//!     &Operation::ReadFile {
//!         module: "golang.org/x/text".to_string(),
//!         version: "latest".to_string(),
//!         path: "doc.go".to_string(),
//!     },
//!     &FetchOptions::default(),
//! );
//! println!("{}", output.text);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod fallback;
pub mod mirror;
pub mod proxy;
pub mod render;
pub mod resolver;

pub use archive::{ArchiveCache, ArchiveEntry};
pub use fallback::LocalFallback;
pub use mirror::LocalMirror;
pub use proxy::{FetchOptions, ProxyClient, encode_path};
pub use render::{Operation, ToolOutput};
pub use resolver::{FileContent, FileListing, ManifestContent, ModuleResolver, Tier, VersionListing};
