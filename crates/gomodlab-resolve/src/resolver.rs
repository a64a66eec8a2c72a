//! Tier ordering for the four module operations
//!
//! ```text
//! operation(module, version)
//!     ↓
//! 1. Resolve version ("latest" -> @latest lookup)
//!     ↓
//! 2. Local module cache ($GOMODCACHE/<module>@<version>)
//!     ↓ (absent)
//! 3. Archive cache, downloading the zip on first use
//!     ↓ (proxy says not found)
//! 4. Local workspace suggestion (version listing only)
//! ```

use crate::archive::{ArchiveCache, ArchiveEntry};
use crate::fallback::LocalFallback;
use crate::mirror::LocalMirror;
use crate::proxy::{FetchOptions, ProxyClient};
use gomodlab_core::config::consts;
use gomodlab_core::{Config, GomodlabError, Result};
use serde::Serialize;
use std::sync::Arc;

/// Where a result was served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Extracted module in the local module cache
    ModuleCache,
    /// Parsed zip held in memory (downloaded now or earlier)
    Archive,
    /// Direct proxy endpoint
    Proxy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VersionListing {
    Found {
        module: String,
        versions: Vec<String>,
        /// Raw `@latest` info, absent if that lookup failed
        latest: Option<String>,
    },
    /// The proxy has no record but a local checkout exists
    LocalFallback { module: String, suggestion: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestContent {
    pub module: String,
    pub version: String,
    pub content: String,
    pub tier: Tier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileListing {
    pub module: String,
    pub version: String,
    pub prefix: String,
    /// Sorted
    pub files: Vec<String>,
    pub tier: Tier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileContent {
    pub module: String,
    pub version: String,
    pub path: String,
    pub content: String,
    pub tier: Tier,
}

/// Resolves module operations across the local cache, archive cache and proxy
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    proxy: ProxyClient,
    archives: Arc<ArchiveCache>,
    mirror: LocalMirror,
    fallback: LocalFallback,
}

impl ModuleResolver {
    pub fn new(
        proxy: ProxyClient,
        archives: Arc<ArchiveCache>,
        mirror: LocalMirror,
        fallback: LocalFallback,
    ) -> Self {
        Self {
            proxy,
            archives,
            mirror,
            fallback,
        }
    }

    /// Builds a resolver from configuration, sharing the given archive cache
    pub fn from_config(config: &Config, archives: Arc<ArchiveCache>) -> Result<Self> {
        Ok(Self::new(
            ProxyClient::new(&config.proxy.url)?,
            archives,
            LocalMirror::new(config.mirror.dir.clone()),
            LocalFallback::new(config.fallback.dir.clone()),
        ))
    }

    pub fn archives(&self) -> &Arc<ArchiveCache> {
        &self.archives
    }

    /// Rewrites the case-insensitive `latest` alias to a concrete version
    pub fn resolve_version(&self, module: &str, version: &str, options: &FetchOptions) -> Result<String> {
        if !version.eq_ignore_ascii_case(consts::module::LATEST_ALIAS) {
            return Ok(version.to_string());
        }

        let resolved = self
            .proxy
            .resolve_latest(module, options)
            .map_err(|e| GomodlabError::AliasResolution {
                module: module.to_string(),
                source: Box::new(e),
            })?;

        tracing::debug!("resolved {}@latest to {}", module, resolved);
        Ok(resolved)
    }

    /// Lists known versions; the only operation with a local fallback on not-found
    pub fn list_versions(&self, module: &str, options: &FetchOptions) -> Result<VersionListing> {
        let versions = match self.proxy.list_versions(module, options) {
            Ok(versions) => versions,
            Err(e) if e.is_module_not_found() => {
                return match self.fallback.suggest(module) {
                    Some(suggestion) => {
                        tracing::debug!("{} not on proxy, suggesting local checkout", module);
                        Ok(VersionListing::LocalFallback {
                            module: module.to_string(),
                            suggestion,
                        })
                    }
                    None => Err(e.context(format!("list versions of {}", module))),
                };
            }
            Err(e) => return Err(e.context(format!("list versions of {}", module))),
        };

        let latest = match self.proxy.latest(module, options) {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::warn!("latest info for {} unavailable: {}", module, e);
                None
            }
        };

        Ok(VersionListing::Found {
            module: module.to_string(),
            versions,
            latest,
        })
    }

    /// Reads go.mod, preferring the local module cache
    pub fn read_mod(&self, module: &str, version: &str, options: &FetchOptions) -> Result<ManifestContent> {
        let version = self.resolve_version(module, version, options)?;

        if self.mirror.has_module(module, &version) {
            match self
                .mirror
                .read_file(module, &version, consts::module::MANIFEST_FILE)
            {
                Ok(content) => {
                    return Ok(ManifestContent {
                        module: module.to_string(),
                        version,
                        content,
                        tier: Tier::ModuleCache,
                    });
                }
                Err(e) => {
                    tracing::warn!("go.mod for {}@{} not readable from module cache: {}", module, version, e);
                }
            }
        }

        let content = self
            .proxy
            .read_mod(module, &version, options)
            .map_err(|e| e.context(format!("read go.mod of {}@{}", module, version)))?;

        Ok(ManifestContent {
            module: module.to_string(),
            version,
            content,
            tier: Tier::Proxy,
        })
    }

    /// Lists files of a module version, optionally filtered by path prefix
    pub fn list_files(
        &self,
        module: &str,
        version: &str,
        prefix: Option<&str>,
        options: &FetchOptions,
    ) -> Result<FileListing> {
        let version = self.resolve_version(module, version, options)?;
        let prefix = prefix.unwrap_or_default();

        let listed = if self.mirror.has_module(module, &version) {
            tracing::debug!("listing {}@{} from module cache", module, version);
            self.mirror
                .list_files(module, &version, prefix)
                .map(|files| (files, Tier::ModuleCache))
        } else {
            self.archive(module, &version, options)
                .map(|entry| (entry.list_files(prefix), Tier::Archive))
        };

        let (mut files, tier) =
            listed.map_err(|e| e.context(format!("list files of {}@{}", module, version)))?;

        files.sort();

        Ok(FileListing {
            module: module.to_string(),
            version,
            prefix: prefix.to_string(),
            files,
            tier,
        })
    }

    /// Reads one file of a module version as text
    pub fn read_file(
        &self,
        module: &str,
        version: &str,
        path: &str,
        options: &FetchOptions,
    ) -> Result<FileContent> {
        let version = self.resolve_version(module, version, options)?;

        let read = if self.mirror.has_module(module, &version) {
            tracing::debug!("reading {} of {}@{} from module cache", path, module, version);
            self.mirror
                .read_file(module, &version, path)
                .map(|content| (content, Tier::ModuleCache))
        } else {
            self.archive(module, &version, options)
                .and_then(|entry| entry.read_file(path))
                .map(|content| (content, Tier::Archive))
        };

        let (content, tier) =
            read.map_err(|e| e.context(format!("read {} of {}@{}", path, module, version)))?;

        Ok(FileContent {
            module: module.to_string(),
            version,
            path: path.to_string(),
            content,
            tier,
        })
    }

    fn archive(&self, module: &str, version: &str, options: &FetchOptions) -> Result<Arc<ArchiveEntry>> {
        self.archives
            .get_or_fetch(module, version, || {
                self.proxy
                    .download_zip(module, version, options)
                    .map_err(|e| e.context("download zip"))
            })
            .map_err(|e| match e {
                GomodlabError::CorruptArchive { .. } => e.context("cache zip"),
                other => other,
            })
    }
}
