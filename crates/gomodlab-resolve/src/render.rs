//! Named operations and their text rendering
//!
//! This is the surface a transport (MCP server, CLI, ...) drives: it
//! deserializes an [`Operation`], hands it to [`ModuleResolver::call`],
//! and forwards the resulting [`ToolOutput`].

use crate::proxy::FetchOptions;
use crate::resolver::{FileContent, FileListing, ManifestContent, ModuleResolver, VersionListing};
use gomodlab_core::{ErrorKind, GomodlabError};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tool", content = "arguments")]
pub enum Operation {
    /// List available versions plus the latest version info
    #[serde(rename = "gomod_list_versions")]
    ListVersions { module: String },

    /// Read go.mod; version may be "latest"
    #[serde(rename = "gomod_read_mod")]
    ReadMod { module: String, version: String },

    /// List files, optionally under a path prefix
    #[serde(rename = "gomod_list_files")]
    ListFiles {
        module: String,
        version: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },

    /// Read one source file; binary files are rejected
    #[serde(rename = "gomod_read_file")]
    ReadFile {
        module: String,
        version: String,
        path: String,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ListVersions { .. } => "gomod_list_versions",
            Operation::ReadMod { .. } => "gomod_read_mod",
            Operation::ListFiles { .. } => "gomod_list_files",
            Operation::ReadFile { .. } => "gomod_read_file",
        }
    }

    pub fn module(&self) -> &str {
        match self {
            Operation::ListVersions { module }
            | Operation::ReadMod { module, .. }
            | Operation::ListFiles { module, .. }
            | Operation::ReadFile { module, .. } => module,
        }
    }
}

/// Text result handed back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

impl ModuleResolver {
    /// Runs one operation and renders its outcome
    pub fn call(&self, operation: &Operation, options: &FetchOptions) -> ToolOutput {
        let result = match operation {
            Operation::ListVersions { module } => self
                .list_versions(module, options)
                .map(|listing| render_versions(&listing)),
            Operation::ReadMod { module, version } => self
                .read_mod(module, version, options)
                .map(|manifest| render_manifest(&manifest)),
            Operation::ListFiles {
                module,
                version,
                path,
            } => self
                .list_files(module, version, path.as_deref(), options)
                .map(|listing| render_file_listing(&listing)),
            Operation::ReadFile {
                module,
                version,
                path,
            } => self
                .read_file(module, version, path, options)
                .map(|file| render_file(&file)),
        };

        result.unwrap_or_else(|e| {
            tracing::debug!("{} failed: {}", operation.name(), e);
            render_error(operation, &e)
        })
    }
}

pub fn render_versions(listing: &VersionListing) -> ToolOutput {
    match listing {
        VersionListing::Found {
            module,
            versions,
            latest,
        } => {
            let mut text = format!("Versions of {}:\n", module);
            for version in versions {
                text.push_str(version);
                text.push('\n');
            }
            if let Some(latest) = latest.as_deref().filter(|l| !l.is_empty()) {
                text.push_str("\nLatest info:\n");
                text.push_str(latest);
            }
            ToolOutput::text(text)
        }
        VersionListing::LocalFallback { suggestion, .. } => ToolOutput::text(suggestion.clone()),
    }
}

pub fn render_manifest(manifest: &ManifestContent) -> ToolOutput {
    ToolOutput::text(manifest.content.clone())
}

pub fn render_file_listing(listing: &FileListing) -> ToolOutput {
    let mut text = format!("Files in {}@{}", listing.module, listing.version);
    if !listing.prefix.is_empty() {
        let _ = write!(text, " (prefix: {})", listing.prefix);
    }
    let _ = writeln!(text, " ({} files):", listing.files.len());

    for file in &listing.files {
        text.push_str(file);
        text.push('\n');
    }

    ToolOutput::text(text)
}

pub fn render_file(file: &FileContent) -> ToolOutput {
    ToolOutput::text(file.content.clone())
}

/// Version listing turns not-found into a fixed message; everything else shows the error chain
pub fn render_error(operation: &Operation, error: &GomodlabError) -> ToolOutput {
    if matches!(operation, Operation::ListVersions { .. }) && error.kind() == ErrorKind::NotFound {
        return ToolOutput::error(format!(
            "Module {:?} not found on the Go module proxy.",
            operation.module()
        ));
    }
    ToolOutput::error(error.to_string())
}
