//! Test utilities for gomodlab
//!
//! This crate provides shared testing utilities used across the gomodlab workspace.

pub mod fixtures;
pub mod mock;

pub use fixtures::{PNG_HEADER, module_zip, write_mirror_module};
pub use mock::FakeProxy;

use tempfile::TempDir;

/// Creates a temporary directory within `.tmp/` at the project root
///
/// # Panics
///
/// Panics if the current directory is unknown or `.tmp/` cannot be created
pub fn temp_dir_in_workspace() -> TempDir {
    let workspace_root = std::env::current_dir().expect("Failed to get current directory");

    let tmp_base = workspace_root.join(".tmp");

    // Ensure .tmp/ exists
    std::fs::create_dir_all(&tmp_base).expect("Failed to create .tmp directory");

    TempDir::new_in(&tmp_base).expect("Failed to create temporary directory in .tmp/")
}
