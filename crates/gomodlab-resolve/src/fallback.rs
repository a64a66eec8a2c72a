//! Local workspace suggestions for modules the proxy does not know

use std::path::{Path, PathBuf};

/// Looks for a checkout of a module under a local workspace root
#[derive(Debug, Clone, Default)]
pub struct LocalFallback {
    base_dir: Option<PathBuf>,
}

impl LocalFallback {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Returns a suggestion pointing at `<base>/<last segment>` if that directory exists
    pub fn suggest(&self, module: &str) -> Option<String> {
        let base = self.base_dir.as_ref()?;
        let name = last_path_segment(module);

        // Only a plain name stays directly under the base directory
        if matches!(name, "" | "." | "..") || name.contains('\\') {
            return None;
        }

        let dir = base.join(name);

        if !dir.is_dir() {
            return None;
        }

        let dir = std::path::absolute(&dir).unwrap_or(dir);
        Some(format!(
            "Module {:?} is not available on the Go module proxy, \
             but a local directory exists at {} that may contain its source. \
             You can use your file tools to browse it.",
            module,
            dir.display()
        ))
    }
}

/// `golang.org/x/tools` -> `tools`
pub fn last_path_segment(module: &str) -> &str {
    module.rsplit_once('/').map_or(module, |(_, last)| last)
}
