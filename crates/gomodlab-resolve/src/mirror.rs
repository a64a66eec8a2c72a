//! Read-only access to the local Go module cache (`$GOMODCACHE`)
//!
//! `go mod download` leaves each module version extracted at
//! `<root>/<encoded module>@<version>/`. When that directory exists the
//! resolver serves files from it and skips the network entirely.

use crate::proxy::encode_path;
use gomodlab_core::text::decode_text;
use gomodlab_core::{GomodlabError, Result};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Default)]
pub struct LocalMirror {
    root: Option<PathBuf>,
}

impl LocalMirror {
    /// Creates a mirror rooted at `root`; `None` disables every lookup
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    pub fn disabled() -> Self {
        Self { root: None }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// On-disk directory for a module version, whether or not it exists
    ///
    /// Returns `None` when the module path or version could name a
    /// directory outside the cache root.
    pub fn module_dir(&self, module: &str, version: &str) -> Option<PathBuf> {
        if !is_plain_module(module) || !is_plain_version(version) {
            return None;
        }

        self.root
            .as_ref()
            .map(|root| root.join(format!("{}@{}", encode_path(module), version)))
    }

    /// True if the module version directory exists and is a directory
    pub fn has_module(&self, module: &str, version: &str) -> bool {
        self.module_dir(module, version)
            .is_some_and(|dir| dir.is_dir())
    }

    /// Lists regular files relative to the module root, with `/` separators
    ///
    /// # Errors
    ///
    /// Returns error if the module is absent or any part of the walk fails
    pub fn list_files(&self, module: &str, version: &str, prefix: &str) -> Result<Vec<String>> {
        let root = self.existing_dir(module, version)?;
        let mut files = Vec::new();

        for entry in WalkDir::new(&root) {
            let entry = entry.map_err(|e| {
                let context = format!("walk module cache dir {}", root.display());
                match e.into_io_error() {
                    Some(io) => GomodlabError::io(context, io),
                    None => GomodlabError::io(context, std::io::Error::other("filesystem loop")),
                }
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(&root).map_err(|e| {
                GomodlabError::io("compute relative path", std::io::Error::other(e))
            })?;

            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            if relative.starts_with(prefix) {
                files.push(relative);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Reads a file under the module root as text
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - `path` is absolute or climbs out with `..`
    /// - The file does not exist
    /// - The content is not valid UTF-8 (binary file)
    pub fn read_file(&self, module: &str, version: &str, path: &str) -> Result<String> {
        let root = self.existing_dir(module, version)?;
        let relative = safe_relative(path)?;
        let full = root.join(relative);

        if full.is_dir() {
            return Err(GomodlabError::FileNotFound {
                origin: "module cache".to_string(),
                path: path.to_string(),
            });
        }

        let data = std::fs::read(&full).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => GomodlabError::FileNotFound {
                origin: "module cache".to_string(),
                path: path.to_string(),
            },
            _ => GomodlabError::io(format!("read file from module cache: {}", path), e),
        })?;

        decode_text(path, data)
    }

    fn existing_dir(&self, module: &str, version: &str) -> Result<PathBuf> {
        self.module_dir(module, version)
            .filter(|dir| dir.is_dir())
            .ok_or_else(|| GomodlabError::FileNotFound {
                origin: "module cache".to_string(),
                path: format!("{}@{}", module, version),
            })
    }
}

fn is_plain_module(module: &str) -> bool {
    !module.contains('\\')
        && module
            .split('/')
            .all(|segment| !matches!(segment, "" | "." | ".."))
}

fn is_plain_version(version: &str) -> bool {
    !version.is_empty() && !version.contains(['/', '\\'])
}

/// Converts a forward-slash file path into a relative path that cannot escape
///
/// Paths are taken verbatim, the same way archive lookups are: `.` and
/// empty segments name nothing, and `..` or an absolute path is rejected.
fn safe_relative(path: &str) -> Result<PathBuf> {
    let escape = || GomodlabError::PathEscape(path.to_string());
    let not_found = || GomodlabError::FileNotFound {
        origin: "module cache".to_string(),
        path: path.to_string(),
    };

    if Path::new(path).has_root() {
        return Err(escape());
    }

    let mut relative = PathBuf::new();

    for segment in path.split('/') {
        match segment {
            ".." => return Err(escape()),
            "" | "." => return Err(not_found()),
            _ => {}
        }

        // A segment must be exactly one plain component on this platform
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) if part == segment => relative.push(part),
            _ => return Err(escape()),
        }
    }

    Ok(relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gomodlab_core::ErrorKind;
    use gomodlab_testkit::{PNG_HEADER, write_mirror_module};
    use tempfile::TempDir;

    fn mirror_with_module() -> (TempDir, LocalMirror) {
        let temp = tempfile::tempdir().unwrap();
        write_mirror_module(
            temp.path(),
            "example.com/testmod",
            "v1.0.0",
            &[
                ("go.mod", b"module example.com/testmod\n"),
                ("main.go", b"package main\n"),
                ("cmd/run.go", b"package cmd\n"),
                ("logo.png", PNG_HEADER),
            ],
        );
        let mirror = LocalMirror::new(Some(temp.path().to_path_buf()));
        (temp, mirror)
    }

    #[test]
    fn test_has_module() {
        let (_temp, mirror) = mirror_with_module();
        assert!(mirror.has_module("example.com/testmod", "v1.0.0"));
        assert!(!mirror.has_module("example.com/testmod", "v2.0.0"));
        assert!(!mirror.has_module("example.com/other", "v1.0.0"));
    }

    #[test]
    fn test_has_module_requires_directory() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("example.com")).unwrap();
        std::fs::write(temp.path().join("example.com/file@v1.0.0"), "not a dir").unwrap();

        let mirror = LocalMirror::new(Some(temp.path().to_path_buf()));
        assert!(!mirror.has_module("example.com/file", "v1.0.0"));
    }

    #[test]
    fn test_disabled_mirror() {
        let mirror = LocalMirror::disabled();
        assert!(!mirror.has_module("example.com/testmod", "v1.0.0"));
        assert!(mirror.module_dir("example.com/testmod", "v1.0.0").is_none());
    }

    #[test]
    fn test_module_dir_uses_encoded_path() {
        let mirror = LocalMirror::new(Some(PathBuf::from("/cache")));
        assert_eq!(
            mirror.module_dir("github.com/Azure/go-sdk", "v1.0.0").unwrap(),
            PathBuf::from("/cache").join("github.com/!azure/go-sdk@v1.0.0")
        );
    }

    #[test]
    fn test_uppercase_module_found() {
        let temp = tempfile::tempdir().unwrap();
        write_mirror_module(
            temp.path(),
            &encode_path("github.com/BurntSushi/toml"),
            "v1.3.2",
            &[("decode.go", b"package toml\n")],
        );

        let mirror = LocalMirror::new(Some(temp.path().to_path_buf()));
        assert!(mirror.has_module("github.com/BurntSushi/toml", "v1.3.2"));
        assert_eq!(
            mirror
                .read_file("github.com/BurntSushi/toml", "v1.3.2", "decode.go")
                .unwrap(),
            "package toml\n"
        );
    }

    #[test]
    fn test_list_files() {
        let (_temp, mirror) = mirror_with_module();
        let files = mirror.list_files("example.com/testmod", "v1.0.0", "").unwrap();
        assert_eq!(files, vec!["cmd/run.go", "go.mod", "logo.png", "main.go"]);
    }

    #[test]
    fn test_list_files_with_prefix() {
        let (_temp, mirror) = mirror_with_module();
        let files = mirror.list_files("example.com/testmod", "v1.0.0", "cmd/").unwrap();
        assert_eq!(files, vec!["cmd/run.go"]);
    }

    #[test]
    fn test_list_files_missing_module() {
        let (_temp, mirror) = mirror_with_module();
        assert!(mirror.list_files("example.com/testmod", "v9.9.9", "").is_err());
    }

    #[test]
    fn test_read_file() {
        let (_temp, mirror) = mirror_with_module();
        assert_eq!(
            mirror.read_file("example.com/testmod", "v1.0.0", "cmd/run.go").unwrap(),
            "package cmd\n"
        );
    }

    #[test]
    fn test_read_file_not_found() {
        let (_temp, mirror) = mirror_with_module();
        let err = mirror
            .read_file("example.com/testmod", "v1.0.0", "missing.go")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PathNotFound);
    }

    #[test]
    fn test_read_binary_file() {
        let (_temp, mirror) = mirror_with_module();
        let err = mirror
            .read_file("example.com/testmod", "v1.0.0", "logo.png")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BinaryContent);
    }

    #[test]
    fn test_module_dir_rejects_escaping_coordinates() {
        let mirror = LocalMirror::new(Some(PathBuf::from("/cache")));

        for version in ["v1.0.0/../../..", "v1.0.0/..", "..\\..", ""] {
            assert!(mirror.module_dir("example.com/m", version).is_none(), "{version:?}");
        }
        for module in ["example.com/../m", "/example.com/m", "example.com//m", "./m", "example.com\\m"] {
            assert!(mirror.module_dir(module, "v1.0.0").is_none(), "{module:?}");
        }
    }

    #[test]
    fn test_version_cannot_escape_cache_root() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("secret.txt"), "TOP SECRET").unwrap();
        let cache = temp.path().join("cache");
        write_mirror_module(&cache, "example.com/m", "v1.0.0", &[("go.mod", b"module example.com/m\n")]);

        let mirror = LocalMirror::new(Some(cache));
        let version = "v1.0.0/../../..";

        assert!(!mirror.has_module("example.com/m", version));
        assert!(mirror.read_file("example.com/m", version, "secret.txt").is_err());
        assert!(mirror.list_files("example.com/m", version, "").is_err());
    }

    #[test]
    fn test_read_directory_is_not_found() {
        let (_temp, mirror) = mirror_with_module();

        for path in ["cmd", "cmd/", ""] {
            let err = mirror
                .read_file("example.com/testmod", "v1.0.0", path)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::PathNotFound, "{path:?}");
        }
    }

    #[test]
    fn test_read_non_canonical_path_is_not_found() {
        let (_temp, mirror) = mirror_with_module();

        for path in ["./go.mod", "cmd//run.go", "cmd/./run.go"] {
            let err = mirror
                .read_file("example.com/testmod", "v1.0.0", path)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::PathNotFound, "{path:?}");
        }
    }

    #[test]
    fn test_read_file_rejects_escape() {
        let (_temp, mirror) = mirror_with_module();

        for path in ["../../etc/passwd", "/etc/passwd", "cmd/../../x"] {
            let err = mirror
                .read_file("example.com/testmod", "v1.0.0", path)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidPath, "{path}");
        }
    }
}
