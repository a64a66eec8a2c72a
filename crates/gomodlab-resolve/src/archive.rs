//! In-memory cache of downloaded module zips
//!
//! Each archive is parsed once into an [`ArchiveEntry`] with a lookup table
//! from module-relative path to zip record. Entries live until the cache is
//! dropped; there is no eviction.
//!
//! Concurrent misses for the same module version may both download and
//! parse; the table keeps whichever entry was inserted last and every
//! caller still gets a complete entry.

use gomodlab_core::text::decode_text;
use gomodlab_core::{GomodlabError, Result};
use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex, MutexGuard};
use zip::ZipArchive;

type SharedZip = ZipArchive<Cursor<Arc<[u8]>>>;

/// A parsed module zip with a pre-built file lookup
#[derive(Debug)]
pub struct ArchiveEntry {
    archive: SharedZip,
    /// Stripped path -> zip record index
    files: BTreeMap<String, usize>,
}

impl ArchiveEntry {
    /// Parses `data` and indexes every regular file under `<module>@<version>/`
    ///
    /// # Errors
    ///
    /// Returns [`GomodlabError::CorruptArchive`] if `data` is not a readable zip
    pub fn parse(module: &str, version: &str, data: Vec<u8>) -> Result<Self> {
        let corrupt = |reason: String| GomodlabError::CorruptArchive {
            module: module.to_string(),
            version: version.to_string(),
            reason,
        };

        let bytes: Arc<[u8]> = data.into();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| corrupt(e.to_string()))?;

        let prefix = format!("{}@{}/", module, version);
        let mut files = BTreeMap::new();

        for index in 0..archive.len() {
            let record = archive.by_index(index).map_err(|e| corrupt(e.to_string()))?;
            let name = record.name();
            let stripped = name.strip_prefix(prefix.as_str()).unwrap_or(name);

            if stripped.is_empty() || stripped.ends_with('/') {
                continue;
            }

            files.insert(stripped.to_string(), index);
        }

        Ok(Self { archive, files })
    }

    /// Returns indexed paths starting with `prefix`; an empty prefix returns all
    pub fn list_files(&self, prefix: &str) -> Vec<String> {
        self.files
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Reads a file as text
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The path is not in the archive
    /// - The record cannot be decompressed
    /// - The content is not valid UTF-8 (binary file)
    pub fn read_file(&self, path: &str) -> Result<String> {
        let index = *self.files.get(path).ok_or_else(|| GomodlabError::FileNotFound {
            origin: "archive".to_string(),
            path: path.to_string(),
        })?;

        // Clones share the parsed central directory and the byte buffer
        let mut archive = self.archive.clone();
        let mut record = archive.by_index(index).map_err(|e| {
            GomodlabError::io(
                format!("open file in zip: {}", path),
                std::io::Error::other(e),
            )
        })?;

        let mut data = Vec::with_capacity(record.size() as usize);
        record
            .read_to_end(&mut data)
            .map_err(|e| GomodlabError::io(format!("read file from zip: {}", path), e))?;

        decode_text(path, data)
    }
}

/// Process-wide table of parsed archives keyed by `module@version`
#[derive(Debug, Default)]
pub struct ArchiveCache {
    entries: Mutex<HashMap<String, Arc<ArchiveEntry>>>,
}

impl ArchiveCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached entry, never fetching
    pub fn get(&self, module: &str, version: &str) -> Option<Arc<ArchiveEntry>> {
        self.lock().get(&cache_key(module, version)).cloned()
    }

    /// Parses and stores an archive, returning the stored entry
    ///
    /// Nothing is stored if parsing fails.
    pub fn put(&self, module: &str, version: &str, data: Vec<u8>) -> Result<Arc<ArchiveEntry>> {
        let entry = Arc::new(ArchiveEntry::parse(module, version, data)?);
        tracing::debug!(
            "cached {}@{} ({} files)",
            module,
            version,
            entry.len()
        );

        self.lock()
            .insert(cache_key(module, version), Arc::clone(&entry));

        Ok(entry)
    }

    /// Returns the cached entry or fetches, parses and stores it
    ///
    /// `fetch` runs without the table lock held.
    pub fn get_or_fetch<F>(&self, module: &str, version: &str, fetch: F) -> Result<Arc<ArchiveEntry>>
    where
        F: FnOnce() -> Result<Vec<u8>>,
    {
        if let Some(entry) = self.get(module, version) {
            tracing::debug!("archive cache hit for {}@{}", module, version);
            return Ok(entry);
        }

        tracing::debug!("archive cache miss for {}@{}", module, version);
        let data = fetch()?;
        self.put(module, version, data)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<ArchiveEntry>>> {
        // A panic while holding the lock cannot leave a half-inserted entry
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn cache_key(module: &str, version: &str) -> String {
    format!("{}@{}", module, version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gomodlab_core::ErrorKind;
    use gomodlab_testkit::{PNG_HEADER, module_zip};

    fn test_zip() -> Vec<u8> {
        module_zip(
            "example.com/mod",
            "v1.0.0",
            &[
                ("go.mod", b"module example.com/mod\n"),
                ("main.go", b"package main\n\nfunc main() {}\n"),
                ("cmd/run.go", b"package cmd\n"),
                ("cmd/serve.go", b"package cmd\n"),
                ("assets/logo.png", PNG_HEADER),
            ],
        )
    }

    #[test]
    fn test_put_then_get_returns_same_entry() {
        let cache = ArchiveCache::new();
        let stored = cache.put("example.com/mod", "v1.0.0", test_zip()).unwrap();
        let fetched = cache.get("example.com/mod", "v1.0.0").unwrap();

        assert!(Arc::ptr_eq(&stored, &fetched));
    }

    #[test]
    fn test_get_unset_key() {
        let cache = ArchiveCache::new();
        assert!(cache.get("example.com/mod", "v1.0.0").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_versions_do_not_collide() {
        let cache = ArchiveCache::new();
        let v2 = module_zip("example.com/mod", "v2.0.0", &[("v2.go", b"package mod\n")]);

        let first = cache.put("example.com/mod", "v1.0.0", test_zip()).unwrap();
        let second = cache.put("example.com/mod", "v2.0.0", v2).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(cache.get("example.com/mod", "v1.0.0").unwrap().contains("main.go"));
        assert!(cache.get("example.com/mod", "v2.0.0").unwrap().contains("v2.go"));
    }

    #[test]
    fn test_put_corrupt_archive_stores_nothing() {
        let cache = ArchiveCache::new();
        let err = cache
            .put("example.com/mod", "v1.0.0", b"this is not a zip".to_vec())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MalformedArchive);
        assert!(cache.get("example.com/mod", "v1.0.0").is_none());
    }

    #[test]
    fn test_list_files_strips_prefix_and_skips_dirs() {
        let entry = ArchiveEntry::parse("example.com/mod", "v1.0.0", test_zip()).unwrap();
        let files = entry.list_files("");

        assert_eq!(
            files,
            vec![
                "assets/logo.png",
                "cmd/run.go",
                "cmd/serve.go",
                "go.mod",
                "main.go",
            ]
        );
    }

    #[test]
    fn test_list_files_with_prefix() {
        let entry = ArchiveEntry::parse("example.com/mod", "v1.0.0", test_zip()).unwrap();
        assert_eq!(entry.list_files("cmd/"), vec!["cmd/run.go", "cmd/serve.go"]);
        assert!(entry.list_files("nope/").is_empty());
    }

    #[test]
    fn test_read_file() {
        let entry = ArchiveEntry::parse("example.com/mod", "v1.0.0", test_zip()).unwrap();
        assert_eq!(
            entry.read_file("main.go").unwrap(),
            "package main\n\nfunc main() {}\n"
        );
    }

    #[test]
    fn test_read_file_twice() {
        let entry = ArchiveEntry::parse("example.com/mod", "v1.0.0", test_zip()).unwrap();
        assert_eq!(entry.read_file("go.mod").unwrap(), entry.read_file("go.mod").unwrap());
    }

    #[test]
    fn test_read_file_not_in_archive() {
        let entry = ArchiveEntry::parse("example.com/mod", "v1.0.0", test_zip()).unwrap();
        let err = entry.read_file("nonexistent.go").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PathNotFound);
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_read_directory_marker_is_not_found() {
        let entry = ArchiveEntry::parse("example.com/mod", "v1.0.0", test_zip()).unwrap();
        assert_eq!(entry.read_file("cmd/").unwrap_err().kind(), ErrorKind::PathNotFound);
    }

    #[test]
    fn test_read_binary_file() {
        let entry = ArchiveEntry::parse("example.com/mod", "v1.0.0", test_zip()).unwrap();
        let err = entry.read_file("assets/logo.png").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BinaryContent);
        assert!(err.to_string().contains("binary"));
    }

    #[test]
    fn test_get_or_fetch_fetches_once() {
        let cache = ArchiveCache::new();
        let mut calls = 0;

        let first = cache
            .get_or_fetch("example.com/mod", "v1.0.0", || {
                calls += 1;
                Ok(test_zip())
            })
            .unwrap();
        let second = cache
            .get_or_fetch("example.com/mod", "v1.0.0", || {
                calls += 1;
                Ok(test_zip())
            })
            .unwrap();

        assert_eq!(calls, 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_get_or_fetch_propagates_fetch_error() {
        let cache = ArchiveCache::new();
        let err = cache
            .get_or_fetch("example.com/mod", "v1.0.0", || Err(GomodlabError::ModuleNotFound))
            .unwrap_err();

        assert!(err.is_module_not_found());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_puts_keep_single_entry() {
        let cache = Arc::new(ArchiveCache::new());
        let data = test_zip();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let cache = Arc::clone(&cache);
                let data = data.clone();
                scope.spawn(move || {
                    let entry = cache.put("example.com/mod", "v1.0.0", data).unwrap();
                    assert_eq!(entry.read_file("go.mod").unwrap(), "module example.com/mod\n");
                });
            }
        });

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("example.com/mod", "v1.0.0").unwrap().len(), 5);
    }
}
