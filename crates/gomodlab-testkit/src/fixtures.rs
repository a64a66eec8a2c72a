//! Fixture builders for module archives and module cache trees

use std::collections::BTreeSet;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

/// First bytes of a PNG file; not valid UTF-8
pub const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];

/// Builds a module zip the way the Go proxy serves it
///
/// Every file is stored under `<module>@<version>/`, and explicit
/// directory entries are added for the wrapper and every parent
/// directory so consumers have to skip them.
///
/// # Panics
///
/// Panics if the archive cannot be written
pub fn module_zip(module: &str, version: &str, files: &[(&str, &[u8])]) -> Vec<u8> {
    let prefix = format!("{}@{}/", module, version);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let mut dirs = BTreeSet::new();

    zip.add_directory(prefix.clone(), options).unwrap();

    for (name, content) in files {
        let mut parent = Path::new(name).parent();
        let mut parents = Vec::new();
        while let Some(dir) = parent.filter(|p| !p.as_os_str().is_empty()) {
            parents.push(dir.to_string_lossy().replace('\\', "/"));
            parent = dir.parent();
        }
        for dir in parents.into_iter().rev() {
            if dirs.insert(dir.clone()) {
                zip.add_directory(format!("{}{}/", prefix, dir), options)
                    .unwrap();
            }
        }

        zip.start_file(format!("{}{}", prefix, name), options).unwrap();
        zip.write_all(content).unwrap();
    }

    zip.finish().unwrap().into_inner()
}

/// Writes an extracted module tree the way `go mod download` leaves it
///
/// `encoded_module` must already be case-encoded (`github.com/!azure/...`).
/// Returns the module root directory.
///
/// # Panics
///
/// Panics if any file cannot be written
pub fn write_mirror_module(
    root: &Path,
    encoded_module: &str,
    version: &str,
    files: &[(&str, &[u8])],
) -> PathBuf {
    let module_dir = root.join(format!("{}@{}", encoded_module, version));
    std::fs::create_dir_all(&module_dir).unwrap();

    for (name, content) in files {
        let path = module_dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
    }

    module_dir
}
