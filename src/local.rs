//! # Local Data Packages
//!
//! Discovery of Data Package descriptors on disk. A directory tree is
//! scanned recursively for `*.json` descriptors, each pairing a CSV resource
//! with its schema and metadata.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::entry::Entry;
use crate::package::PackageError;

/// All Data Package descriptors below `dir`, sorted by path
pub fn collect_datapackages<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, PackageError> {
    let mut descriptors = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            descriptors.push(path.to_path_buf());
        }
    }

    descriptors.sort();
    Ok(descriptors)
}

/// Load every Data Package below `dir` as an [`Entry`]
pub fn collect_entries<P: AsRef<Path>>(dir: P) -> Result<Vec<Entry>, PackageError> {
    collect_datapackages(dir)?
        .iter()
        .map(Entry::from_local)
        .collect()
}
