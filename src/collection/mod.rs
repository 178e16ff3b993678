//! # Collections
//!
//! An ordered, filterable set of [`Entry`] values. Iteration is sorted by
//! identifier so that listings and tests are deterministic.
//!
//! ```rust,no_run
//! use unitpack::collection::Collection;
//!
//! let collection = Collection::from_local("data/")?;
//! let from_one_paper = collection.filter(|entry| {
//!     entry
//!         .descriptor()
//!         .path("source.url")
//!         .and_then(|url| url.as_str())
//!         == Some("https://doi.org/10.1039/C0CP01001D")
//! });
//! # Ok::<(), unitpack::collection::CollectionError>(())
//! ```

use std::path::Path;

use crate::entry::Entry;
use crate::local;
use crate::package::PackageError;

#[cfg(feature = "remote")]
use crate::remote::{self, RemoteError};


/// Errors raised while building or querying collections
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    /// Lookup of an identifier not present in the collection
    #[error("No collection entry with identifier '{0}'")]
    NotFound(String),

    /// Error loading or saving an underlying Data Package
    #[error(transparent)]
    Package(#[from] PackageError),

    /// Error collecting remote Data Packages
    #[cfg(feature = "remote")]
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Ordered set of entries, sorted by identifier
#[derive(Debug, Clone, Default)]
pub struct Collection {
    entries: Vec<Entry>,
}

impl Collection {
    /// Build a collection; entries are sorted by identifier
    pub fn new(mut entries: Vec<Entry>) -> Self {
        entries.sort_by(|a, b| a.identifier().cmp(b.identifier()));
        Collection { entries }
    }

    /// Load every Data Package below `datadir`
    pub fn from_local<P: AsRef<Path>>(datadir: P) -> Result<Self, CollectionError> {
        Ok(Collection::new(local::collect_entries(datadir)?))
    }

    /// Load the Data Packages from a remote ZIP archive
    ///
    /// Without a `url` the configured data release is used (see
    /// [`crate::remote::data_url`]). `data` selects a subdirectory within
    /// the archive and `outdir` keeps the extracted files.
    #[cfg(feature = "remote")]
    pub fn from_remote(
        url: Option<&str>,
        data: Option<&str>,
        outdir: Option<&Path>,
    ) -> Result<Self, CollectionError> {
        Ok(Collection::new(remote::collect_entries(url, data, outdir)?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in identifier order
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// The entry with this identifier
    pub fn get(&self, identifier: &str) -> Result<&Entry, CollectionError> {
        self.entries
            .iter()
            .find(|entry| entry.identifier() == identifier)
            .ok_or_else(|| CollectionError::NotFound(identifier.to_string()))
    }

    /// Add an entry, keeping the identifier order
    pub fn push(&mut self, entry: Entry) {
        let position = self
            .entries
            .partition_point(|e| e.identifier() <= entry.identifier());
        self.entries.insert(position, entry);
    }

    /// The subset of entries satisfying `predicate`
    pub fn filter<F>(&self, predicate: F) -> Collection
    where
        F: Fn(&Entry) -> bool,
    {
        Collection {
            entries: self
                .entries
                .iter()
                .filter(|entry| predicate(entry))
                .cloned()
                .collect(),
        }
    }

    /// Identifiers in collection order
    pub fn identifiers(&self) -> Vec<&str> {
        self.entries.iter().map(Entry::identifier).collect()
    }

    /// Save every entry as a Data Package in `outdir`
    pub fn save_entries<P: AsRef<Path>>(&self, outdir: P) -> Result<(), CollectionError> {
        for entry in &self.entries {
            entry.save(outdir.as_ref(), None)?;
        }
        Ok(())
    }
}

impl IntoIterator for Collection {
    type Item = Entry;
    type IntoIter = std::vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<Entry> for Collection {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Collection::new(iter.into_iter().collect())
    }
}
