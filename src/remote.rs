//! # Remote Data Packages
//!
//! Collections published as ZIP archives, e.g. the releases of the echemdb
//! data repository. The archive is downloaded, its `*.json` and `*.csv`
//! members extracted, and the result loaded like a local directory.

use std::fs::{self, File};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use log::info;

use crate::entry::Entry;
use crate::local;
use crate::package::PackageError;

/// Data release used when no URL is given
pub const DEFAULT_DATA_URL: &str =
    "https://github.com/echemdb/electrochemistry-data/releases/download/0.3.2/data-0.3.2.zip";

/// Environment variable overriding [`DEFAULT_DATA_URL`]
pub const DATA_URL_ENV: &str = "UNITPACK_DATA_URL";

/// Errors raised while collecting remote Data Packages
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Download failure
    #[error("Failed to download archive: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed ZIP archive
    #[error("Failed to read ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error extracting the archive
    #[error("Failed to extract archive: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading the extracted Data Packages
    #[error(transparent)]
    Package(#[from] PackageError),
}

/// The configured archive URL: the environment override or the default
pub fn data_url() -> String {
    std::env::var(DATA_URL_ENV).unwrap_or_else(|_| DEFAULT_DATA_URL.to_string())
}

/// Download a ZIP archive and load the Data Packages it contains
///
/// `data` selects a subdirectory within the archive. Extracted files go to
/// `outdir`; without one they are staged in a temporary directory that is
/// removed after loading.
pub fn collect_entries(
    url: Option<&str>,
    data: Option<&str>,
    outdir: Option<&Path>,
) -> Result<Vec<Entry>, RemoteError> {
    let url = url.map(str::to_string).unwrap_or_else(data_url);

    info!("Downloading Data Packages from {url}");
    let response = reqwest::blocking::get(&url)?.error_for_status()?;
    let archive = Cursor::new(response.bytes()?);

    match outdir {
        Some(outdir) => collect_from_archive(archive, data, outdir),
        None => {
            let staging = tempfile::tempdir()?;
            collect_from_archive(archive, data, staging.path())
        }
    }
}

/// Extract the tabular members of a ZIP archive and load them as entries
pub fn collect_from_archive<R: Read + Seek>(
    archive: R,
    data: Option<&str>,
    outdir: &Path,
) -> Result<Vec<Entry>, RemoteError> {
    extract_packages(archive, outdir)?;

    let datadir = match data {
        Some(subdir) => outdir.join(subdir),
        None => outdir.to_path_buf(),
    };

    Ok(local::collect_entries(datadir)?)
}

/// Extract the `*.json` and `*.csv` members of a ZIP archive to `outdir`
fn extract_packages<R: Read + Seek>(reader: R, outdir: &Path) -> Result<(), RemoteError> {
    let mut archive = zip::ZipArchive::new(reader)?;

    for index in 0..archive.len() {
        let mut member = archive.by_index(index)?;

        // enclosed_name rejects members that would escape the output directory.
        let Some(relative) = member.enclosed_name() else {
            continue;
        };
        let is_tabular = relative
            .extension()
            .is_some_and(|ext| ext == "json" || ext == "csv");
        if !is_tabular || member.is_dir() {
            continue;
        }

        let target = outdir.join(&relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = File::create(&target)?;
        std::io::copy(&mut member, &mut file)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn sample_archive() -> Cursor<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            let options = SimpleFileOptions::default();

            writer.start_file("data/demo/demo.csv", options).unwrap();
            writer.write_all(b"t,E\n0,-0.1\n1,-0.2\n").unwrap();

            writer.start_file("data/demo/demo.json", options).unwrap();
            writer
                .write_all(
                    br#"{"resources": [{"name": "demo", "path": "demo.csv",
                        "schema": {"fields": [
                            {"name": "t", "type": "number", "unit": "s"},
                            {"name": "E", "type": "number", "unit": "V"}]}}]}"#,
                )
                .unwrap();

            writer.start_file("data/README.md", options).unwrap();
            writer.write_all(b"ignored").unwrap();

            writer.finish().unwrap();
        }
        buffer.set_position(0);
        buffer
    }

    #[test]
    fn test_collect_from_archive() {
        let outdir = tempfile::tempdir().unwrap();
        let entries = collect_from_archive(sample_archive(), None, outdir.path()).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].identifier(), "demo");
        assert_eq!(entries[0].field_unit("E").unwrap(), "V");
        // Non-tabular members are not extracted.
        assert!(!outdir.path().join("data/README.md").exists());
    }

    #[test]
    fn test_data_subdirectory_selection() {
        let outdir = tempfile::tempdir().unwrap();
        let entries =
            collect_from_archive(sample_archive(), Some("data/demo"), outdir.path()).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_data_url_default() {
        if std::env::var(DATA_URL_ENV).is_err() {
            assert_eq!(data_url(), DEFAULT_DATA_URL);
        }
    }
}
