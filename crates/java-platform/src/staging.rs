//! Materialises bundled runtime dependencies on local disk.
//!
//! Library jars ship as a zip archive and the JDK as a gzip-compressed tar
//! package. Role instances are restarted in place, so both operations run
//! against directories that may already hold a previous extraction: entries
//! that already exist are overwritten and extraction succeeds. Entries that
//! are absent from the archive are left untouched.

use std::fs::{self, File};
use std::io::{self, Read, Seek};
use std::path::Path;
use std::sync::Arc;

use flate2::read::GzDecoder;
use tracing::{debug, info};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::StagingError;

const STAGING_TARGET: &str = "java_platform::staging";

/// Extracts a zip archive at `archive` into `target`.
///
/// Returns the number of files written.
///
/// # Errors
///
/// Fails with [`StagingError`] when the archive cannot be read, an entry
/// would escape `target`, or any file or directory cannot be written.
pub fn extract_archive(archive: &Path, target: &Path) -> Result<usize, StagingError> {
    let file = File::open(archive).map_err(|source| StagingError::OpenArchive {
        path: archive.to_path_buf(),
        source: Arc::new(source),
    })?;
    extract_archive_from_reader(file, &archive.display().to_string(), target)
}

/// Extracts a zip archive read from `reader` into `target`, creating the
/// directory when absent.
///
/// `label` identifies the archive in errors and logs, which matters for
/// archives embedded in the binary rather than read from disk.
///
/// # Errors
///
/// See [`extract_archive`].
pub fn extract_archive_from_reader<R: Read + Seek>(
    reader: R,
    label: &str,
    target: &Path,
) -> Result<usize, StagingError> {
    create_directory(target)?;
    let mut archive = ZipArchive::new(reader).map_err(|error| corrupt(label, &error))?;

    let mut written = 0usize;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|error| corrupt(label, &error))?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(StagingError::UnsafeEntry {
                archive: label.to_owned(),
                entry: entry.name().to_owned(),
            });
        };
        let destination = target.join(relative);

        if entry.is_dir() {
            create_directory(&destination)?;
            continue;
        }
        if let Some(parent) = destination.parent() {
            create_directory(parent)?;
        }

        let write_error = |source: io::Error| StagingError::WriteEntry {
            path: destination.clone(),
            source: Arc::new(source),
        };
        let mut output = File::create(&destination).map_err(write_error)?;
        io::copy(&mut entry, &mut output).map_err(write_error)?;
        written += 1;
    }

    info!(
        target: STAGING_TARGET,
        archive = label,
        target_dir = %target.display(),
        files = written,
        "extracted archive"
    );
    Ok(written)
}

/// Unpacks a gzip-compressed tar runtime package into `install_dir`.
///
/// File permissions recorded in the package are preserved so the runtime's
/// executables stay executable.
///
/// # Errors
///
/// Fails with [`StagingError`] when the package cannot be opened or
/// unpacked.
pub fn install_runtime(package: &Path, install_dir: &Path) -> Result<(), StagingError> {
    create_directory(install_dir)?;
    let file = File::open(package).map_err(|source| StagingError::OpenArchive {
        path: package.to_path_buf(),
        source: Arc::new(source),
    })?;

    debug!(
        target: STAGING_TARGET,
        package = %package.display(),
        install_dir = %install_dir.display(),
        "unpacking runtime package"
    );
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    archive.set_overwrite(true);
    archive.set_preserve_permissions(true);
    archive
        .unpack(install_dir)
        .map_err(|source| StagingError::Unpack {
            path: package.to_path_buf(),
            source: Arc::new(source),
        })?;

    info!(
        target: STAGING_TARGET,
        package = %package.display(),
        install_dir = %install_dir.display(),
        "installed runtime package"
    );
    Ok(())
}

fn create_directory(path: &Path) -> Result<(), StagingError> {
    fs::create_dir_all(path).map_err(|source| StagingError::CreateDirectory {
        path: path.to_path_buf(),
        source: Arc::new(source),
    })
}

fn corrupt(label: &str, error: &ZipError) -> StagingError {
    StagingError::CorruptArchive {
        archive: label.to_owned(),
        message: error.to_string(),
    }
}
