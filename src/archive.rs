//! Zip extraction into a project directory.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};
use zip::ZipArchive;

use crate::error::ArchiveError;

/// Name of the archive file without directory and extension.
///
/// `target/repo.zip` becomes `repo`. Every output file of a run is named
/// after this value.
pub fn archive_base_name(archive: &Path) -> Result<String, ArchiveError> {
    archive
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| ArchiveError::BaseName(archive.to_path_buf()))
}

/// Extract every entry of `archive` below `destination`, in archive order.
///
/// Directory entries are created with their parents; file entries overwrite
/// whatever already exists at the same relative path. Unrelated files under
/// `destination` are left alone. Returns the number of entries written.
pub fn extract(archive: &Path, destination: &Path) -> Result<usize, ArchiveError> {
    let file = File::open(archive).map_err(|source| ArchiveError::Open {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut zip = ZipArchive::new(file).map_err(|source| ArchiveError::Format {
        path: archive.to_path_buf(),
        source,
    })?;

    info!(
        archive = %archive.display(),
        destination = %destination.display(),
        entries = zip.len(),
        "Extracting archive"
    );

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|source| ArchiveError::Format {
            path: archive.to_path_buf(),
            source,
        })?;
        let target = entry_path(destination, entry.name())?;

        if entry.is_dir() {
            create_dirs(&target)?;
            debug!(path = %target.display(), "Created directory");
            continue;
        }

        if let Some(parent) = target.parent() {
            create_dirs(parent)?;
        }
        let mut out = File::create(&target).map_err(|source| ArchiveError::Write {
            path: target.clone(),
            source,
        })?;
        let written = io::copy(&mut entry, &mut out).map_err(|source| ArchiveError::Write {
            path: target.clone(),
            source,
        })?;
        debug!(path = %target.display(), bytes = written, "Extracted file");
    }

    Ok(zip.len())
}

fn create_dirs(path: &Path) -> Result<(), ArchiveError> {
    fs::create_dir_all(path).map_err(|source| ArchiveError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve an entry name below `destination`, refusing names that climb out.
fn entry_path(destination: &Path, name: &str) -> Result<PathBuf, ArchiveError> {
    let unsafe_entry = || ArchiveError::UnsafeEntry {
        name: name.to_string(),
    };

    let mut relative = PathBuf::new();
    for component in Path::new(&name.replace('\\', "/")).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !relative.pop() {
                    return Err(unsafe_entry());
                }
            }
            Component::RootDir | Component::Prefix(_) => return Err(unsafe_entry()),
        }
    }

    Ok(destination.join(relative))
}
