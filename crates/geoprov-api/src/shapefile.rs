//! Local shapefile handling: finding upload candidates and unpacking
//! downloaded archives.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::trace;
use zip::ZipArchive;

use crate::error::Error;

/// Suffix of the main shapefile component (the geometry file).
pub const MAIN_FILE_SUFFIX: &str = ".shp";

/// List the `.shp` files directly inside `dir`, sorted by file name.
///
/// Sidecar files (`.dbf`, `.shx`, `.prj`, ...) and subdirectories are skipped.
pub async fn main_files_in(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(Error::io(dir))?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(Error::io(dir))? {
        let path = entry.path();
        let is_main = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(MAIN_FILE_SUFFIX));
        if !is_main {
            continue;
        }
        if entry.file_type().await.map_err(Error::io(&path))?.is_file() {
            trace!(path = %path.display(), "found shapefile");
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Extract every member of `archive` into `destination`.
///
/// Runs on the blocking pool. Entries whose names would escape
/// `destination` are refused by the zip reader. Returns the extracted file
/// paths in archive order.
pub async fn extract_archive(archive: &Path, destination: &Path) -> Result<Vec<PathBuf>, Error> {
    let archive = archive.to_path_buf();
    let destination = destination.to_path_buf();
    let task_archive = archive.clone();
    tokio::task::spawn_blocking(move || extract_archive_blocking(&task_archive, &destination))
        .await
        .map_err(|e| Error::io(archive)(std::io::Error::other(e)))?
}

fn extract_archive_blocking(archive_path: &Path, destination: &Path) -> Result<Vec<PathBuf>, Error> {
    let file = File::open(archive_path).map_err(Error::io(archive_path))?;
    let mut archive = ZipArchive::new(file).map_err(Error::archive(archive_path))?;

    let mut members = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive
            .by_index(index)
            .map_err(Error::archive(archive_path))?;
        if !entry.is_dir() {
            if let Some(name) = entry.enclosed_name() {
                members.push(destination.join(name));
            }
        }
    }

    archive
        .extract(destination)
        .map_err(Error::archive(archive_path))?;
    Ok(members)
}
