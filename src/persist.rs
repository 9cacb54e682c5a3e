//! Writing the collected bus records to a single JSON document.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::PersistError;
use crate::model::ResultCollection;

const PARTIAL_MARKER: &str = "partial";

/// What was written and how much of it there was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    pub path: PathBuf,
    pub file_size_bytes: u64,
    pub entities: usize,
    pub total_stops: usize,
    pub total_routes: usize,
    pub total_coordinates: usize,
}

impl SaveSummary {
    pub fn file_size_mb(&self) -> f64 {
        self.file_size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Collection-wide counts; absent or non-array fields count as zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CollectionTotals {
    pub entities: usize,
    pub stops: usize,
    pub routes: usize,
    pub coordinates: usize,
}

impl CollectionTotals {
    pub fn of(collection: &ResultCollection) -> Self {
        collection
            .iter()
            .fold(Self::default(), |mut totals, detail| {
                totals.entities += 1;
                totals.stops += detail.stops().map_or(0, Vec::len);
                totals.routes += detail.routes().map_or(0, Vec::len);
                totals.coordinates += detail.flow_coordinate_count();
                totals
            })
    }
}

/// Serializes `collection` to `destination` as indented UTF-8 JSON.
///
/// Parent directories are created if needed. On error the caller still owns
/// the collection and may retry.
///
/// # Errors
///
/// Returns a [`PersistError`] if the directory cannot be created or the
/// file cannot be written.
#[tracing::instrument(skip(collection), fields(entities = collection.len()))]
pub fn save(collection: &ResultCollection, destination: &Path) -> Result<SaveSummary, PersistError> {
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PersistError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let write_err = |source: std::io::Error| PersistError::Write {
        path: destination.to_path_buf(),
        source,
    };

    // Written beside the destination and renamed over it, so a failed write
    // never clobbers the previous document.
    let staging = staging_path(destination);
    if let Err(e) = write_document(collection, &staging) {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }
    fs::rename(&staging, destination).map_err(|source| {
        let _ = fs::remove_file(&staging);
        write_err(source)
    })?;

    let file_size_bytes = fs::metadata(destination).map_err(write_err)?.len();
    let totals = CollectionTotals::of(collection);
    debug!(file_size_bytes, "Bus data written");

    Ok(SaveSummary {
        path: destination.to_path_buf(),
        file_size_bytes,
        entities: totals.entities,
        total_stops: totals.stops,
        total_routes: totals.routes,
        total_coordinates: totals.coordinates,
    })
}

fn write_document(collection: &ResultCollection, path: &Path) -> Result<(), PersistError> {
    let write_err = |source: std::io::Error| PersistError::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    // to_writer_pretty uses two-space indents and leaves non-ASCII unescaped
    serde_json::to_writer_pretty(&mut writer, collection).map_err(|e| {
        if e.is_io() {
            write_err(e.into())
        } else {
            PersistError::Json(e)
        }
    })?;
    writer.write_all(b"\n").map_err(write_err)?;
    writer
        .into_inner()
        .map_err(|e| write_err(e.into_error()))?
        .sync_all()
        .map_err(write_err)
}

fn staging_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("bus_data"));
    name.push(".tmp");
    destination.with_file_name(name)
}

/// Reads a document previously written by [`save`].
///
/// # Errors
///
/// Returns a [`PersistError`] if the file is unreadable or not a bus array.
pub fn load(path: &Path) -> Result<ResultCollection, PersistError> {
    let file = File::open(path).map_err(|source| PersistError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let collection: ResultCollection = serde_json::from_reader(BufReader::new(file))?;
    info!(path = %path.display(), entities = collection.len(), "Bus data loaded");
    Ok(collection)
}

/// Where an interrupted run's partial result goes:
/// `data/bus_data.json` becomes `data/bus_data.partial.json`.
pub fn partial_path(destination: &Path) -> PathBuf {
    let stem = destination
        .file_stem()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("bus_data"));

    let mut name = stem;
    name.push(".");
    name.push(PARTIAL_MARKER);
    if let Some(ext) = destination.extension() {
        name.push(".");
        name.push(ext);
    }
    destination.with_file_name(name)
}
