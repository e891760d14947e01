//! Output formatting and persistence for analysis results.
//!
//! Supports JSON logging, JSON file writes (optionally gzip-compressed), and
//! CSV append of per-trip summary rows.

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use tracing::{debug, info};

use crate::stats::TripStats;
use csv::WriterBuilder;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Logs any serializable value as pretty-printed JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes `value` as pretty JSON to `path`, or to `path` + `.gz` when `gzip`
/// is set. Returns the path actually written.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, gzip: bool) -> Result<PathBuf> {
    let target = if gzip {
        let mut name = path.as_os_str().to_owned();
        name.push(".gz");
        PathBuf::from(name)
    } else {
        path.to_path_buf()
    };

    let file = File::create(&target)
        .with_context(|| format!("failed to create {}", target.display()))?;

    if gzip {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        serde_json::to_writer_pretty(&mut encoder, value)?;
        encoder.finish()?.flush()?;
    } else {
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }

    debug!(path = %target.display(), gzip, "Wrote JSON output");
    Ok(target)
}

/// Appends a [`TripStats`] record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, trip_stats: &TripStats) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(trip_stats)?;
    writer.flush()?;

    Ok(())
}
