//! CSV persistence for aggregated listings.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, SecondsFormat};
use procure_core::Listing;

use crate::error::PersistError;

/// Column order of every persisted file.
pub const CSV_COLUMNS: [&str; 9] = [
    "store",
    "name",
    "url",
    "price",
    "timestamp",
    "delivery_text",
    "delivery_date",
    "delivery_speed",
    "delivery_price",
];

/// Upper bound on `_<n>` suffixes tried when a run lands in the same second
/// as an earlier one.
const MAX_NAME_SUFFIX: u32 = 100;

/// Writes `listings` to a new timestamped CSV file under `output_dir`.
///
/// Returns `Ok(None)` without touching the filesystem when `listings` is
/// empty. Otherwise creates `output_dir` if needed and returns the path of
/// the new file. Existing files are never overwritten.
///
/// # Errors
///
/// Returns [`PersistError`] if the directory cannot be created or the file
/// cannot be written.
pub fn save_listings(
    listings: &[Listing],
    output_dir: &Path,
) -> Result<Option<PathBuf>, PersistError> {
    if listings.is_empty() {
        tracing::debug!("no listings to persist; skipping write");
        return Ok(None);
    }

    std::fs::create_dir_all(output_dir).map_err(|e| PersistError::CreateDir {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let (path, file) = create_unique_file(output_dir, Local::now())?;
    write_or_remove(&path, file, listings)?;

    tracing::info!(path = %path.display(), rows = listings.len(), "saved listings");
    Ok(Some(path))
}

/// `procurement_<YYYYMMDD>_<HHMMSS>.csv`, with `_<n>` before the extension
/// when `suffix > 0`.
pub(crate) fn output_file_name(now: DateTime<Local>, suffix: u32) -> String {
    let stamp = now.format("%Y%m%d_%H%M%S");
    if suffix == 0 {
        format!("procurement_{stamp}.csv")
    } else {
        format!("procurement_{stamp}_{suffix}.csv")
    }
}

fn create_unique_file(
    output_dir: &Path,
    now: DateTime<Local>,
) -> Result<(PathBuf, File), PersistError> {
    let mut suffix = 0;
    loop {
        let path = output_dir.join(output_file_name(now, suffix));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists && suffix < MAX_NAME_SUFFIX => {
                suffix += 1;
            }
            Err(e) => return Err(PersistError::Write { path, source: e }),
        }
    }
}

/// Writes every row to `writer`; on failure the half-written file at `path`
/// is removed so no truncated CSV is left behind.
fn write_or_remove<W: Write>(
    path: &Path,
    writer: W,
    listings: &[Listing],
) -> Result<(), PersistError> {
    let result = write_rows(path, writer, listings);
    if result.is_err() {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove partial output file");
        }
    }
    result
}

fn write_rows<W: Write>(path: &Path, writer: W, listings: &[Listing]) -> Result<(), PersistError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(CSV_COLUMNS)?;
    for listing in listings {
        writer.write_record(listing_row(listing))?;
    }
    writer.flush().map_err(|e| PersistError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

fn listing_row(listing: &Listing) -> [String; 9] {
    let delivery = &listing.delivery;
    [
        listing.store.clone(),
        listing.name.clone(),
        listing.url.clone(),
        listing.price.clone(),
        listing
            .captured_at
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        delivery.text.clone().unwrap_or_default(),
        delivery.date.clone().unwrap_or_default(),
        delivery
            .speed
            .map(|s| s.as_str().to_owned())
            .unwrap_or_default(),
        delivery.price.clone().unwrap_or_default(),
    ]
}
