//! Output projection and CSV writer.
//!
//! The output file is written to a temporary file next to the
//! destination and renamed into place once complete, so a failed run
//! leaves any previous output untouched.

use std::io::{BufWriter, Write};
use std::path::Path;

use heat_island_uhii_models::OutputRow;
use heat_island_uhii_models::columns::OUTPUT_COLUMNS;
use tempfile::NamedTempFile;

use crate::UhiiError;
use crate::join::WithGeography;

/// Selects the output columns from fully joined rows.
#[must_use]
pub fn project(rows: &[WithGeography<'_>]) -> Vec<OutputRow> {
    rows.iter()
        .map(|row| OutputRow {
            zip: row.left.heat.zip,
            city: row.geo.city.clone(),
            state_id: row.geo.state_id.clone(),
            state_name: row.geo.state_name.clone(),
            population: row.geo.population,
            density: row.geo.density,
            msa_name: row.left.msa_name().map(str::to_owned),
            uhii: row.left.heat.uhii,
        })
        .collect()
}

/// Writes the header row followed by `rows`.
///
/// The header is written even when there are no rows.
///
/// # Errors
///
/// Returns [`csv::Error`] if writing fails.
pub fn write_csv<W: Write>(writer: W, rows: &[OutputRow]) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    writer.write_record(OUTPUT_COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes `rows` to `path`, replacing it atomically.
///
/// # Errors
///
/// Returns [`UhiiError`] if the temporary file cannot be created or
/// written, or cannot be moved to `path`.
pub fn write_output(path: &Path, rows: &[OutputRow]) -> Result<(), UhiiError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|source| UhiiError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    write_csv(BufWriter::new(tmp.as_file_mut()), rows).map_err(|source| UhiiError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    tmp.persist(path).map_err(|source| UhiiError::Persist {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!("Wrote {} rows to {}", rows.len(), path.display());

    Ok(())
}
