//! CSV loaders for the three input tables.
//!
//! Every table is read fully into memory. Required columns are checked
//! against the header row up front so a renamed column fails with its
//! name rather than with a generic deserialization error.

use std::io::Read;
use std::path::{Path, PathBuf};

use encoding_rs::WINDOWS_1252;
use heat_island_uhii_models::columns::{CBSA_CODE, CBSA_TITLE, GEO_ZIP, MSA, UHII_WEIGHTED, ZIP};
use heat_island_uhii_models::{GeoRow, missing};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::UhiiError;
use crate::paths::InputPaths;

/// Lines of free text above the header row of the CBSA delineation file.
pub const METRO_PREAMBLE_LINES: usize = 2;

/// Columns the geography table must provide.
const GEOGRAPHY_COLUMNS: &[&str] = &[
    GEO_ZIP,
    "city",
    "state_id",
    "state_name",
    "population",
    "density",
];

/// A raw row of the heat-index file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HeatIndexRecord {
    /// ZIP code; `None` when blank or not a number.
    #[serde(rename = "ZIP", deserialize_with = "missing::lenient_integer")]
    pub zip: Option<u32>,
    /// CBSA code as written in the file; may be blank.
    #[serde(rename = "MSA")]
    pub msa: String,
    /// Population-weighted UHII.
    #[serde(rename = "UHII.Wght", deserialize_with = "missing::lenient")]
    pub uhii: Option<f64>,
}

/// A raw `(code, title)` pair of the CBSA delineation file.
///
/// Short trailer rows (footnotes) leave the fields they lack empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetroRecord {
    /// CBSA code as written in the file.
    pub code: String,
    /// CBSA title.
    pub title: String,
}

/// The CBSA delineation table and its full header listing.
#[derive(Debug, Clone, Default)]
pub struct MetroTable {
    /// Every column name in the header row, in file order.
    pub columns: Vec<String>,
    /// The `(code, title)` pair of every data row.
    pub records: Vec<MetroRecord>,
}

/// All three input tables.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    /// ZIP-level heat index.
    pub heat_index: Vec<HeatIndexRecord>,
    /// CBSA delineation.
    pub metro: MetroTable,
    /// ZIP geography.
    pub geography: Vec<GeoRow>,
}

/// Loads all three input tables.
///
/// # Errors
///
/// Returns [`UhiiError`] if any file is missing, unreadable, malformed, or
/// lacks a required column.
pub fn load_inputs(paths: &InputPaths) -> Result<Inputs, UhiiError> {
    let heat_index = read_heat_index(&paths.heat_index)?;
    let metro = read_metro_reference(&paths.metro)?;
    let geography = read_geography(&paths.geography)?;

    Ok(Inputs {
        heat_index,
        metro,
        geography,
    })
}

/// Reads the heat-index file.
///
/// # Errors
///
/// Returns [`UhiiError`] if the file cannot be read or parsed.
pub fn read_heat_index(path: &Path) -> Result<Vec<HeatIndexRecord>, UhiiError> {
    let reader = csv::ReaderBuilder::new().from_reader(open(path)?);
    let (_, rows) = read_table(reader, path, &[ZIP, MSA, UHII_WEIGHTED])?;
    log::debug!("Read {} heat-index rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Reads the CBSA delineation file.
///
/// The file is decoded as Windows-1252 (a superset of Latin-1) and its
/// first [`METRO_PREAMBLE_LINES`] lines are skipped. Code and title are
/// picked by header position, so a short footer row reads as empty
/// fields instead of failing.
///
/// # Errors
///
/// Returns [`UhiiError`] if the file cannot be read or parsed.
pub fn read_metro_reference(path: &Path) -> Result<MetroTable, UhiiError> {
    let bytes = std::fs::read(path).map_err(|source| io_error(path, source))?;
    let (text, _, _) = WINDOWS_1252.decode(&bytes);
    let body = skip_lines(&text, METRO_PREAMBLE_LINES);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());
    let columns = read_header(&mut reader, path, &[CBSA_CODE, CBSA_TITLE])?;
    let code_idx = column_index(&columns, path, CBSA_CODE)?;
    let title_idx = column_index(&columns, path, CBSA_TITLE)?;

    let records = reader
        .records()
        .map(|record| {
            record.map(|record| MetroRecord {
                code: field(&record, code_idx),
                title: field(&record, title_idx),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_error(path))?;
    log::debug!(
        "Read {} CBSA rows ({} columns) from {}",
        records.len(),
        columns.len(),
        path.display()
    );

    Ok(MetroTable { columns, records })
}

/// Reads the ZIP geography file.
///
/// # Errors
///
/// Returns [`UhiiError`] if the file cannot be read or parsed.
pub fn read_geography(path: &Path) -> Result<Vec<GeoRow>, UhiiError> {
    let reader = csv::ReaderBuilder::new().from_reader(open(path)?);
    let (_, rows) = read_table(reader, path, GEOGRAPHY_COLUMNS)?;
    log::debug!("Read {} geography rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Returns `text` with its first `n` lines removed.
#[must_use]
pub fn skip_lines(text: &str, n: usize) -> &str {
    let mut rest = text;
    for _ in 0..n {
        match rest.find('\n') {
            Some(idx) => rest = &rest[idx + 1..],
            None => return "",
        }
    }
    rest
}

fn open(path: &Path) -> Result<std::fs::File, UhiiError> {
    std::fs::File::open(path).map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> UhiiError {
    UhiiError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn csv_error(path: &Path) -> impl Fn(csv::Error) -> UhiiError + '_ {
    move |source| UhiiError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

/// Reads the header row and checks it for `required` columns.
fn read_header<R: Read>(
    reader: &mut csv::Reader<R>,
    path: &Path,
    required: &[&str],
) -> Result<Vec<String>, UhiiError> {
    let columns: Vec<String> = reader
        .headers()
        .map_err(csv_error(path))?
        .iter()
        .map(str::to_owned)
        .collect();

    if let Some(column) = required
        .iter()
        .find(|name| !columns.iter().any(|c| c == *name))
    {
        return Err(UhiiError::MissingColumn {
            path: PathBuf::from(path),
            column: (*column).to_string(),
        });
    }

    Ok(columns)
}

fn column_index(columns: &[String], path: &Path, name: &str) -> Result<usize, UhiiError> {
    columns
        .iter()
        .position(|c| c == name)
        .ok_or_else(|| UhiiError::MissingColumn {
            path: PathBuf::from(path),
            column: name.to_string(),
        })
}

/// Field `idx` of a record, empty when the record is too short.
fn field(record: &csv::StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or("").to_string()
}

/// Checks the header row for `required` columns, then deserializes every
/// data row.
fn read_table<R: Read, T: DeserializeOwned>(
    mut reader: csv::Reader<R>,
    path: &Path,
    required: &[&str],
) -> Result<(Vec<String>, Vec<T>), UhiiError> {
    let columns = read_header(&mut reader, path, required)?;

    let rows = reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(csv_error(path))?;

    Ok((columns, rows))
}
