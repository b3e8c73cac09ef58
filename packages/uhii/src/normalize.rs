//! Metro key normalization.
//!
//! Both the heat-index table and the CBSA reference carry the metro code
//! as text. Rows with a missing code are dropped, then every surviving
//! code must coerce to an integer; a single bad value aborts the run.

use std::collections::HashSet;

use heat_island_uhii_models::missing::{is_null, non_null, parse_integral};
use heat_island_uhii_models::{HeatIndexRow, MetroReference};

use crate::UhiiError;
use crate::load::{HeatIndexRecord, MetroRecord};

/// Table label used in errors for the heat-index file.
pub const HEAT_INDEX_TABLE: &str = "heat index";

/// Table label used in errors for the CBSA reference.
pub const METRO_TABLE: &str = "CBSA reference";

/// Heat-index rows with a validated metro key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedHeatIndex {
    /// Surviving rows, in file order.
    pub rows: Vec<HeatIndexRow>,
    /// Rows dropped for a missing metro code.
    pub null_keys: usize,
    /// Rows with a valid metro code but no ZIP, which can never match
    /// the geography table.
    pub missing_zip: usize,
}

/// Deduplicated CBSA pairs with a validated code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedMetro {
    /// Surviving pairs, in order of first appearance.
    pub rows: Vec<MetroReference>,
    /// Exact-duplicate pairs removed.
    pub duplicates: usize,
    /// Pairs dropped for a missing code.
    pub null_keys: usize,
}

/// Coerces a non-null metro code to an integer.
///
/// Accepts plain integers (`35620`) and integral floats (`35620.0`), which
/// is how a code column reads back once it has passed through a
/// spreadsheet. Returns `None` for anything else.
#[must_use]
pub fn parse_metro_code(raw: &str) -> Option<i64> {
    parse_integral(raw)
}

/// Drops heat-index rows without a metro code and coerces the rest.
///
/// The metro code is checked before the ZIP, so a bad code still aborts
/// on a row whose ZIP is blank.
///
/// # Errors
///
/// Returns [`UhiiError::InvalidMetroCode`] on the first non-integer code.
pub fn normalize_heat_index(
    records: &[HeatIndexRecord],
) -> Result<NormalizedHeatIndex, UhiiError> {
    let mut out = NormalizedHeatIndex::default();

    for (idx, record) in records.iter().enumerate() {
        let Some(raw) = non_null(&record.msa) else {
            out.null_keys += 1;
            continue;
        };
        let msa = parse_metro_code(raw).ok_or_else(|| UhiiError::InvalidMetroCode {
            table: HEAT_INDEX_TABLE,
            row: idx + 1,
            value: raw.to_string(),
        })?;
        let Some(zip) = record.zip else {
            out.missing_zip += 1;
            continue;
        };
        out.rows.push(HeatIndexRow {
            zip,
            msa,
            uhii: record.uhii,
        });
    }

    Ok(out)
}

/// Removes exact-duplicate `(code, title)` pairs, keeping the first
/// occurrence of each along with its 1-based row number.
///
/// Pairs that share a code but differ in title are all kept.
#[must_use]
pub fn dedup_metro_pairs(records: &[MetroRecord]) -> Vec<(usize, &MetroRecord)> {
    let mut seen: HashSet<&MetroRecord> = HashSet::with_capacity(records.len());
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| seen.insert(*record))
        .map(|(idx, record)| (idx + 1, record))
        .collect()
}

/// Deduplicates the CBSA pairs, drops those without a code and coerces
/// the rest.
///
/// Deduplication runs on the raw text, before the code is coerced.
///
/// # Errors
///
/// Returns [`UhiiError::InvalidMetroCode`] on the first non-integer code.
pub fn normalize_metro_reference(records: &[MetroRecord]) -> Result<NormalizedMetro, UhiiError> {
    let unique = dedup_metro_pairs(records);
    let mut out = NormalizedMetro {
        duplicates: records.len() - unique.len(),
        ..NormalizedMetro::default()
    };

    for (row, record) in unique {
        if is_null(&record.code) {
            out.null_keys += 1;
            continue;
        }
        let code = parse_metro_code(&record.code).ok_or_else(|| UhiiError::InvalidMetroCode {
            table: METRO_TABLE,
            row,
            value: record.code.trim().to_string(),
        })?;
        out.rows.push(MetroReference {
            code,
            title: (!is_null(&record.title)).then(|| record.title.clone()),
        });
    }

    Ok(out)
}
