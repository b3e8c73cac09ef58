#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Per-ZIP urban heat island dataset builder.
//!
//! Reads the ZIP-level heat island index, the Census CBSA delineation
//! file and a ZIP geography table, then joins them into one flat CSV with
//! city, state, population, density, metro name and UHII per ZIP.
//!
//! The metro join is a left join (ZIPs whose CBSA code has no title keep
//! an empty `MSA_Name`) and the geography join is an inner join (ZIPs
//! without geography are dropped). A metro code that is present but not
//! an integer aborts the whole run.

pub mod join;
pub mod load;
pub mod normalize;
pub mod output;
pub mod paths;
pub mod summary;

use std::path::PathBuf;

use heat_island_uhii_models::OutputRow;
use thiserror::Error;

use crate::load::Inputs;

/// Errors that can occur while building the dataset.
#[derive(Debug, Error)]
pub enum UhiiError {
    /// A file could not be opened, read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File the operation was working on.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A CSV file could not be parsed or written.
    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        /// File the operation was working on.
        path: PathBuf,
        /// Underlying error.
        source: csv::Error,
    },

    /// A required column is absent from a file's header row.
    #[error("{} has no '{column}' column", path.display())]
    MissingColumn {
        /// File whose header was checked.
        path: PathBuf,
        /// Name of the missing column.
        column: String,
    },

    /// A non-null metro code could not be coerced to an integer.
    #[error("{table} row {row}: metro code '{value}' is not an integer")]
    InvalidMetroCode {
        /// Which table the value came from.
        table: &'static str,
        /// 1-based data row (header excluded, preamble excluded).
        row: usize,
        /// The offending raw value.
        value: String,
    },

    /// The finished output could not be moved into place.
    #[error("Failed to persist {}: {source}", path.display())]
    Persist {
        /// Destination path.
        path: PathBuf,
        /// Underlying error.
        source: tempfile::PersistError,
    },
}

/// Row counts collected while cleaning, for logging and reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    /// Heat-index rows read.
    pub heat_index_rows: usize,
    /// Heat-index rows dropped for a missing metro code.
    pub heat_index_null_keys: usize,
    /// Metro reference rows read.
    pub metro_rows: usize,
    /// Exact-duplicate `(code, title)` pairs removed.
    pub metro_duplicates: usize,
    /// Metro pairs dropped for a missing code.
    pub metro_null_keys: usize,
    /// Heat-index rows whose metro code had no reference entry.
    pub unmatched_metro: usize,
    /// Rows removed by the ZIP join for lack of geography, including
    /// rows with no ZIP at all.
    pub excluded_by_zip: usize,
    /// Rows in the final dataset.
    pub output_rows: usize,
}

/// The cleaned dataset, ready to be written.
#[derive(Debug, Clone)]
pub struct CleanOutput {
    /// Output rows in heat-index order.
    pub rows: Vec<OutputRow>,
    /// Counts gathered along the way.
    pub stats: CleanStats,
}

/// Normalizes keys, joins the three tables and projects the output
/// columns.
///
/// # Errors
///
/// Returns [`UhiiError::InvalidMetroCode`] if any non-null metro code in
/// either table is not an integer. Nothing is partially produced.
pub fn clean(inputs: &Inputs) -> Result<CleanOutput, UhiiError> {
    let heat = normalize::normalize_heat_index(&inputs.heat_index)?;
    let metro = normalize::normalize_metro_reference(&inputs.metro.records)?;

    log::info!(
        "Heat index: {} rows, {} dropped for missing MSA, {} without a ZIP",
        inputs.heat_index.len(),
        heat.null_keys,
        heat.missing_zip
    );
    log::info!(
        "CBSA reference: {} rows, {} duplicate pairs removed, {} dropped for missing code",
        inputs.metro.records.len(),
        metro.duplicates,
        metro.null_keys
    );

    let with_metro = join::left_join_metro(&heat.rows, &metro.rows);
    let unmatched_metro = with_metro.iter().filter(|r| r.metro.is_none()).count();
    log::info!(
        "Metro join: {} rows, {unmatched_metro} without a CBSA match",
        with_metro.len()
    );

    let before_zip = with_metro.len();
    let matched = join::inner_join_geography(with_metro, &inputs.geography);
    let excluded_by_zip = before_zip.saturating_sub(matched.len()) + heat.missing_zip;
    log::info!(
        "ZIP join: {} rows kept ({} geography rows available)",
        matched.len(),
        inputs.geography.len()
    );
    log::debug!("ZIP join excluded {excluded_by_zip} rows without geography");

    let rows = output::project(&matched);

    let stats = CleanStats {
        heat_index_rows: inputs.heat_index.len(),
        heat_index_null_keys: heat.null_keys,
        metro_rows: inputs.metro.records.len(),
        metro_duplicates: metro.duplicates,
        metro_null_keys: metro.null_keys,
        unmatched_metro,
        excluded_by_zip,
        output_rows: rows.len(),
    };

    Ok(CleanOutput { rows, stats })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::load::load_inputs;
    use crate::output::write_output;
    use crate::paths::InputPaths;

    const HEAT: &str = "ZIP,MSA,UHII.Wght\n10001,35620,4.2\n";
    const METRO: &str = "List 1\nMarch 2020\n\
                         CBSA Code,CBSA Title,State Name\n\
                         35620,New York-Newark-Jersey City,New York\n";
    const GEO: &str = "zip,lat,lng,city,state_id,state_name,population,density\n\
                       10001,40.75,-73.99,New York,NY,New York,21000,15000\n";
    const HEADER: &str = "ZIP,city,state_id,state_name,population,density,MSA_Name,UHII";

    fn fixture(dir: &Path, heat: &str, metro: &str, geo: &str) -> InputPaths {
        let paths = InputPaths {
            heat_index: dir.join("zip_UHII.csv"),
            metro: dir.join("CBSA_Map.csv"),
            geography: dir.join("uszips.csv"),
        };
        std::fs::write(&paths.heat_index, heat).unwrap();
        std::fs::write(&paths.metro, metro).unwrap();
        std::fs::write(&paths.geography, geo).unwrap();
        paths
    }

    fn run(heat: &str, metro: &str, geo: &str) -> (CleanStats, Vec<String>) {
        let dir = tempfile::tempdir().unwrap();
        let paths = fixture(dir.path(), heat, metro, geo);
        let out = dir.path().join("clean_uhii_by_zip.csv");

        let cleaned = clean(&load_inputs(&paths).unwrap()).unwrap();
        write_output(&out, &cleaned.rows).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        (cleaned.stats, text.lines().map(str::to_owned).collect())
    }

    #[test]
    fn joins_matching_zip_with_metro_name() {
        let (stats, lines) = run(HEAT, METRO, GEO);

        assert_eq!(
            lines,
            vec![
                HEADER.to_string(),
                "10001,New York,NY,New York,21000,15000,New York-Newark-Jersey City,4.2"
                    .to_string(),
            ]
        );
        assert_eq!(stats.output_rows, 1);
        assert_eq!(stats.unmatched_metro, 0);
    }

    #[test]
    fn unmatched_metro_keeps_row_with_empty_name() {
        let metro = "List 1\nMarch 2020\nCBSA Code,CBSA Title\n16980,Chicago-Naperville-Elgin\n";

        let (stats, lines) = run(HEAT, metro, GEO);

        assert_eq!(lines[1], "10001,New York,NY,New York,21000,15000,,4.2");
        assert_eq!(stats.unmatched_metro, 1);
    }

    #[test]
    fn blank_metro_excludes_row_even_with_geography() {
        let heat = "ZIP,MSA,UHII.Wght\n10001,,4.2\n10002,35620,3.1\n";
        let geo = "zip,city,state_id,state_name,population,density\n\
                   10001,New York,NY,New York,21000,15000\n\
                   10002,New York,NY,New York,80000,30000\n";

        let (stats, lines) = run(heat, METRO, geo);

        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("10002,"));
        assert_eq!(stats.heat_index_null_keys, 1);
    }

    #[test]
    fn blank_zip_rows_are_excluded_not_fatal() {
        let heat = "ZIP,MSA,UHII.Wght\n10001,35620,4.2\n,,1.0\n,35620,2.0\n";

        let (stats, lines) = run(heat, METRO, GEO);

        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("10001,"));
        assert_eq!(stats.heat_index_null_keys, 1);
        assert_eq!(stats.excluded_by_zip, 1);
    }

    #[test]
    fn population_written_as_float_is_kept() {
        let geo = "zip,city,state_id,state_name,population,density\n\
                   10001,New York,NY,New York,21000.0,15000\n";

        let (_, lines) = run(HEAT, METRO, geo);

        assert_eq!(
            lines[1],
            "10001,New York,NY,New York,21000,15000,New York-Newark-Jersey City,4.2"
        );
    }

    #[test]
    fn titles_differing_in_whitespace_stay_distinct() {
        let metro = "List 1\nMarch 2020\nCBSA Code,CBSA Title\n35620,NYC\n35620,NYC \n";

        let (stats, lines) = run(HEAT, metro, GEO);

        assert_eq!(stats.metro_duplicates, 0);
        assert_eq!(lines.len(), 3);
        assert_ne!(lines[1], lines[2]);
        assert!(lines[1].ends_with(",NYC,4.2"));
        assert!(lines[2].ends_with(",NYC ,4.2"));
    }

    #[test]
    fn short_footer_row_in_reference_is_dropped() {
        let metro = "List 1\nMarch 2020\n\
                     CBSA Code,Metropolitan Division Code,CBSA Title,State Name\n\
                     35620,,New York-Newark-Jersey City,New York\n\
                     ,\n";

        let (stats, lines) = run(HEAT, metro, GEO);

        assert_eq!(lines.len(), 2);
        assert_eq!(stats.metro_null_keys, 1);
    }

    #[test]
    fn zip_without_geography_is_excluded() {
        let heat = "ZIP,MSA,UHII.Wght\n10001,35620,4.2\n99950,35620,0.4\n";

        let (stats, lines) = run(heat, METRO, GEO);

        assert_eq!(lines.len(), 2);
        assert_eq!(stats.excluded_by_zip, 1);
    }

    #[test]
    fn duplicate_reference_rows_do_not_duplicate_output() {
        let metro = "List 1\nMarch 2020\nCBSA Code,Metropolitan Division Code,CBSA Title\n\
                     35620,35004,New York-Newark-Jersey City\n\
                     35620,35084,New York-Newark-Jersey City\n";

        let (stats, lines) = run(HEAT, metro, GEO);

        assert_eq!(lines.len(), 2);
        assert_eq!(stats.metro_duplicates, 1);
    }

    #[test]
    fn conflicting_titles_fan_out() {
        let metro = "List 1\nMarch 2020\nCBSA Code,CBSA Title\n\
                     35620,New York-Newark-Jersey City\n\
                     35620,New York-Northern New Jersey\n";

        let (_, lines) = run(HEAT, metro, GEO);

        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with(",New York-Newark-Jersey City,4.2"));
        assert!(lines[2].ends_with(",New York-Northern New Jersey,4.2"));
    }

    #[test]
    fn header_is_fixed_regardless_of_input_column_order() {
        let heat = "UHII.Wght,MSA,ZIP\n4.2,35620,10001\n";
        let geo = "density,population,state_name,state_id,city,zip\n\
                   15000,21000,New York,NY,New York,10001\n";

        let (_, lines) = run(heat, METRO, geo);

        assert_eq!(lines[0], HEADER);
        assert_eq!(
            lines[1],
            "10001,New York,NY,New York,21000,15000,New York-Newark-Jersey City,4.2"
        );
    }

    #[test]
    fn non_numeric_metro_code_aborts_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let heat = "ZIP,MSA,UHII.Wght\n10001,35620,4.2\n10002,unknown,3.0\n";
        let paths = fixture(dir.path(), heat, METRO, GEO);

        let err = clean(&load_inputs(&paths).unwrap()).unwrap_err();

        assert!(matches!(
            err,
            UhiiError::InvalidMetroCode {
                table: normalize::HEAT_INDEX_TABLE,
                row: 2,
                ..
            }
        ));
        assert!(!dir.path().join("clean_uhii_by_zip.csv").exists());
    }
}
