#![allow(clippy::module_name_repetitions)]
//! Default input and output locations.
//!
//! Inputs live under `data/` relative to the working directory; the
//! cleaned dataset is written to the working directory itself.

use std::path::PathBuf;

/// ZIP-level heat island index.
pub const DEFAULT_HEAT_INDEX_PATH: &str = "data/zip_UHII.csv";

/// Census CBSA delineation file (two preamble lines, Latin-1).
pub const DEFAULT_METRO_PATH: &str = "data/CBSA_Map.csv";

/// ZIP geography with city, state, population and density.
pub const DEFAULT_GEOGRAPHY_PATH: &str = "data/uszips.csv";

/// Cleaned per-ZIP dataset.
pub const DEFAULT_OUTPUT_PATH: &str = "clean_uhii_by_zip.csv";

/// Locations of the three input tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    /// Heat island index CSV.
    pub heat_index: PathBuf,
    /// CBSA delineation CSV.
    pub metro: PathBuf,
    /// ZIP geography CSV.
    pub geography: PathBuf,
}

impl Default for InputPaths {
    fn default() -> Self {
        Self {
            heat_index: PathBuf::from(DEFAULT_HEAT_INDEX_PATH),
            metro: PathBuf::from(DEFAULT_METRO_PATH),
            geography: PathBuf::from(DEFAULT_GEOGRAPHY_PATH),
        }
    }
}
