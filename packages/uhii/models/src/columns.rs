//! Column names of the source files and of the cleaned output.

/// ZIP code column in the heat-index file and the canonical join key.
pub const ZIP: &str = "ZIP";
/// CBSA code column in the heat-index file, and the canonical metro key.
pub const MSA: &str = "MSA";
/// Population-weighted heat island value in the heat-index file.
pub const UHII_WEIGHTED: &str = "UHII.Wght";

/// CBSA code column in the delineation file.
pub const CBSA_CODE: &str = "CBSA Code";
/// CBSA title column in the delineation file.
pub const CBSA_TITLE: &str = "CBSA Title";

/// ZIP code column in the geography file.
pub const GEO_ZIP: &str = "zip";

/// Canonical metro title column in the output.
pub const MSA_NAME: &str = "MSA_Name";
/// Canonical heat island column in the output.
pub const UHII: &str = "UHII";

/// Output header, in order.
pub const OUTPUT_COLUMNS: [&str; 8] = [
    ZIP,
    "city",
    "state_id",
    "state_name",
    "population",
    "density",
    MSA_NAME,
    UHII,
];
