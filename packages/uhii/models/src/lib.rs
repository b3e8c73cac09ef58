#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Urban heat island index row types.
//!
//! These types describe the three reference tables the cleaning pipeline
//! reads (ZIP-level heat index, CBSA metro delineation, ZIP geography)
//! and the flat per-ZIP row it writes. They carry no I/O of their own.

pub mod columns;
pub mod missing;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A heat-index row after its metro key has been validated.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatIndexRow {
    /// Five-digit ZIP code, parsed as an integer (leading zeros dropped).
    pub zip: u32,
    /// CBSA code of the metro area the ZIP belongs to.
    pub msa: i64,
    /// Population-weighted UHII value (`UHII.Wght` in the source file).
    pub uhii: Option<f64>,
}

/// A deduplicated `(code, title)` pair from the CBSA delineation file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetroReference {
    /// CBSA code.
    pub code: i64,
    /// CBSA title (e.g. "New York-Newark-Jersey City, NY-NJ").
    pub title: Option<String>,
}

/// A row of the ZIP geography table, restricted to the columns the
/// output needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoRow {
    /// ZIP code (`zip` in the source file, `ZIP` everywhere else).
    pub zip: u32,
    /// Primary city name.
    pub city: String,
    /// Two-letter state abbreviation.
    pub state_id: String,
    /// Full state name.
    pub state_name: String,
    /// Resident population.
    #[serde(deserialize_with = "missing::lenient_integer")]
    pub population: Option<u64>,
    /// Residents per square mile.
    #[serde(deserialize_with = "missing::lenient")]
    pub density: Option<f64>,
}

/// One row of the cleaned per-ZIP dataset.
///
/// Field order is the output column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    /// ZIP code.
    #[serde(rename = "ZIP")]
    pub zip: u32,
    /// Primary city name.
    pub city: String,
    /// Two-letter state abbreviation.
    pub state_id: String,
    /// Full state name.
    pub state_name: String,
    /// Resident population.
    #[serde(deserialize_with = "missing::lenient_integer")]
    pub population: Option<u64>,
    /// Residents per square mile.
    #[serde(
        deserialize_with = "missing::lenient",
        serialize_with = "missing::shortest"
    )]
    pub density: Option<f64>,
    /// Metro area title, empty when the ZIP's CBSA code had no match.
    #[serde(rename = "MSA_Name", deserialize_with = "missing::lenient")]
    pub msa_name: Option<String>,
    /// Urban heat island index.
    #[serde(
        rename = "UHII",
        deserialize_with = "missing::lenient",
        serialize_with = "missing::shortest"
    )]
    pub uhii: Option<f64>,
}

/// Mean UHII for a single metro area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetroSummary {
    /// Metro area title.
    pub name: String,
    /// Mean UHII over the metro's ZIPs that carry a value.
    pub mean_uhii: f64,
    /// Number of ZIPs that contributed to the mean.
    pub zip_count: u64,
    /// States the metro's ZIPs fall in.
    pub states: BTreeSet<String>,
}

/// Metro areas ranked by mean UHII, highest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    /// Mean of the per-metro means, `None` when no metro has a value.
    pub national_average: Option<f64>,
    /// All metros, sorted by mean UHII descending then by name.
    pub metros: Vec<MetroSummary>,
}

impl SummaryReport {
    /// Returns at most `n` of the hottest metros.
    #[must_use]
    pub fn top(&self, n: usize) -> &[MetroSummary] {
        &self.metros[..n.min(self.metros.len())]
    }
}

/// What a bar of a metro comparison stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonKind {
    /// One of the hottest metros.
    Peer,
    /// The metro being compared.
    Selected,
    /// Mean of all metro means.
    NationalAverage,
}

/// One bar of a metro comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonEntry {
    /// Metro title, or `National Average`.
    pub label: String,
    /// Mean UHII.
    pub mean_uhii: f64,
    /// What this entry represents.
    pub kind: ComparisonKind,
}

/// A single metro set against the hottest metros and the national
/// average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetroComparison {
    /// 1-based position in the ranking.
    pub rank: usize,
    /// Number of ranked metros.
    pub ranked: usize,
    /// The selected metro.
    pub metro: MetroSummary,
    /// Mean of all metro means.
    pub national_average: f64,
    /// Selected mean minus the national average.
    pub difference: f64,
    /// Hottest metros, the selected metro and the national average,
    /// highest first.
    pub entries: Vec<ComparisonEntry>,
}
