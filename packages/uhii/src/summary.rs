//! Per-metro heat island summary of a cleaned dataset.
//!
//! Groups cleaned rows by metro title and ranks metros by mean UHII.
//! Rows without a metro title or without a UHII value do not contribute;
//! a blank UHII is skipped, not counted as zero.
//!
//! A single metro can also be compared against the hottest metros and
//! the national average, and its ZIPs listed.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use heat_island_uhii_models::{
    ComparisonEntry, ComparisonKind, MetroComparison, MetroSummary, OutputRow, SummaryReport,
};

use crate::UhiiError;

/// Hottest metros shown next to a selected one.
pub const COMPARISON_PEERS: usize = 5;

/// Label of the national average entry in a comparison.
pub const NATIONAL_AVERAGE_LABEL: &str = "National Average";

/// Reads a cleaned dataset back from disk.
///
/// # Errors
///
/// Returns [`UhiiError`] if the file cannot be read or is not a cleaned
/// dataset.
pub fn read_output(path: &Path) -> Result<Vec<OutputRow>, UhiiError> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| UhiiError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    reader
        .deserialize()
        .collect::<Result<Vec<OutputRow>, _>>()
        .map_err(|source| UhiiError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: u64,
    states: BTreeSet<String>,
}

/// Computes per-metro mean UHII and the national average of those means.
#[must_use]
pub fn summarize(rows: &[OutputRow]) -> SummaryReport {
    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();

    for row in rows {
        let Some(name) = row.msa_name.as_deref().map(str::trim) else {
            continue;
        };
        let Some(uhii) = row.uhii.filter(|v| v.is_finite()) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }

        let acc = groups.entry(name).or_default();
        acc.sum += uhii;
        acc.count += 1;
        acc.states.insert(row.state_name.clone());
    }

    #[allow(clippy::cast_precision_loss)]
    let mut metros: Vec<MetroSummary> = groups
        .into_iter()
        .map(|(name, acc)| MetroSummary {
            name: name.to_string(),
            mean_uhii: acc.sum / acc.count as f64,
            zip_count: acc.count,
            states: acc.states,
        })
        .collect();

    metros.sort_by(|a, b| {
        b.mean_uhii
            .total_cmp(&a.mean_uhii)
            .then_with(|| a.name.cmp(&b.name))
    });

    #[allow(clippy::cast_precision_loss)]
    let national_average = if metros.is_empty() {
        None
    } else {
        Some(metros.iter().map(|m| m.mean_uhii).sum::<f64>() / metros.len() as f64)
    };

    log::debug!("Summarized {} rows into {} metros", rows.len(), metros.len());

    SummaryReport {
        national_average,
        metros,
    }
}

/// Compares one metro with the [`COMPARISON_PEERS`] hottest metros and
/// the national average.
///
/// Returns `None` when `name` is not a ranked metro.
#[must_use]
pub fn compare(report: &SummaryReport, name: &str) -> Option<MetroComparison> {
    let name = name.trim();
    let idx = report.metros.iter().position(|m| m.name == name)?;
    let national_average = report.national_average?;
    let metro = report.metros[idx].clone();

    let mut entries: Vec<ComparisonEntry> = report
        .top(COMPARISON_PEERS)
        .iter()
        .map(|m| ComparisonEntry {
            label: m.name.clone(),
            mean_uhii: m.mean_uhii,
            kind: if m.name == name {
                ComparisonKind::Selected
            } else {
                ComparisonKind::Peer
            },
        })
        .collect();
    if idx >= COMPARISON_PEERS {
        entries.push(ComparisonEntry {
            label: metro.name.clone(),
            mean_uhii: metro.mean_uhii,
            kind: ComparisonKind::Selected,
        });
    }
    entries.push(ComparisonEntry {
        label: NATIONAL_AVERAGE_LABEL.to_string(),
        mean_uhii: national_average,
        kind: ComparisonKind::NationalAverage,
    });
    entries.sort_by(|a, b| b.mean_uhii.total_cmp(&a.mean_uhii));

    Some(MetroComparison {
        rank: idx + 1,
        ranked: report.metros.len(),
        difference: metro.mean_uhii - national_average,
        metro,
        national_average,
        entries,
    })
}

/// Rows of one metro, in file order.
///
/// Titles are matched after trimming, the same way [`summarize`] groups
/// them.
#[must_use]
pub fn metro_zips<'a>(rows: &'a [OutputRow], name: &str) -> Vec<&'a OutputRow> {
    let name = name.trim();
    rows.iter()
        .filter(|row| row.msa_name.as_deref().map(str::trim) == Some(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(zip: u32, state: &str, metro: Option<&str>, uhii: Option<f64>) -> OutputRow {
        OutputRow {
            zip,
            city: "City".to_string(),
            state_id: "XX".to_string(),
            state_name: state.to_string(),
            population: Some(1),
            density: Some(1.0),
            msa_name: metro.map(str::to_owned),
            uhii,
        }
    }

    #[test]
    fn ranks_metros_by_mean_uhii() {
        let rows = vec![
            row(1, "Arizona", Some("Phoenix"), Some(6.0)),
            row(2, "Arizona", Some("Phoenix"), Some(4.0)),
            row(3, "Tennessee", Some("Nashville"), Some(3.0)),
            row(4, "New York", Some("New York"), Some(7.0)),
            row(5, "New Jersey", Some("New York"), Some(5.0)),
        ];

        let report = summarize(&rows);

        let ranked: Vec<_> = report
            .metros
            .iter()
            .map(|m| (m.name.as_str(), m.mean_uhii, m.zip_count))
            .collect();
        assert_eq!(
            ranked,
            vec![
                ("New York", 6.0, 2),
                ("Phoenix", 5.0, 2),
                ("Nashville", 3.0, 1),
            ]
        );
        assert_eq!(
            report.metros[0].states.iter().collect::<Vec<_>>(),
            vec!["New Jersey", "New York"]
        );
        let avg = report.national_average.unwrap();
        assert!((avg - 14.0 / 3.0).abs() < 1e-12);
        assert_eq!(report.top(2).len(), 2);
    }

    #[test]
    fn skips_rows_without_metro_or_value() {
        let rows = vec![
            row(1, "Montana", None, Some(9.0)),
            row(2, "Montana", Some("   "), Some(9.0)),
            row(3, "Ohio", Some("Columbus"), None),
            row(4, "Ohio", Some("Columbus"), Some(2.0)),
        ];

        let report = summarize(&rows);

        assert_eq!(report.metros.len(), 1);
        assert_eq!(report.metros[0].zip_count, 1);
        assert_eq!(report.national_average, Some(2.0));
    }

    #[test]
    fn empty_input_has_no_average() {
        let report = summarize(&[]);
        assert!(report.metros.is_empty());
        assert_eq!(report.national_average, None);
    }

    #[test]
    fn ties_break_by_name() {
        let rows = vec![
            row(1, "Texas", Some("Waco"), Some(2.0)),
            row(2, "Texas", Some("Austin"), Some(2.0)),
        ];

        let report = summarize(&rows);

        assert_eq!(report.metros[0].name, "Austin");
        assert_eq!(report.metros[1].name, "Waco");
    }

    fn ranked() -> Vec<OutputRow> {
        [
            ("Phoenix", 6.0),
            ("Las Vegas", 5.5),
            ("Tucson", 5.0),
            ("El Paso", 4.5),
            ("Fresno", 4.0),
            ("Nashville", 3.0),
            ("Boise", 1.0),
        ]
        .iter()
        .zip(1..)
        .map(|((name, uhii), zip)| row(zip, "State", Some(*name), Some(*uhii)))
        .collect()
    }

    #[test]
    fn compare_places_metro_outside_top_peers() {
        let report = summarize(&ranked());

        let comparison = compare(&report, "Nashville").unwrap();

        assert_eq!(comparison.rank, 6);
        assert_eq!(comparison.ranked, 7);
        let avg = 29.0 / 7.0;
        assert!((comparison.national_average - avg).abs() < 1e-12);
        assert!((comparison.difference - (3.0 - avg)).abs() < 1e-12);

        let labels: Vec<_> = comparison
            .entries
            .iter()
            .map(|e| (e.label.as_str(), e.kind))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("Phoenix", ComparisonKind::Peer),
                ("Las Vegas", ComparisonKind::Peer),
                ("Tucson", ComparisonKind::Peer),
                ("El Paso", ComparisonKind::Peer),
                (NATIONAL_AVERAGE_LABEL, ComparisonKind::NationalAverage),
                ("Fresno", ComparisonKind::Peer),
                ("Nashville", ComparisonKind::Selected),
            ]
        );
    }

    #[test]
    fn compare_marks_metro_already_among_peers() {
        let report = summarize(&ranked());

        let comparison = compare(&report, " Tucson ").unwrap();

        assert_eq!(comparison.rank, 3);
        assert!(comparison.difference > 0.0);
        assert_eq!(comparison.entries.len(), COMPARISON_PEERS + 1);
        assert_eq!(
            comparison
                .entries
                .iter()
                .filter(|e| e.kind == ComparisonKind::Selected)
                .count(),
            1
        );
    }

    #[test]
    fn compare_unknown_metro_is_none() {
        let report = summarize(&ranked());
        assert!(compare(&report, "Atlantis").is_none());
        assert!(compare(&summarize(&[]), "Phoenix").is_none());
    }

    #[test]
    fn metro_zips_lists_rows_of_one_metro() {
        let rows = vec![
            row(85001, "Arizona", Some("Phoenix"), Some(6.0)),
            row(37201, "Tennessee", Some("Nashville"), Some(3.0)),
            row(85002, "Arizona", Some("Phoenix "), None),
            row(59001, "Montana", None, Some(1.0)),
        ];

        let zips: Vec<_> = metro_zips(&rows, "Phoenix").iter().map(|r| r.zip).collect();

        assert_eq!(zips, vec![85001, 85002]);
        assert!(metro_zips(&rows, "Boise").is_empty());
    }
}
