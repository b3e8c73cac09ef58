//! Missing-value detection for CSV fields.
//!
//! Census and research extracts mark absent values in several ways. A
//! field is treated as missing when it is blank or matches one of the
//! conventional placeholder spellings below.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serializer};

/// Placeholder spellings that mean "no value".
pub const NULL_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Returns `true` if a raw CSV field holds no value.
#[must_use]
pub fn is_null(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || NULL_MARKERS.contains(&trimmed)
}

/// Returns the trimmed field, or `None` if it is missing.
#[must_use]
pub fn non_null(raw: &str) -> Option<&str> {
    if is_null(raw) { None } else { Some(raw.trim()) }
}

/// Deserializes an optional value from its text form.
///
/// Missing fields and fields that do not parse as `T` both become `None`.
///
/// # Errors
///
/// Only fails if the underlying field cannot be read as a string.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = String::deserialize(deserializer)?;
    Ok(non_null(&raw).and_then(|s| s.parse().ok()))
}

/// Parses integer text, also accepting integral float text (`21000.0`)
/// as written by tools that store whole numbers as floats.
///
/// Returns `None` for fractional, non-finite, out-of-range or
/// non-numeric text.
#[must_use]
pub fn parse_integral(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }

    let value = trimmed.parse::<f64>().ok()?;
    #[allow(clippy::cast_precision_loss)]
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    if value.is_finite() && value.fract() == 0.0 && in_range {
        #[allow(clippy::cast_possible_truncation)]
        return Some(value as i64);
    }

    None
}

/// Deserializes an optional integer with [`parse_integral`] rules.
///
/// Missing fields, non-integral text and values that do not fit `T` all
/// become `None`.
///
/// # Errors
///
/// Only fails if the underlying field cannot be read as a string.
pub fn lenient_integer<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(non_null(&raw)
        .and_then(parse_integral)
        .and_then(|value| T::try_from(value).ok()))
}

/// Serializes an optional value with its `Display` form, so floats are
/// written in shortest form (`15000`, `4.2`) and `None` as an empty field.
///
/// # Errors
///
/// Propagates serializer errors.
#[allow(clippy::ref_option)]
pub fn shortest<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Display,
{
    match value {
        Some(v) => serializer.collect_str(v),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_whitespace_are_null() {
        assert!(is_null(""));
        assert!(is_null("   "));
    }

    #[test]
    fn placeholder_markers_are_null() {
        for marker in NULL_MARKERS {
            assert!(is_null(marker), "{marker} should be null");
        }
        assert!(is_null(" NaN "));
    }

    #[test]
    fn values_are_not_null() {
        assert!(!is_null("35620"));
        assert!(!is_null("0"));
        assert!(!is_null("Nashville"));
        assert_eq!(non_null(" 35620 "), Some("35620"));
    }

    #[test]
    fn integral_floats_parse_as_integers() {
        assert_eq!(parse_integral("21000"), Some(21000));
        assert_eq!(parse_integral(" 21000.0 "), Some(21000));
        assert_eq!(parse_integral("-3"), Some(-3));
        assert_eq!(parse_integral("21000.5"), None);
        assert_eq!(parse_integral("inf"), None);
        assert_eq!(parse_integral("1e30"), None);
        assert_eq!(parse_integral("many"), None);
    }

    #[test]
    fn lenient_integer_reads_float_counts() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(deserialize_with = "lenient_integer")]
            count: Option<u64>,
        }

        let data = "count\n21000.0\n-5\nNA\n7\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let counts: Vec<Option<u64>> = reader
            .deserialize::<Row>()
            .map(|row| row.unwrap().count)
            .collect();

        assert_eq!(counts, vec![Some(21000), None, None, Some(7)]);
    }
}
