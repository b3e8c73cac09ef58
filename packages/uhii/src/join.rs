//! Hash joins on the metro code and the ZIP code.
//!
//! Both joins keep the left side's row order. When the right side has
//! several rows for one key, the left row is repeated once per match, in
//! the right side's order.

use std::collections::HashMap;

use heat_island_uhii_models::{GeoRow, HeatIndexRow, MetroReference};

/// A heat-index row paired with its metro reference, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WithMetro<'a> {
    /// The heat-index row.
    pub heat: &'a HeatIndexRow,
    /// Matching CBSA pair; `None` when the code is not in the reference.
    pub metro: Option<&'a MetroReference>,
}

impl WithMetro<'_> {
    /// Metro title, `None` when unmatched or when the title itself is
    /// missing.
    #[must_use]
    pub fn msa_name(&self) -> Option<&str> {
        self.metro.and_then(|m| m.title.as_deref())
    }
}

/// A metro-joined row that also matched a geography row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WithGeography<'a> {
    /// Heat index and metro side.
    pub left: WithMetro<'a>,
    /// Geography side.
    pub geo: &'a GeoRow,
}

/// Left-joins heat-index rows to CBSA pairs on the metro code.
///
/// Every heat-index row yields at least one result.
#[must_use]
pub fn left_join_metro<'a>(
    heat: &'a [HeatIndexRow],
    metro: &'a [MetroReference],
) -> Vec<WithMetro<'a>> {
    let mut by_code: HashMap<i64, Vec<&MetroReference>> = HashMap::new();
    for pair in metro {
        by_code.entry(pair.code).or_default().push(pair);
    }

    let mut out = Vec::with_capacity(heat.len());
    for row in heat {
        match by_code.get(&row.msa) {
            Some(matches) => out.extend(matches.iter().map(|m| WithMetro {
                heat: row,
                metro: Some(*m),
            })),
            None => out.push(WithMetro {
                heat: row,
                metro: None,
            }),
        }
    }
    out
}

/// Inner-joins metro-joined rows to geography rows on the ZIP code.
///
/// Rows whose ZIP has no geography are dropped.
#[must_use]
pub fn inner_join_geography<'a>(
    joined: Vec<WithMetro<'a>>,
    geography: &'a [GeoRow],
) -> Vec<WithGeography<'a>> {
    let mut by_zip: HashMap<u32, Vec<&GeoRow>> = HashMap::new();
    for geo in geography {
        by_zip.entry(geo.zip).or_default().push(geo);
    }

    joined
        .into_iter()
        .flat_map(|left| {
            by_zip
                .get(&left.heat.zip)
                .into_iter()
                .flatten()
                .map(move |geo| WithGeography { left, geo: *geo })
        })
        .collect()
}
