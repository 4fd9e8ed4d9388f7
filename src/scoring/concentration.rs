use std::collections::BTreeMap;

use crate::models::MetricRecord;
use crate::scoring::stats::safe_div;

/// Counterparty-concentration statistics for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcentrationStats {
    /// Largest single-counterparty share of the entity total, in [0, 1].
    pub max_share: Option<f64>,
    /// Herfindahl–Hirschman index, round(Σ share² × 10000), in [0, 10000].
    pub hhi: Option<u32>,
}

impl ConcentrationStats {
    pub const MISSING: ConcentrationStats = ConcentrationStats {
        max_share: None,
        hhi: None,
    };
}

/// Concentration over a grouped value table: counterparty → summed value.
///
/// A zero or empty total yields missing statistics, never an error.
pub fn concentration(by_counterparty: &BTreeMap<String, f64>) -> ConcentrationStats {
    let total: f64 = by_counterparty.values().sum();

    let shares: Vec<f64> = by_counterparty
        .values()
        .filter_map(|v| safe_div(*v, total))
        .map(|s| s.clamp(0.0, 1.0))
        .collect();
    if shares.is_empty() {
        return ConcentrationStats::MISSING;
    }

    let max_share = shares.iter().copied().fold(f64::MIN, f64::max);
    let hhi = (shares.iter().map(|s| s * s).sum::<f64>() * 10_000.0).round() as u32;

    ConcentrationStats {
        max_share: Some(max_share),
        hhi: Some(hhi),
    }
}

/// Group raw metric rows of one base metric into per-entity concentration
/// statistics. Rows without a counterparty or value are ignored.
pub fn by_entity(rows: &[MetricRecord], base_metric: &str) -> BTreeMap<String, ConcentrationStats> {
    let mut grouped: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for row in rows {
        if row.metric != base_metric {
            continue;
        }
        let (Some(counterparty), Some(value)) = (&row.counterparty, row.value) else {
            continue;
        };
        *grouped
            .entry(row.entity.clone())
            .or_default()
            .entry(counterparty.clone())
            .or_insert(0.0) += value;
    }

    grouped
        .into_iter()
        .map(|(entity, table)| {
            let stats = concentration(&table);
            (entity, stats)
        })
        .collect()
}
