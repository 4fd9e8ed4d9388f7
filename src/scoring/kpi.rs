use std::collections::BTreeMap;

use crate::models::MetricRecord;
use crate::scoring::concentration;
use crate::scoring::stats::{mean, median, safe_div};

/// Volume metrics feed derived KPIs (tightness, concentration) and are not
/// exposed as dimensions themselves.
const ORDERS: &str = "orders";
const BILLINGS: &str = "billings";
const BACKLOG: &str = "backlog";

/// Rolling window (in periods) for the book-to-bill ratio.
const B2B_WINDOW: usize = 3;
/// Trailing window (in periods) for backlog coverage.
const TTM_WINDOW: usize = 12;

/// Per-entity derived KPI values, keyed by metric name. These are the raw
/// inputs the composite scorer normalizes.
#[derive(Debug, Clone, Default)]
pub struct EntityKpis {
    values: BTreeMap<String, f64>,
}

impl EntityKpis {
    pub fn get(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied()
    }

    pub fn insert(&mut self, metric: &str, value: f64) {
        self.values.insert(metric.to_string(), value);
    }
}

/// Derived KPI table over all entities seen in the metric rows.
#[derive(Debug, Clone, Default)]
pub struct KpiTable {
    entities: BTreeMap<String, EntityKpis>,
}

impl KpiTable {
    pub fn get(&self, entity: &str) -> Option<&EntityKpis> {
        self.entities.get(entity)
    }

    pub fn entities(&self) -> impl Iterator<Item = (&String, &EntityKpis)> {
        self.entities.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }
}

/// Reduce raw metric rows to per-entity KPI inputs.
///
/// Plain metrics aggregate across rows (median for lead time and field FTE,
/// mean otherwise). Volume metrics roll up into book-to-bill, backlog
/// coverage, and counterparty concentration. Rows with a missing value are
/// skipped; an entity with no usable rows simply has no KPIs.
pub fn build(rows: &[MetricRecord]) -> KpiTable {
    let mut plain: BTreeMap<String, BTreeMap<String, Vec<f64>>> = BTreeMap::new();
    // entity → period → (orders, billings, backlog) sums
    let mut volume: BTreeMap<String, BTreeMap<String, VolumePeriod>> = BTreeMap::new();

    for row in rows {
        let Some(value) = row.value else { continue };
        match row.metric.as_str() {
            ORDERS | BILLINGS | BACKLOG => {
                let period = month_key(row.period.as_deref());
                let slot = volume
                    .entry(row.entity.clone())
                    .or_default()
                    .entry(period)
                    .or_default();
                match row.metric.as_str() {
                    ORDERS => add(&mut slot.orders, value),
                    BILLINGS => add(&mut slot.billings, value),
                    _ => add(&mut slot.backlog, value),
                }
            }
            metric => {
                plain
                    .entry(row.entity.clone())
                    .or_default()
                    .entry(metric.to_string())
                    .or_default()
                    .push(value);
            }
        }
    }

    let mut table = KpiTable::default();

    for (entity, metrics) in &plain {
        let kpis = table.entities.entry(entity.clone()).or_default();
        for (metric, values) in metrics {
            if let Some(v) = aggregate(metric, values) {
                kpis.insert(metric, v);
            }
        }
    }

    for (entity, periods) in &volume {
        let kpis = table.entities.entry(entity.clone()).or_default();
        if let Some(b2b) = book_to_bill(periods) {
            kpis.insert("book_to_bill", b2b);
        }
        if let Some(months) = backlog_months(periods) {
            kpis.insert("backlog_months", months);
        }
    }

    // Concentration over billings, falling back to bookings when no billings
    // rows carry a counterparty.
    let mut conc = concentration::by_entity(rows, BILLINGS);
    if conc.is_empty() {
        conc = concentration::by_entity(rows, ORDERS);
    }
    for (entity, stats) in conc {
        let kpis = table.entities.entry(entity).or_default();
        if let Some(share) = stats.max_share {
            kpis.insert("max_customer_share", share);
        }
        if let Some(hhi) = stats.hhi {
            kpis.insert("hhi", f64::from(hhi));
        }
    }

    table
}

/// Per-period volume sums. A field stays `None` until the metric is actually
/// observed in that period, so a never-reported metric cannot read as a
/// measured zero downstream.
#[derive(Debug, Clone, Copy, Default)]
struct VolumePeriod {
    orders: Option<f64>,
    billings: Option<f64>,
    backlog: Option<f64>,
}

fn add(slot: &mut Option<f64>, value: f64) {
    *slot = Some(slot.unwrap_or(0.0) + value);
}

/// Sum of the observed values, `None` when nothing was observed.
fn sum_present<I: Iterator<Item = Option<f64>>>(values: I) -> Option<f64> {
    values
        .flatten()
        .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

fn aggregate(metric: &str, values: &[f64]) -> Option<f64> {
    match metric {
        "lead_time_weeks" | "fte_on_site" => median(values),
        _ => mean(values),
    }
}

/// Σ orders / Σ billings over the latest `B2B_WINDOW` periods present.
/// Missing when the window holds no order or no billing observations.
fn book_to_bill(periods: &BTreeMap<String, VolumePeriod>) -> Option<f64> {
    let window = last_n(periods, B2B_WINDOW);
    let orders = sum_present(window.iter().map(|p| p.orders))?;
    let billings = sum_present(window.iter().map(|p| p.billings))?;
    safe_div(orders, billings)
}

/// Latest-period backlog ÷ (trailing billings / 12). Missing unless the latest
/// period carries a backlog observation and billings were observed at all.
fn backlog_months(periods: &BTreeMap<String, VolumePeriod>) -> Option<f64> {
    let latest_backlog = periods.values().last().and_then(|p| p.backlog)?;
    let ttm_billings = sum_present(last_n(periods, TTM_WINDOW).iter().map(|p| p.billings))?;
    safe_div(latest_backlog, ttm_billings / 12.0)
}

fn last_n(periods: &BTreeMap<String, VolumePeriod>, n: usize) -> Vec<&VolumePeriod> {
    let skip = periods.len().saturating_sub(n);
    periods.values().skip(skip).collect()
}

/// Periods compare lexicographically as `YYYY-MM`; longer date strings are
/// truncated to their month prefix, anything else is kept verbatim.
fn month_key(period: Option<&str>) -> String {
    let raw = period.unwrap_or("").trim();
    raw.get(..7).unwrap_or(raw).to_string()
}
