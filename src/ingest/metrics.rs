use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::models::MetricRecord;

/// Column synonyms accepted for the identity columns.
const ENTITY_HEADERS: &[&str] = &["entity", "vendor", "supplier", "seller"];
const COUNTERPARTY_HEADERS: &[&str] = &["counterparty", "customer", "client", "buyer", "account"];
const PERIOD_HEADERS: &[&str] = &["period", "date", "month"];

/// Metric columns lifted out of a wide row, one record per populated cell.
/// Each entry maps a canonical metric name to the header spellings that
/// commercial exports commonly use for it.
const METRIC_HEADERS: &[(&str, &[&str])] = &[
    (
        "orders",
        &["orders", "order_value", "order_usd", "po_value", "po_usd", "bookings"],
    ),
    (
        "billings",
        &["billings", "shipments", "invoice_value", "billed_usd", "revenue", "sales"],
    ),
    ("backlog", &["backlog", "backlog_usd", "open_orders_usd"]),
    (
        "lead_time_weeks",
        &["lead_time_weeks", "lt_weeks", "leadtime_weeks"],
    ),
    ("otif_pct", &["otif_pct", "otif", "on_time_in_full_pct"]),
    (
        "spares_fill_rate",
        &["spares_fill_rate", "spares_service_level", "spares_otif"],
    ),
    (
        "fte_on_site",
        &["fte_on_site", "field_eng_onsite", "support_coverage", "tech_coverage"],
    ),
];

/// Canonical metric name for a header cell, if the column is recognized.
fn canonical_metric(column: &str) -> Option<&'static str> {
    METRIC_HEADERS
        .iter()
        .find(|(_, synonyms)| synonyms.contains(&column))
        .map(|(canonical, _)| *canonical)
}

/// Load metric rows from a wide CSV file.
///
/// Each data row produces one `MetricRecord` per recognized metric column.
/// Cells that fail to parse as numbers become missing values; a row without
/// an entity is skipped. Only a missing file or an unusable header is an
/// error.
pub fn load_metrics(path: &Path) -> Result<Vec<MetricRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read metrics file: {}", path.display()))?;
    parse_metrics(&content).with_context(|| format!("Invalid metrics CSV: {}", path.display()))
}

fn parse_metrics(content: &str) -> Result<Vec<MetricRecord>> {
    let mut lines = content.lines().filter(|l| !l.trim().is_empty());
    let Some(header_line) = lines.next() else {
        return Ok(Vec::new());
    };

    let header = Header::parse(header_line)?;
    let mut records = Vec::new();

    for line in lines {
        let fields = split_csv_line(line);
        let Some(entity) = header.field(&fields, header.entity) else {
            continue;
        };
        let counterparty = header.optional_field(&fields, header.counterparty);
        let period = header.optional_field(&fields, header.period);

        for (column, metric) in &header.metrics {
            let raw = match fields.get(*column) {
                Some(cell) if !cell.trim().is_empty() => cell.trim(),
                _ => continue,
            };
            records.push(MetricRecord {
                entity: entity.clone(),
                counterparty: counterparty.clone(),
                metric: metric.clone(),
                value: parse_number(raw),
                period: period.clone(),
            });
        }
    }

    Ok(records)
}

struct Header {
    entity: usize,
    counterparty: Option<usize>,
    period: Option<usize>,
    metrics: Vec<(usize, String)>,
}

impl Header {
    fn parse(line: &str) -> Result<Header> {
        let columns: Vec<String> = split_csv_line(line)
            .iter()
            .map(|c| c.trim().to_lowercase())
            .collect();

        let find = |names: &[&str]| columns.iter().position(|c| names.contains(&c.as_str()));

        let Some(entity) = find(ENTITY_HEADERS) else {
            bail!("No entity column found (expected one of: {})", ENTITY_HEADERS.join(", "));
        };

        let metrics: Vec<(usize, String)> = columns
            .iter()
            .enumerate()
            .filter_map(|(i, c)| canonical_metric(c).map(|m| (i, m.to_string())))
            .collect();
        if metrics.is_empty() {
            let known: Vec<&str> = METRIC_HEADERS.iter().map(|(name, _)| *name).collect();
            bail!("No metric columns found (expected one of: {})", known.join(", "));
        }

        Ok(Header {
            entity,
            counterparty: find(COUNTERPARTY_HEADERS),
            period: find(PERIOD_HEADERS),
            metrics,
        })
    }

    fn field(&self, fields: &[String], index: usize) -> Option<String> {
        let value = fields.get(index)?.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    fn optional_field(&self, fields: &[String], index: Option<usize>) -> Option<String> {
        self.field(fields, index?)
    }
}

/// Split one CSV line, honoring double-quoted fields with embedded commas
/// and `""` escapes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Numbers may carry thousands separators or a stray currency prefix; a cell
/// that still fails to parse becomes a missing value rather than an error.
fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-' || *c == '+')
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn load(content: &str) -> Vec<MetricRecord> {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "{}", content).unwrap();
        load_metrics(f.path()).unwrap()
    }

    #[test]
    fn test_wide_row_expands_per_metric_column() {
        let records = load("vendor,customer,month,orders,billings\nASML,TSMC,2025-06,120,100\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].entity, "ASML");
        assert_eq!(records[0].counterparty.as_deref(), Some("TSMC"));
        assert_eq!(records[0].metric, "orders");
        assert_eq!(records[0].value, Some(120.0));
        assert_eq!(records[1].metric, "billings");
        assert_eq!(records[1].period.as_deref(), Some("2025-06"));
    }

    #[test]
    fn test_header_synonyms() {
        let records = load("Supplier,Client,Date,otif_pct\nKLA,Intel,2025-05,93.5\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entity, "KLA");
        assert_eq!(records[0].counterparty.as_deref(), Some("Intel"));
        assert_eq!(records[0].value, Some(93.5));
    }

    #[test]
    fn test_metric_header_synonyms_map_to_canonical_names() {
        let records = load("vendor,bookings,revenue,backlog_usd,lt_weeks\nASML,120,100,60,8\n");
        let metrics: Vec<&str> = records.iter().map(|r| r.metric.as_str()).collect();
        assert_eq!(
            metrics,
            vec!["orders", "billings", "backlog", "lead_time_weeks"]
        );
        assert_eq!(records[1].value, Some(100.0));
    }

    #[test]
    fn test_bad_numeric_cell_becomes_missing() {
        let records = load("vendor,otif_pct\nASML,n/a\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, None);
    }

    #[test]
    fn test_quoted_entity_with_comma() {
        let records = load("vendor,orders\n\"Zeiss, Carl\",50\n");
        assert_eq!(records[0].entity, "Zeiss, Carl");
        assert_eq!(records[0].value, Some(50.0));
    }

    #[test]
    fn test_thousands_separators_are_stripped() {
        let records = load("vendor,billings\nASML,\"1,250.5\"\n");
        assert_eq!(records[0].value, Some(1250.5));
    }

    #[test]
    fn test_row_without_entity_is_skipped() {
        let records = load("vendor,orders\n,100\nASML,200\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entity, "ASML");
    }

    #[test]
    fn test_empty_metric_cell_produces_no_record() {
        let records = load("vendor,orders,billings\nASML,,75\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].metric, "billings");
    }

    #[test]
    fn test_missing_metric_columns_is_an_error() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "vendor,color\nASML,blue\n").unwrap();
        assert!(load_metrics(f.path()).is_err());
    }
}
