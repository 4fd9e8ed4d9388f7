use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Terminal fallback category when no rule produces a classification.
pub const UNCLASSIFIED: &str = "unclassified";

/// A single news item as produced by feed ingestion or a news JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl NewsRecord {
    /// Title and summary concatenated — the text all matching and scoring runs on.
    pub fn full_text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }
}

/// Score for one configured risk category. Dense output: every configured
/// category appears, zero-scored ones included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: String,
    pub score: f64,
}

/// Derived classification for one news record. Computed fresh on every pass;
/// re-classifying a record fully replaces any earlier result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Every canonical entity whose pattern matched, in configuration order.
    pub matched_entities: Vec<String>,
    /// First matched entity (configuration order doubles as priority).
    pub primary_entity: Option<String>,
    /// Dense score map over the configured category set, configuration order.
    pub category_scores: Vec<CategoryScore>,
    pub primary_category: String,
    pub primary_score: f64,
}

impl ClassificationResult {
    pub fn score_for(&self, category: &str) -> Option<f64> {
        self.category_scores
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.score)
    }
}

/// One raw observation from the metric source (CSV/DB extraction upstream).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    pub entity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<String>,
    pub metric: String,
    /// Missing values stay missing; they are never coerced to zero.
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
}

/// Normalized subscore for one readiness dimension. `None` means no data,
/// which is distinct from a measured 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionSubscore {
    pub dimension: String,
    pub normalized: Option<f64>,
}

/// Composite readiness index for one entity.
///
/// Invariant: when `composite` is present, `weights_used` covers exactly the
/// dimensions with a present subscore and sums to 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessScore {
    pub entity: String,
    /// 0–100, or `None` when every dimension is missing for this entity.
    pub composite: Option<f64>,
    /// Dense over the configured dimension set, configuration order.
    pub subscores: Vec<DimensionSubscore>,
    /// Renormalized weights actually applied, present dimensions only.
    pub weights_used: BTreeMap<String, f64>,
}

impl ReadinessScore {
    pub fn subscore(&self, dimension: &str) -> Option<f64> {
        self.subscores
            .iter()
            .find(|s| s.dimension == dimension)
            .and_then(|s| s.normalized)
    }
}
