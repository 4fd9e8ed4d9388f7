use std::collections::BTreeMap;

use crate::config::{DimensionSpec, ReadinessConfig};
use crate::models::{DimensionSubscore, ReadinessScore};
use crate::scoring::kpi::{EntityKpis, KpiTable};
use crate::scoring::stats::{mean_present, normalize};

/// Computes the 0–100 readiness index from per-entity KPI inputs.
///
/// Configured weights are rescaled over whichever dimensions are actually
/// present for an entity; a missing dimension carries no weight and never
/// reads as a measured zero.
pub struct CompositeScorer {
    dimensions: Vec<DimensionSpec>,
}

impl CompositeScorer {
    pub fn new(config: &ReadinessConfig) -> Self {
        CompositeScorer {
            dimensions: config.dimensions.clone(),
        }
    }

    /// Score every entity in the table, best composite first; entities with a
    /// missing composite sort last, alphabetically.
    pub fn score_table(&self, table: &KpiTable) -> Vec<ReadinessScore> {
        let mut scores: Vec<ReadinessScore> = table
            .entities()
            .map(|(entity, kpis)| self.score_entity(entity, kpis))
            .collect();
        scores.sort_by(|a, b| match (a.composite, b.composite) {
            (Some(x), Some(y)) => y
                .partial_cmp(&x)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.entity.cmp(&b.entity)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.entity.cmp(&b.entity),
        });
        scores
    }

    pub fn score_entity(&self, entity: &str, kpis: &EntityKpis) -> ReadinessScore {
        let subscores: Vec<DimensionSubscore> = self
            .dimensions
            .iter()
            .map(|dim| DimensionSubscore {
                dimension: dim.name.clone(),
                normalized: dimension_subscore(dim, kpis),
            })
            .collect();

        // Only dimensions with data participate; weights renormalize over them.
        let present: Vec<(&str, f64, f64)> = self
            .dimensions
            .iter()
            .zip(&subscores)
            .filter_map(|(dim, sub)| {
                sub.normalized
                    .map(|value| (dim.name.as_str(), dim.weight, value))
            })
            .collect();

        let weight_sum: f64 = present.iter().map(|(_, w, _)| w).sum();
        let mut weights_used = BTreeMap::new();
        let mut composite = None;

        if weight_sum > 0.0 {
            let mut acc = 0.0;
            for (name, weight, value) in &present {
                let scaled = weight / weight_sum;
                weights_used.insert(name.to_string(), scaled);
                acc += scaled * value;
            }
            composite = Some(acc * 100.0);
        }

        ReadinessScore {
            entity: entity.to_string(),
            composite,
            subscores,
            weights_used,
        }
    }
}

/// Normalize each component that has data; the dimension subscore is the mean
/// of the present components, `None` when every component is absent.
fn dimension_subscore(dim: &DimensionSpec, kpis: &EntityKpis) -> Option<f64> {
    let components: Vec<Option<f64>> = dim
        .components
        .iter()
        .map(|comp| {
            kpis.get(&comp.metric)
                .and_then(|value| normalize(value, comp.lower, comp.upper, comp.direction))
        })
        .collect();
    mean_present(&components)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ComponentSpec, Direction};

    fn comp(metric: &str, lower: f64, upper: f64, direction: Direction) -> ComponentSpec {
        ComponentSpec {
            metric: metric.to_string(),
            lower,
            upper,
            direction,
        }
    }

    fn five_dimension_config() -> ReadinessConfig {
        ReadinessConfig {
            dimensions: vec![
                DimensionSpec {
                    name: "otif".to_string(),
                    weight: 0.25,
                    components: vec![comp("otif_pct", 70.0, 98.0, Direction::HigherIsBetter)],
                },
                DimensionSpec {
                    name: "lead_time".to_string(),
                    weight: 0.25,
                    components: vec![comp(
                        "lead_time_weeks",
                        4.0,
                        26.0,
                        Direction::LowerIsBetter,
                    )],
                },
                DimensionSpec {
                    name: "tightness".to_string(),
                    weight: 0.20,
                    components: vec![comp("book_to_bill", 0.8, 1.4, Direction::LowerIsBetter)],
                },
                DimensionSpec {
                    name: "concentration".to_string(),
                    weight: 0.20,
                    components: vec![
                        comp("max_customer_share", 0.0, 1.0, Direction::LowerIsBetter),
                        comp("hhi", 1000.0, 8000.0, Direction::LowerIsBetter),
                    ],
                },
                DimensionSpec {
                    name: "serviceability".to_string(),
                    weight: 0.10,
                    components: vec![comp(
                        "spares_fill_rate",
                        80.0,
                        99.0,
                        Direction::HigherIsBetter,
                    )],
                },
            ],
        }
    }

    fn kpis(entries: &[(&str, f64)]) -> EntityKpis {
        let mut k = EntityKpis::default();
        for (metric, value) in entries {
            k.insert(metric, *value);
        }
        k
    }

    #[test]
    fn test_weights_renormalize_over_present_dimensions() {
        let scorer = CompositeScorer::new(&five_dimension_config());
        let score = scorer.score_entity("V", &kpis(&[("otif_pct", 98.0), ("lead_time_weeks", 4.0)]));

        assert_eq!(score.weights_used.len(), 2);
        assert_eq!(score.weights_used["otif"], 0.5);
        assert_eq!(score.weights_used["lead_time"], 0.5);
        let sum: f64 = score.weights_used.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        // Both subscores are 1.0 at the favorable bound.
        assert_eq!(score.composite, Some(100.0));
    }

    #[test]
    fn test_missing_dimensions_do_not_appear_in_weights_used() {
        let scorer = CompositeScorer::new(&five_dimension_config());
        let score = scorer.score_entity("V", &kpis(&[("otif_pct", 84.0)]));
        assert_eq!(score.weights_used.len(), 1);
        assert!(score.weights_used.contains_key("otif"));
        assert_eq!(score.composite, Some(50.0));
    }

    #[test]
    fn test_all_missing_yields_missing_composite() {
        let scorer = CompositeScorer::new(&five_dimension_config());
        let score = scorer.score_entity("V", &EntityKpis::default());
        assert_eq!(score.composite, None);
        assert!(score.weights_used.is_empty());
        // Subscores stay dense over the configured dimensions, all missing.
        assert_eq!(score.subscores.len(), 5);
        assert!(score.subscores.iter().all(|s| s.normalized.is_none()));
    }

    #[test]
    fn test_multi_component_dimension_averages_present_parts() {
        let scorer = CompositeScorer::new(&five_dimension_config());
        // Only max_customer_share is present: share 0.5 → subscore 0.5.
        let one = scorer.score_entity("V", &kpis(&[("max_customer_share", 0.5)]));
        assert_eq!(one.subscore("concentration"), Some(0.5));

        // Adding hhi 8000 (subscore 0.0) pulls the mean to 0.25.
        let both = scorer.score_entity(
            "V",
            &kpis(&[("max_customer_share", 0.5), ("hhi", 8000.0)]),
        );
        assert_eq!(both.subscore("concentration"), Some(0.25));
    }

    #[test]
    fn test_lower_is_better_component_inverts() {
        let scorer = CompositeScorer::new(&five_dimension_config());
        let fast = scorer.score_entity("V", &kpis(&[("lead_time_weeks", 4.0)]));
        let slow = scorer.score_entity("V", &kpis(&[("lead_time_weeks", 26.0)]));
        assert_eq!(fast.subscore("lead_time"), Some(1.0));
        assert_eq!(slow.subscore("lead_time"), Some(0.0));
    }

    #[test]
    fn test_composite_stays_within_bounds() {
        let scorer = CompositeScorer::new(&five_dimension_config());
        // Raw values beyond the configured bounds clamp before weighting.
        let score = scorer.score_entity(
            "V",
            &kpis(&[("otif_pct", 120.0), ("lead_time_weeks", 1.0)]),
        );
        assert_eq!(score.composite, Some(100.0));
    }

    #[test]
    fn test_table_sorts_best_first_missing_last() {
        use crate::scoring::kpi;

        let rows = vec![
            metric_row("Poor", "otif_pct", Some(70.0)),
            metric_row("Good", "otif_pct", Some(98.0)),
            metric_row("Empty", "otif_pct", None),
        ];
        let table = kpi::build(&rows);

        let scorer = CompositeScorer::new(&five_dimension_config());
        let scores = scorer.score_table(&table);
        let order: Vec<&str> = scores.iter().map(|s| s.entity.as_str()).collect();
        // "Empty" has no usable rows at all, so it never enters the table.
        assert_eq!(order, vec!["Good", "Poor"]);
        assert!(scores[0].composite > scores[1].composite);
    }

    fn metric_row(entity: &str, metric: &str, value: Option<f64>) -> crate::models::MetricRecord {
        crate::models::MetricRecord {
            entity: entity.to_string(),
            counterparty: None,
            metric: metric.to_string(),
            value,
            period: None,
        }
    }
}
