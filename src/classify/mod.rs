use anyhow::Result;

pub mod primary;
pub mod risk;

use crate::config::Config;
use crate::matcher::EntityMatcher;
use crate::models::{ClassificationResult, NewsRecord};
use primary::{FallbackContext, PrimarySelector};
use risk::RiskClassifier;

/// The compiled classification pipeline: matcher → classifier → selector.
///
/// Built once per configuration load; immutable afterwards. Each call to
/// [`classify`](ClassificationEngine::classify) is a pure function of the
/// record and returns a fresh result, so re-classification is idempotent.
pub struct ClassificationEngine {
    matcher: EntityMatcher,
    classifier: RiskClassifier,
    selector: PrimarySelector,
}

impl ClassificationEngine {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(ClassificationEngine {
            matcher: EntityMatcher::new(&config.entities)?,
            classifier: RiskClassifier::new(&config.risk)?,
            selector: PrimarySelector::new(&config.risk)?,
        })
    }

    /// Classify one news record. Never fails: a record nothing matches comes
    /// back as `unclassified` with score 0 and no entities.
    pub fn classify(&self, record: &NewsRecord) -> ClassificationResult {
        let text = record.full_text();

        let matched_entities = self.matcher.matches(&text);
        let category_scores = self.classifier.score(&text);

        let ctx = FallbackContext {
            text: &text,
            entity_matched: !matched_entities.is_empty(),
        };
        let (primary_category, primary_score) = self.selector.select(&category_scores, &ctx);
        let primary_entity = PrimarySelector::select_entity(&matched_entities).cloned();

        ClassificationResult {
            matched_entities,
            primary_entity,
            category_scores,
            primary_category,
            primary_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::{
        CategoryRule, EntityConfig, FallbackRule, FallbackTrigger, RiskConfig, SeverityConfig,
    };
    use crate::models::UNCLASSIFIED;

    fn test_config() -> Config {
        let mut aliases = HashMap::new();
        aliases.insert("ASML".to_string(), vec!["ASML Holding".to_string()]);

        Config {
            entities: EntityConfig {
                canonical: vec!["ASML".to_string(), "TSMC".to_string()],
                aliases,
            },
            risk: RiskConfig {
                categories: vec![
                    CategoryRule {
                        name: "geopolitical".to_string(),
                        weight: 3.0,
                        keywords: vec!["export control".to_string(), "tariff".to_string()],
                    },
                    CategoryRule {
                        name: "vendor".to_string(),
                        weight: 2.0,
                        keywords: vec!["shipment".to_string(), "supplier".to_string()],
                    },
                ],
                precedence: vec!["geopolitical".to_string(), "vendor".to_string()],
                severity: SeverityConfig {
                    major: vec!["sanctions".to_string()],
                    minor: vec!["delay".to_string()],
                    major_weight: 2.0,
                    minor_weight: 1.0,
                },
                fallback: vec![
                    FallbackRule {
                        category: "geopolitical".to_string(),
                        score: 0.6,
                        when: FallbackTrigger::Phrases(vec!["embargo".to_string()]),
                    },
                    FallbackRule {
                        category: "vendor".to_string(),
                        score: 0.4,
                        when: FallbackTrigger::EntityMatched,
                    },
                ],
            },
            readiness: Default::default(),
        }
    }

    fn record(title: &str) -> NewsRecord {
        NewsRecord {
            id: "t1".to_string(),
            title: title.to_string(),
            summary: String::new(),
            published_at: None,
            source: None,
            link: None,
        }
    }

    #[test]
    fn test_end_to_end_sanctions_scenario() {
        let engine = ClassificationEngine::new(&test_config()).unwrap();
        let result = engine.classify(&record(
            "ASML faces export control sanctions affecting TSMC shipments",
        ));

        assert_eq!(result.matched_entities, vec!["ASML", "TSMC"]);
        assert_eq!(result.primary_entity.as_deref(), Some("ASML"));
        // geopolitical: 3 (keyword) + 2 (major boost); vendor: 2 + 2.
        assert_eq!(result.score_for("geopolitical"), Some(5.0));
        assert_eq!(result.score_for("vendor"), Some(4.0));
        assert_eq!(result.primary_category, "geopolitical");
        assert_eq!(result.primary_score, 5.0);
    }

    #[test]
    fn test_unmatched_text_degrades_to_unclassified() {
        let engine = ClassificationEngine::new(&test_config()).unwrap();
        let result = engine.classify(&record("quiet week in unrelated markets"));

        assert!(result.matched_entities.is_empty());
        assert!(result.primary_entity.is_none());
        assert_eq!(result.primary_category, UNCLASSIFIED);
        assert_eq!(result.primary_score, 0.0);
    }

    #[test]
    fn test_entity_only_falls_back_to_vendor() {
        let engine = ClassificationEngine::new(&test_config()).unwrap();
        let result = engine.classify(&record("ASML opens a new training center"));

        assert_eq!(result.matched_entities, vec!["ASML"]);
        assert_eq!(result.primary_category, "vendor");
        assert_eq!(result.primary_score, 0.4);
    }

    #[test]
    fn test_reclassification_is_idempotent() {
        let engine = ClassificationEngine::new(&test_config()).unwrap();
        let rec = record("ASML faces export control sanctions affecting TSMC shipments");
        let first = engine.classify(&rec);
        let second = engine.classify(&rec);
        assert_eq!(first.matched_entities, second.matched_entities);
        assert_eq!(first.primary_category, second.primary_category);
        assert_eq!(first.primary_score, second.primary_score);
    }
}
