use anyhow::Result;
use regex::{Regex, RegexBuilder};

use crate::config::{RiskConfig, SeverityConfig};
use crate::models::CategoryScore;

/// Scores the fixed category set against a text using keyword weights and
/// severity boosts. Patterns are compiled once per configuration load.
pub struct RiskClassifier {
    categories: Vec<CompiledCategory>,
    severity: CompiledSeverity,
}

struct CompiledCategory {
    name: String,
    weight: f64,
    /// `None` when the category has no usable keywords; it then scores only
    /// through severity boosts.
    pattern: Option<Regex>,
}

struct CompiledSeverity {
    major: Option<Regex>,
    minor: Option<Regex>,
    major_weight: f64,
    minor_weight: f64,
}

impl RiskClassifier {
    pub fn new(config: &RiskConfig) -> Result<Self> {
        let mut categories = Vec::with_capacity(config.categories.len());
        for rule in &config.categories {
            categories.push(CompiledCategory {
                name: rule.name.clone(),
                weight: rule.weight,
                pattern: keyword_pattern(&rule.keywords)?,
            });
        }
        Ok(RiskClassifier {
            categories,
            severity: CompiledSeverity::new(&config.severity)?,
        })
    }

    /// Dense score map over the configured category set, configuration order.
    ///
    /// A category whose keywords match gains its full weight exactly once —
    /// presence is boolean, not a hit count. A found severity keyword then
    /// boosts every category uniformly (major tier wins over minor).
    pub fn score(&self, text: &str) -> Vec<CategoryScore> {
        let mut scores: Vec<CategoryScore> = self
            .categories
            .iter()
            .map(|cat| {
                let hit = cat
                    .pattern
                    .as_ref()
                    .map(|p| p.is_match(text))
                    .unwrap_or(false);
                CategoryScore {
                    category: cat.name.clone(),
                    score: if hit { cat.weight } else { 0.0 },
                }
            })
            .collect();

        if let Some(boost) = self.severity.boost_for(text) {
            for entry in &mut scores {
                entry.score += boost;
            }
        }

        scores
    }
}

impl CompiledSeverity {
    fn new(config: &SeverityConfig) -> Result<Self> {
        Ok(CompiledSeverity {
            major: keyword_pattern(&config.major)?,
            minor: keyword_pattern(&config.minor)?,
            major_weight: config.major_weight,
            minor_weight: config.minor_weight,
        })
    }

    /// Major and minor tiers are mutually exclusive per text; major wins.
    fn boost_for(&self, text: &str) -> Option<f64> {
        if matches(&self.major, text) {
            Some(self.major_weight)
        } else if matches(&self.minor, text) {
            Some(self.minor_weight)
        } else {
            None
        }
    }
}

fn matches(pattern: &Option<Regex>, text: &str) -> bool {
    pattern.as_ref().map(|p| p.is_match(text)).unwrap_or(false)
}

/// Compile a keyword list into one case-insensitive alternation.
/// Substring semantics: "geopolit" matches "geopolitical".
pub(crate) fn keyword_pattern(keywords: &[String]) -> Result<Option<Regex>> {
    let escaped: Vec<String> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(regex::escape)
        .collect();
    if escaped.is_empty() {
        return Ok(None);
    }
    let regex = RegexBuilder::new(&escaped.join("|"))
        .case_insensitive(true)
        .build()?;
    Ok(Some(regex))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CategoryRule;

    fn classifier(categories: &[(&str, f64, &[&str])], severity: SeverityConfig) -> RiskClassifier {
        let rules = categories
            .iter()
            .map(|(name, weight, keywords)| CategoryRule {
                name: name.to_string(),
                weight: *weight,
                keywords: keywords.iter().map(|s| s.to_string()).collect(),
            })
            .collect();
        RiskClassifier::new(&RiskConfig {
            categories: rules,
            precedence: Vec::new(),
            severity,
            fallback: Vec::new(),
        })
        .unwrap()
    }

    fn no_severity() -> SeverityConfig {
        SeverityConfig {
            major: Vec::new(),
            minor: Vec::new(),
            major_weight: 0.0,
            minor_weight: 0.0,
        }
    }

    fn severity(major: &[&str], minor: &[&str]) -> SeverityConfig {
        SeverityConfig {
            major: major.iter().map(|s| s.to_string()).collect(),
            minor: minor.iter().map(|s| s.to_string()).collect(),
            major_weight: 2.0,
            minor_weight: 1.0,
        }
    }

    #[test]
    fn test_weight_added_once_regardless_of_hits() {
        let c = classifier(
            &[("vendor", 2.0, &["shipment", "supplier"])],
            no_severity(),
        );
        let scores = c.score("supplier delays shipment after supplier audit");
        assert_eq!(scores[0].score, 2.0);
    }

    #[test]
    fn test_output_is_dense_over_category_set() {
        let c = classifier(
            &[
                ("geopolitical", 3.0, &["tariff"]),
                ("vendor", 2.0, &["shipment"]),
                ("financial", 1.5, &["downgrade"]),
            ],
            no_severity(),
        );
        let scores = c.score("new tariff announced");
        let names: Vec<&str> = scores.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(names, vec!["geopolitical", "vendor", "financial"]);
        assert_eq!(scores[0].score, 3.0);
        assert_eq!(scores[1].score, 0.0);
        assert_eq!(scores[2].score, 0.0);
    }

    #[test]
    fn test_major_boost_applies_to_every_category() {
        let c = classifier(
            &[
                ("geopolitical", 3.0, &["export control"]),
                ("vendor", 2.0, &["shipment"]),
            ],
            severity(&["sanctions"], &["delay"]),
        );
        // Neither category keyword matched, but the boost still lifts both.
        let scores = c.score("sanctions announced");
        assert_eq!(scores[0].score, 2.0);
        assert_eq!(scores[1].score, 2.0);
    }

    #[test]
    fn test_major_wins_over_minor() {
        let c = classifier(
            &[("vendor", 2.0, &["shipment"])],
            severity(&["halt"], &["delay"]),
        );
        let scores = c.score("shipment delay after production halt");
        // 2.0 keyword + 2.0 major; minor must not stack.
        assert_eq!(scores[0].score, 4.0);
    }

    #[test]
    fn test_minor_boost_when_no_major() {
        let c = classifier(
            &[("vendor", 2.0, &["shipment"])],
            severity(&["halt"], &["delay"]),
        );
        let scores = c.score("shipment delay reported");
        assert_eq!(scores[0].score, 3.0);
    }

    #[test]
    fn test_case_insensitive_substring_keywords() {
        let c = classifier(&[("geopolitical", 3.0, &["geopolit"])], no_severity());
        assert_eq!(c.score("Geopolitical tensions rise")[0].score, 3.0);
    }

    #[test]
    fn test_category_without_keywords_scores_zero() {
        let c = classifier(&[("vendor", 2.0, &[])], no_severity());
        assert_eq!(c.score("any text at all")[0].score, 0.0);
    }
}
