use anyhow::Result;
use regex::Regex;

use crate::config::{FallbackRule, FallbackTrigger, RiskConfig};
use crate::models::{CategoryScore, UNCLASSIFIED};

use super::risk::keyword_pattern;

/// Reduces a dense category score map to one primary category.
///
/// Max score wins; ties break on the configured precedence order, then on
/// configuration order. When nothing scores above zero, an ordered list of
/// fallback rules is evaluated top to bottom, stopping at the first that fires.
pub struct PrimarySelector {
    precedence: Vec<String>,
    fallback: Vec<CompiledFallback>,
}

struct CompiledFallback {
    category: String,
    score: f64,
    trigger: CompiledTrigger,
}

enum CompiledTrigger {
    Phrases(Option<Regex>),
    EntityMatched,
}

/// Per-text inputs the fallback rules may consult.
pub struct FallbackContext<'a> {
    pub text: &'a str,
    pub entity_matched: bool,
}

impl PrimarySelector {
    pub fn new(config: &RiskConfig) -> Result<Self> {
        let mut fallback = Vec::with_capacity(config.fallback.len());
        for rule in &config.fallback {
            fallback.push(CompiledFallback::new(rule)?);
        }
        Ok(PrimarySelector {
            precedence: config.precedence.clone(),
            fallback,
        })
    }

    /// Primary entity = first element of the matcher's ordered output.
    pub fn select_entity(matched_entities: &[String]) -> Option<&String> {
        matched_entities.first()
    }

    /// Pick `(primary_category, score)` from a dense score map.
    pub fn select(&self, scores: &[CategoryScore], ctx: &FallbackContext<'_>) -> (String, f64) {
        let max_score = scores.iter().map(|s| s.score).fold(0.0_f64, f64::max);

        if max_score > 0.0 {
            let tied: Vec<&str> = scores
                .iter()
                .filter(|s| s.score == max_score)
                .map(|s| s.category.as_str())
                .collect();

            for preferred in &self.precedence {
                if tied.iter().any(|t| t == preferred) {
                    return (preferred.clone(), max_score);
                }
            }
            // Precedence empty or disjoint from the tie set: configuration order.
            if let Some(first) = tied.first() {
                return (first.to_string(), max_score);
            }
        }

        // No keyword evidence: ordered fallback chain, first firing rule wins.
        for rule in &self.fallback {
            // A rule only applies when its target category is configured;
            // the score map is dense, so membership is checked against it.
            if !scores.iter().any(|s| s.category == rule.category) {
                continue;
            }
            if rule.trigger.fires(ctx) {
                return (rule.category.clone(), rule.score);
            }
        }

        (UNCLASSIFIED.to_string(), 0.0)
    }
}

impl CompiledFallback {
    fn new(rule: &FallbackRule) -> Result<Self> {
        let trigger = match &rule.when {
            FallbackTrigger::Phrases(phrases) => CompiledTrigger::Phrases(keyword_pattern(phrases)?),
            FallbackTrigger::EntityMatched => CompiledTrigger::EntityMatched,
        };
        Ok(CompiledFallback {
            category: rule.category.clone(),
            score: rule.score,
            trigger,
        })
    }
}

impl CompiledTrigger {
    fn fires(&self, ctx: &FallbackContext<'_>) -> bool {
        match self {
            CompiledTrigger::Phrases(pattern) => pattern
                .as_ref()
                .map(|p| p.is_match(ctx.text))
                .unwrap_or(false),
            CompiledTrigger::EntityMatched => ctx.entity_matched,
        }
    }
}
