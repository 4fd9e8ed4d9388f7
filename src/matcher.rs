use anyhow::Result;
use regex::{Regex, RegexBuilder};

use crate::config::EntityConfig;

/// Matches free-text vendor mentions against the canonical entity table.
///
/// One pattern per canonical entity, compiled once per configuration load and
/// reused across every text. Each pattern is an alternation over the canonical
/// name and all of its aliases; a text matches the entity when any alternative
/// matches anywhere in it.
pub struct EntityMatcher {
    patterns: Vec<EntityPattern>,
}

struct EntityPattern {
    canonical: String,
    regex: Regex,
}

impl EntityMatcher {
    pub fn new(config: &EntityConfig) -> Result<Self> {
        let mut patterns = Vec::with_capacity(config.canonical.len());
        for canonical in &config.canonical {
            let names = config.names_for(canonical);
            if let Some(regex) = compile_entity(&names)? {
                patterns.push(EntityPattern {
                    canonical: canonical.clone(),
                    regex,
                });
            }
        }
        Ok(EntityMatcher { patterns })
    }

    /// Every canonical entity mentioned in `text`, in configuration order.
    ///
    /// Overlapping aliases across entities (e.g. "TEL" vs "TEL Tokyo Electron")
    /// legitimately yield multiple matches; disambiguation is the caller's job.
    pub fn matches(&self, text: &str) -> Vec<String> {
        self.patterns
            .iter()
            .filter(|p| p.regex.is_match(text))
            .map(|p| p.canonical.clone())
            .collect()
    }

}

/// Compile the alternation pattern for one entity from its name variants.
///
/// Each variant is tokenized on whitespace/hyphen/dot and rejoined allowing any
/// of those separators between tokens. The alternation is wrapped in non-word
/// boundaries so "TEL" matches "TEL ships" but not "INTEL" or "RETELL".
fn compile_entity(names: &[String]) -> Result<Option<Regex>> {
    let alternatives: Vec<String> = names.iter().filter_map(|n| name_fragment(n)).collect();
    if alternatives.is_empty() {
        return Ok(None);
    }

    let pattern = format!(r"(?:^|\W)(?:{})(?:\W|$)", alternatives.join("|"));
    let regex = RegexBuilder::new(&pattern).case_insensitive(true).build()?;
    Ok(Some(regex))
}

/// Token-joined, escaped regex fragment for a single name or alias.
fn name_fragment(name: &str) -> Option<String> {
    let tokens: Vec<String> = name
        .split(|c: char| c.is_whitespace() || c == '-' || c == '.')
        .filter(|t| !t.is_empty())
        .map(|t| regex::escape(t))
        .collect();
    if tokens.is_empty() {
        return None;
    }
    Some(tokens.join(r"\s*[\s\-.]\s*"))
}
