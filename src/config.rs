use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};

/// Root configuration, deserialized from `.vendor-watchr/config.toml`.
///
/// Every section is optional and degrades independently: a malformed
/// `[risk]` table falls back to the built-in risk model without touching a
/// valid `[entities]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Canonical vendor universe and alias map.
    #[serde(default)]
    pub entities: EntityConfig,
    /// Risk categories, keyword weights, severity boosts, fallback chain.
    #[serde(default)]
    pub risk: RiskConfig,
    /// Readiness dimensions: bounds, directions, weights.
    #[serde(default)]
    pub readiness: ReadinessConfig,
}

/// Canonical entity names plus aliases mapping many-to-one onto them.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityConfig {
    pub canonical: Vec<String>,
    #[serde(default)]
    pub aliases: HashMap<String, Vec<String>>,
}

impl EntityConfig {
    /// Canonical name plus all configured aliases for it.
    pub fn names_for(&self, canonical: &str) -> Vec<String> {
        let mut names = vec![canonical.to_string()];
        if let Some(extra) = self.aliases.get(canonical) {
            names.extend(extra.iter().cloned());
        }
        names
    }
}

/// The risk model: a closed, externally supplied category set.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    pub categories: Vec<CategoryRule>,
    /// Deterministic tie-break order among equally scored categories.
    #[serde(default)]
    pub precedence: Vec<String>,
    #[serde(default)]
    pub severity: SeverityConfig,
    /// Ordered predicate→category rules applied when no category scores above zero.
    #[serde(default = "default_fallback_rules")]
    pub fallback: Vec<FallbackRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub weight: f64,
}

/// Severity boost tiers. At most one tier applies per text; major wins.
#[derive(Debug, Clone, Deserialize)]
pub struct SeverityConfig {
    #[serde(default)]
    pub major: Vec<String>,
    #[serde(default)]
    pub minor: Vec<String>,
    #[serde(default)]
    pub major_weight: f64,
    #[serde(default)]
    pub minor_weight: f64,
}

/// One entry of the ordered fallback chain. Rules are data so new ones can be
/// inserted without restructuring control flow.
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackRule {
    pub category: String,
    /// Minimum score assigned when the rule fires.
    pub score: f64,
    pub when: FallbackTrigger,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackTrigger {
    /// Fires when any of the phrases occurs in the text (case-insensitive).
    Phrases(Vec<String>),
    /// Fires when the matcher found at least one entity.
    EntityMatched,
}

/// Composite index configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadinessConfig {
    pub dimensions: Vec<DimensionSpec>,
}

/// One readiness dimension. A dimension may combine several metric components;
/// its subscore is the mean of whichever components are present.
#[derive(Debug, Clone, Deserialize)]
pub struct DimensionSpec {
    pub name: String,
    pub weight: f64,
    pub components: Vec<ComponentSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComponentSpec {
    /// Metric key in the derived per-entity KPI table.
    pub metric: String,
    pub lower: f64,
    pub upper: f64,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

// ---------------------------------------------------------------------------
// Built-in defaults
// ---------------------------------------------------------------------------

impl Default for EntityConfig {
    /// Semiconductor vendor universe: equipment, EDA, foundry/IDM, memory,
    /// fabless, analog. Order matters — it is the primary-entity priority.
    fn default() -> Self {
        let canonical = [
            // Litho / deposition / etch / metrology / test
            "ASML",
            "Applied Materials",
            "Lam Research",
            "KLA",
            "TEL Tokyo Electron",
            "ASM International",
            "SCREEN Semiconductor",
            "Advantest",
            "Teradyne",
            "Entegris",
            "MKS Instruments",
            // EDA
            "Synopsys",
            "Cadence",
            "Siemens EDA",
            // Foundries / IDMs
            "TSMC",
            "Samsung Foundry",
            "Intel",
            "UMC",
            "GlobalFoundries",
            "SMIC",
            // Memory
            "Micron",
            "SK hynix",
            "Kioxia",
            // Fabless / compute
            "NVIDIA",
            "AMD",
            "Qualcomm",
            "Broadcom",
            // Analog / mixed-signal / power
            "Texas Instruments",
            "STMicroelectronics",
            "Infineon",
            "NXP",
            "Renesas",
            "onsemi",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let mut aliases: HashMap<String, Vec<String>> = HashMap::new();
        let pairs: [(&str, &[&str]); 12] = [
            ("ASML", &["ASML Holding", "ASML Holdings"]),
            ("Lam Research", &["Lam"]),
            ("TEL Tokyo Electron", &["TEL", "Tokyo Electron"]),
            ("ASM International", &["ASM"]),
            ("SCREEN Semiconductor", &["SCREEN"]),
            ("Siemens EDA", &["Mentor Graphics"]),
            (
                "TSMC",
                &["Taiwan Semiconductor", "Taiwan Semiconductor Manufacturing"],
            ),
            ("Samsung Foundry", &["Samsung Electronics Foundry"]),
            ("GlobalFoundries", &["Global Foundries", "GF"]),
            ("NVIDIA", &["NVDA"]),
            ("SK hynix", &["SK Hynix"]),
            ("onsemi", &["ON Semiconductor"]),
        ];
        for (canon, names) in pairs {
            aliases.insert(
                canon.to_string(),
                names.iter().map(|s| s.to_string()).collect(),
            );
        }

        EntityConfig { canonical, aliases }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        fn cat(name: &str, weight: f64, keywords: &[&str]) -> CategoryRule {
            CategoryRule {
                name: name.to_string(),
                weight,
                keywords: keywords.iter().map(|s| s.to_string()).collect(),
            }
        }

        let categories = vec![
            cat(
                "geopolitical",
                3.0,
                &[
                    "sanction",
                    "tariff",
                    "export control",
                    "trade ban",
                    "embargo",
                    "geopolit",
                ],
            ),
            cat(
                "regulatory",
                2.5,
                &[
                    "antitrust",
                    "lawsuit",
                    "litigation",
                    "regulator",
                    "probe",
                    "investigation",
                ],
            ),
            cat(
                "cybersecurity",
                2.5,
                &["ransomware", "cyberattack", "data breach", "hack"],
            ),
            cat(
                "capacity",
                2.0,
                &[
                    "shutdown",
                    "halt production",
                    "line down",
                    "fab outage",
                    "power outage",
                    "blackout",
                ],
            ),
            cat(
                "material",
                2.0,
                &[
                    "silicon wafer",
                    "photoresist",
                    "neon",
                    "substrate",
                    "gas shortage",
                    "raw material",
                ],
            ),
            cat(
                "logistics",
                2.0,
                &["port delay", "logistics", "freight", "customs"],
            ),
            cat(
                "vendor",
                2.0,
                &[
                    "supplier",
                    "vendor",
                    "shipment",
                    "contract",
                    "recall",
                    "factory",
                    "plant",
                ],
            ),
            cat(
                "financial",
                1.5,
                &[
                    "downgrade",
                    "guidance cut",
                    "profit warning",
                    "misses estimates",
                    "liquidity",
                ],
            ),
            cat("workforce", 1.5, &["strike", "walkout", "layoff"]),
            cat(
                "environmental",
                1.5,
                &["earthquake", "flood", "typhoon", "fire", "drought"],
            ),
        ];

        let precedence = [
            "geopolitical",
            "regulatory",
            "cybersecurity",
            "capacity",
            "material",
            "logistics",
            "financial",
            "workforce",
            "environmental",
            "vendor",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        RiskConfig {
            categories,
            precedence,
            severity: SeverityConfig::default(),
            fallback: default_fallback_rules(),
        }
    }
}

impl Default for SeverityConfig {
    fn default() -> Self {
        SeverityConfig {
            major: ["halt", "shutdown", "ban", "sanction", "fire", "flood", "bankrupt"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            minor: ["delay", "probe", "investigate", "warning"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            major_weight: 2.0,
            minor_weight: 1.0,
        }
    }
}

fn default_fallback_rules() -> Vec<FallbackRule> {
    vec![
        FallbackRule {
            category: "geopolitical".to_string(),
            score: 0.6,
            when: FallbackTrigger::Phrases(
                ["tariff", "export control", "sanction", "embargo"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
        },
        FallbackRule {
            category: "vendor".to_string(),
            score: 0.4,
            when: FallbackTrigger::EntityMatched,
        },
    ]
}

impl Default for ReadinessConfig {
    /// Foundry-readiness dimensions with the bounds the dashboard shipped with.
    fn default() -> Self {
        fn comp(metric: &str, lower: f64, upper: f64, direction: Direction) -> ComponentSpec {
            ComponentSpec {
                metric: metric.to_string(),
                lower,
                upper,
                direction,
            }
        }

        let dimensions = vec![
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
                name: "supply_tightness".to_string(),
                weight: 0.20,
                components: vec![
                    comp("book_to_bill", 0.8, 1.4, Direction::LowerIsBetter),
                    comp("backlog_months", 1.0, 9.0, Direction::LowerIsBetter),
                ],
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
                components: vec![
                    comp("spares_fill_rate", 80.0, 99.0, Direction::HigherIsBetter),
                    comp("fte_on_site", 0.0, 5.0, Direction::HigherIsBetter),
                ],
            },
        ];

        ReadinessConfig { dimensions }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config` (hard error if unusable)
/// 2. `<cwd>/.vendor-watchr/config.toml`
/// 3. `~/.config/vendor-watchr/config.toml`
/// 4. Built-in [`Config::default`]
///
/// Discovered files degrade section by section: an invalid section is replaced
/// with its built-in default and a warning, the rest of the file still applies.
pub fn load_config(base_dir: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let value: toml::Value = toml::from_str(&content)
            .with_context(|| format!("Invalid TOML in {}", path.display()))?;
        return Ok(from_sections(&value));
    }

    let project_config = base_dir.join(".vendor-watchr").join("config.toml");
    if project_config.exists() {
        return Ok(load_lenient(&project_config));
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("vendor-watchr")
            .join("config.toml");
        if home_config.exists() {
            return Ok(load_lenient(&home_config));
        }
    }

    Ok(Config::default())
}

/// Read a discovered config file; any failure falls back to defaults with a
/// warning instead of aborting the run.
fn load_lenient(path: &Path) -> Config {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(err) => {
            warn(&format!("cannot read {}: {err}; using defaults", path.display()));
            return Config::default();
        }
    };
    match toml::from_str::<toml::Value>(&content) {
        Ok(value) => from_sections(&value),
        Err(err) => {
            warn(&format!(
                "cannot parse {}: {err}; using defaults",
                path.display()
            ));
            Config::default()
        }
    }
}

/// Assemble a [`Config`] from a parsed TOML document, one section at a time.
fn from_sections(value: &toml::Value) -> Config {
    Config {
        entities: section_or_default(value, "entities"),
        risk: section_or_default(value, "risk"),
        readiness: section_or_default(value, "readiness"),
    }
}

fn section_or_default<T>(value: &toml::Value, key: &str) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    match value.get(key) {
        None => T::default(),
        Some(section) => match section.clone().try_into() {
            Ok(parsed) => parsed,
            Err(err) => {
                warn(&format!("invalid [{key}] section: {err}; using built-in defaults"));
                T::default()
            }
        },
    }
}

fn warn(msg: &str) {
    eprintln!("  {} config: {msg}", "!".yellow());
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config_is_coherent() {
        let cfg = Config::default();
        assert!(cfg.entities.canonical.contains(&"ASML".to_string()));
        assert!(cfg.risk.categories.iter().any(|c| c.name == "geopolitical"));
        assert!(cfg.risk.categories.iter().any(|c| c.name == "vendor"));
        // Every precedence entry names a configured category.
        for name in &cfg.risk.precedence {
            assert!(
                cfg.risk.categories.iter().any(|c| &c.name == name),
                "precedence entry {name} is not a configured category"
            );
        }
        let weight_sum: f64 = cfg.readiness.dimensions.iter().map(|d| d.weight).sum();
        assert!((weight_sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_full_config() {
        let toml_src = r#"
[entities]
canonical = ["ASML", "TSMC"]

[entities.aliases]
ASML = ["ASML Holding"]

[risk]
precedence = ["geopolitical", "vendor"]

[[risk.categories]]
name = "geopolitical"
weight = 3.0
keywords = ["export control", "sanction"]

[[risk.categories]]
name = "vendor"
weight = 2.0
keywords = ["shipment"]

[risk.severity]
major = ["sanctions"]
minor = ["delay"]
major_weight = 2.0
minor_weight = 1.0

[[risk.fallback]]
category = "vendor"
score = 0.4
when = "entity_matched"

[readiness]
[[readiness.dimensions]]
name = "otif"
weight = 1.0

[[readiness.dimensions.components]]
metric = "otif_pct"
lower = 70.0
upper = 98.0
direction = "higher_is_better"
"#;
        let value: toml::Value = toml::from_str(toml_src).unwrap();
        let cfg = from_sections(&value);
        assert_eq!(cfg.entities.canonical, vec!["ASML", "TSMC"]);
        assert_eq!(cfg.risk.categories.len(), 2);
        assert_eq!(cfg.risk.fallback.len(), 1);
        assert!(matches!(
            cfg.risk.fallback[0].when,
            FallbackTrigger::EntityMatched
        ));
        assert_eq!(cfg.readiness.dimensions[0].components[0].metric, "otif_pct");
        assert_eq!(
            cfg.readiness.dimensions[0].components[0].direction,
            Direction::HigherIsBetter
        );
    }

    #[test]
    fn test_malformed_section_degrades_alone() {
        // [risk] is structurally wrong; [entities] is fine and must survive.
        let toml_src = r#"
[entities]
canonical = ["ASML"]

[risk]
categories = "not a table array"
"#;
        let value: toml::Value = toml::from_str(toml_src).unwrap();
        let cfg = from_sections(&value);
        assert_eq!(cfg.entities.canonical, vec!["ASML"]);
        // Risk fell back to the built-in model.
        assert!(cfg.risk.categories.iter().any(|c| c.name == "geopolitical"));
        assert!(!cfg.risk.precedence.is_empty());
    }

    #[test]
    fn test_load_from_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_dir = dir.path().join(".vendor-watchr");
        std::fs::create_dir_all(&cfg_dir).unwrap();
        let mut f = std::fs::File::create(cfg_dir.join("config.toml")).unwrap();
        writeln!(f, "[entities]\ncanonical = [\"OnlyVendor\"]").unwrap();

        let cfg = load_config(dir.path(), None).unwrap();
        assert_eq!(cfg.entities.canonical, vec!["OnlyVendor"]);
        // Missing sections come from defaults.
        assert!(!cfg.risk.categories.is_empty());
        assert!(!cfg.readiness.dimensions.is_empty());
    }

    #[test]
    fn test_unreadable_override_is_an_error() {
        let missing = Path::new("/nonexistent/vendor-watchr.toml");
        assert!(load_config(Path::new("."), Some(missing)).is_err());
    }
}
