use std::collections::HashMap;

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::models::{ClassificationResult, NewsRecord, ReadinessScore, UNCLASSIFIED};

const TITLE_WIDTH: usize = 60;

/// Render a colored terminal report for classified news items.
pub fn render_classification(
    records: &[NewsRecord],
    results: &[ClassificationResult],
    verbose: bool,
    quiet: bool,
) -> Result<()> {
    let total = results.len();
    let matched = results
        .iter()
        .filter(|r| r.primary_entity.is_some())
        .count();
    let classified = results
        .iter()
        .filter(|r| r.primary_category != UNCLASSIFIED)
        .count();

    if quiet {
        println!(
            "Total: {}  Matched: {}  Classified: {}",
            total,
            matched.to_string().green(),
            classified.to_string().yellow(),
        );
        return Ok(());
    }

    println!("\n {} v{}", "vendor-watchr".bold(), env!("CARGO_PKG_VERSION"));
    println!(" Classified {} news items\n", total);

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Total items        : {}", total));
    println!(
        " │  {:<48} │",
        format!("{}  Entity matched  : {:>4}", "✓".green(), matched)
    );
    println!(
        " │  {:<48} │",
        format!(
            "{}  Risk classified : {:>4}  {}",
            "⚠".yellow(),
            classified,
            summarize_categories(results)
        )
    );
    println!(" └────────────────────────────────────────────────────┘\n");

    if classified > 0 {
        println!(" {} Classified items:\n", "[RISK]".red().bold());
        render_classification_table(records, results, false);
        println!();
    }

    if verbose && classified < total {
        println!(" {} Unclassified items:\n", "[OTHER]".cyan().bold());
        render_classification_table(records, results, true);
        println!();
    }

    Ok(())
}

fn render_classification_table(
    records: &[NewsRecord],
    results: &[ClassificationResult],
    unclassified_only: bool,
) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Entity").add_attribute(Attribute::Bold),
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Score").add_attribute(Attribute::Bold),
        ]);

    for (record, result) in records.iter().zip(results) {
        let is_unclassified = result.primary_category == UNCLASSIFIED;
        if is_unclassified != unclassified_only {
            continue;
        }

        table.add_row(vec![
            Cell::new(truncate(&record.title, TITLE_WIDTH)),
            Cell::new(result.primary_entity.as_deref().unwrap_or("-")),
            Cell::new(&result.primary_category).fg(category_color(result.primary_score)),
            Cell::new(format!("{:.1}", result.primary_score))
                .set_alignment(CellAlignment::Right),
        ]);
    }

    println!("{}", table);
}

/// Render the supplier readiness table, best composite first.
pub fn render_readiness(scores: &[ReadinessScore], verbose: bool, quiet: bool) -> Result<()> {
    let scored = scores.iter().filter(|s| s.composite.is_some()).count();

    if quiet {
        println!("Entities: {}  Scored: {}", scores.len(), scored);
        return Ok(());
    }

    println!("\n {} v{}", "vendor-watchr".bold(), env!("CARGO_PKG_VERSION"));
    println!(
        " Readiness for {} entities ({} scored)\n",
        scores.len(),
        scored
    );

    let dimensions: Vec<&str> = scores
        .first()
        .map(|s| s.subscores.iter().map(|d| d.dimension.as_str()).collect())
        .unwrap_or_default();

    let mut table = Table::new();
    let mut header = vec![
        Cell::new("Entity").add_attribute(Attribute::Bold),
        Cell::new("Composite").add_attribute(Attribute::Bold),
    ];
    if verbose {
        for dim in &dimensions {
            header.push(Cell::new(*dim).add_attribute(Attribute::Bold));
        }
    }
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for score in scores {
        let composite_cell = match score.composite {
            Some(c) => Cell::new(format!("{:.1}", c))
                .fg(composite_color(c))
                .set_alignment(CellAlignment::Right),
            None => Cell::new("-")
                .fg(Color::DarkGrey)
                .set_alignment(CellAlignment::Right),
        };
        let mut row = vec![Cell::new(&score.entity), composite_cell];
        if verbose {
            for sub in &score.subscores {
                row.push(match sub.normalized {
                    Some(v) => Cell::new(format!("{:.2}", v)).set_alignment(CellAlignment::Right),
                    None => Cell::new("-")
                        .fg(Color::DarkGrey)
                        .set_alignment(CellAlignment::Right),
                });
            }
        }
        table.add_row(row);
    }

    println!("{}", table);
    Ok(())
}

fn category_color(score: f64) -> Color {
    if score >= 3.0 {
        Color::Red
    } else if score >= 1.5 {
        Color::Yellow
    } else if score > 0.0 {
        Color::Green
    } else {
        Color::DarkGrey
    }
}

fn composite_color(composite: f64) -> Color {
    if composite >= 70.0 {
        Color::Green
    } else if composite >= 40.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Top three primary categories with counts, e.g. `[geopolitical (4), vendor (2)]`.
fn summarize_categories(results: &[ClassificationResult]) -> String {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for result in results.iter().filter(|r| r.primary_category != UNCLASSIFIED) {
        *counts.entry(result.primary_category.clone()).or_insert(0) += 1;
    }

    let mut pairs: Vec<(String, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let summary: Vec<String> = pairs
        .iter()
        .take(3)
        .map(|(cat, cnt)| format!("{} ({})", cat, cnt))
        .collect();

    if summary.is_empty() {
        String::new()
    } else {
        format!("[{}]", summary.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_titles() {
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn test_truncate_long_titles() {
        let t = truncate("a very long headline about export controls", 10);
        assert_eq!(t.chars().count(), 10);
        assert!(t.ends_with('…'));
    }

    #[test]
    fn test_summarize_categories_skips_unclassified() {
        let mk = |category: &str| ClassificationResult {
            matched_entities: Vec::new(),
            primary_entity: None,
            category_scores: Vec::new(),
            primary_category: category.to_string(),
            primary_score: 1.0,
        };
        let results = vec![
            mk("geopolitical"),
            mk("geopolitical"),
            mk("vendor"),
            mk(UNCLASSIFIED),
        ];
        assert_eq!(
            summarize_categories(&results),
            "[geopolitical (2), vendor (1)]"
        );
    }
}
