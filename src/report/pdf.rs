use std::path::Path;

use anyhow::{Context, Result};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Polygon, Rgb,
};

use crate::models::{ClassificationResult, NewsRecord, ReadinessScore, UNCLASSIFIED};

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 18.0;
const COVER_HDR_H: f32 = 64.0; // gradient header height on cover page

// ── Colour palette ────────────────────────────────────────────────────────────
const BG:           (f32, f32, f32) = (1.00, 1.00, 1.00);
const PANEL:        (f32, f32, f32) = (1.00, 1.00, 1.00);
const PANEL_ALT:    (f32, f32, f32) = (0.95, 0.97, 0.98);
const PANEL_BORDER: (f32, f32, f32) = (0.84, 0.88, 0.90);
const ACCENT_BLU:   (f32, f32, f32) = (0.13, 0.42, 0.80);
const ACCENT_TEA:   (f32, f32, f32) = (0.09, 0.62, 0.58);
const TEXT_PRI:     (f32, f32, f32) = (0.08, 0.10, 0.14);
const TEXT_SEC:     (f32, f32, f32) = (0.36, 0.41, 0.50);
const TEXT_MUT:     (f32, f32, f32) = (0.58, 0.63, 0.70);
const WHITE:        (f32, f32, f32) = (1.00, 1.00, 1.00);
const WHITE_DIM:    (f32, f32, f32) = (0.83, 0.92, 0.95);

const HIGH_BG: (f32, f32, f32) = (1.00, 0.91, 0.91);
const HIGH_FG: (f32, f32, f32) = (0.76, 0.10, 0.13);
const MED_BG:  (f32, f32, f32) = (1.00, 0.95, 0.86);
const MED_FG:  (f32, f32, f32) = (0.70, 0.41, 0.02);
const LOW_BG:  (f32, f32, f32) = (0.90, 0.98, 0.92);
const LOW_FG:  (f32, f32, f32) = (0.08, 0.51, 0.23);
const NONE_FG: (f32, f32, f32) = (0.58, 0.63, 0.70);

const R_PANEL: f32 = 2.5;
const R_BADGE: f32 = 1.5;
const T_END: f32 = PAGE_W - MARGIN;

// ── Public entry points ───────────────────────────────────────────────────────

/// Render a classification PDF: cover with category breakdown, then the full
/// item table.
pub fn render_classification(
    records: &[NewsRecord],
    results: &[ClassificationResult],
    output_path: &Path,
) -> Result<()> {
    let doc = PdfDocument::empty("Vendor Risk Report");

    add_classification_cover(&doc, results)?;
    add_item_table_pages(&doc, records, results)?;

    let bytes = doc.save_to_bytes()?;
    std::fs::write(output_path, &bytes)
        .with_context(|| format!("Failed to write PDF to {}", output_path.display()))?;

    println!("PDF report written to: {}", output_path.display());
    Ok(())
}

/// Render a readiness PDF: composite bar chart plus the per-entity table.
pub fn render_readiness(scores: &[ReadinessScore], output_path: &Path) -> Result<()> {
    let doc = PdfDocument::empty("Supplier Readiness Report");

    add_readiness_pages(&doc, scores)?;

    let bytes = doc.save_to_bytes()?;
    std::fs::write(output_path, &bytes)
        .with_context(|| format!("Failed to write PDF to {}", output_path.display()))?;

    println!("PDF report written to: {}", output_path.display());
    Ok(())
}

// ── Classification cover ──────────────────────────────────────────────────────

fn add_classification_cover(
    doc: &PdfDocumentReference,
    results: &[ClassificationResult],
) -> Result<()> {
    let (page_idx, layer_idx) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Cover");
    let layer = doc.get_page(page_idx).get_layer(layer_idx);

    let font_b = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let font_r = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    let total = results.len();
    let matched = results.iter().filter(|r| r.primary_entity.is_some()).count();
    let classified = results
        .iter()
        .filter(|r| r.primary_category != UNCLASSIFIED)
        .count();

    fill_rect(&layer, 0.0, 0.0, PAGE_W, PAGE_H, BG);
    let hdr_bot = PAGE_H - COVER_HDR_H;
    fill_banner(&layer, hdr_bot, COVER_HDR_H, 28);

    set_color(&layer, WHITE_DIM);
    layer.use_text(
        format!("vendor-watchr v{}", env!("CARGO_PKG_VERSION")),
        7.5, Mm(PAGE_W - MARGIN - 40.0), Mm(PAGE_H - 10.5), &font_r,
    );

    set_color(&layer, WHITE);
    layer.use_text("Vendor Risk", 28.0, Mm(MARGIN), Mm(PAGE_H - 26.0), &font_b);
    set_color(&layer, WHITE_DIM);
    layer.use_text("Classification Report", 28.0, Mm(MARGIN), Mm(PAGE_H - 41.0), &font_b);

    set_color(&layer, TEXT_SEC);
    layer.use_text(
        format!("Generated  {}", date_stamp()),
        9.0, Mm(MARGIN), Mm(hdr_bot - 10.0), &font_r,
    );

    // Stat cards
    let rule_y = hdr_bot - 16.0;
    draw_hline(&layer, MARGIN, T_END, rule_y, PANEL_BORDER);
    set_color(&layer, TEXT_MUT);
    layer.use_text("OVERVIEW", 6.5, Mm(MARGIN), Mm(rule_y - 7.0), &font_b);

    let card_y = rule_y - 42.0;
    let card_h = 26.0f32;
    let gap = 4.0f32;
    let card_w = (T_END - MARGIN - gap * 2.0) / 3.0;

    let cards: [(&str, String, (f32, f32, f32)); 3] = [
        ("ITEMS",      total.to_string(),      ACCENT_BLU),
        ("MATCHED",    matched.to_string(),    ACCENT_TEA),
        ("CLASSIFIED", classified.to_string(), MED_FG),
    ];

    for (i, (label, value, accent)) in cards.iter().enumerate() {
        let cx = MARGIN + (card_w + gap) * i as f32;
        draw_stat_card(&layer, cx, card_y, card_w, card_h, label, value, *accent, &font_r, &font_b);
    }

    // Category breakdown with count bars
    let section_y = card_y - 13.0;
    draw_hline(&layer, MARGIN, T_END, section_y, PANEL_BORDER);
    set_color(&layer, TEXT_MUT);
    layer.use_text("PRIMARY CATEGORIES", 6.5, Mm(MARGIN), Mm(section_y - 7.5), &font_b);

    let breakdown = category_breakdown(results);
    let max_count = breakdown.iter().map(|(_, c)| *c).max().unwrap_or(1).max(1);
    let bar_x = MARGIN + 42.0;
    let bar_max_w = T_END - bar_x - 14.0;

    for (i, (category, count)) in breakdown.iter().take(10).enumerate() {
        let row_y = section_y - 17.0 - i as f32 * 8.0;

        set_color(&layer, TEXT_PRI);
        layer.use_text(truncate(category, 22), 8.5, Mm(MARGIN), Mm(row_y), &font_r);

        let w = bar_max_w * (*count as f32 / max_count as f32);
        fill_rounded_rect(&layer, bar_x, row_y - 0.8, w.max(1.5), 4.0, R_BADGE, ACCENT_BLU);

        set_color(&layer, TEXT_SEC);
        layer.use_text(count.to_string(), 8.5, Mm(bar_x + w + 2.5), Mm(row_y), &font_r);
    }

    draw_footer(&layer, &font_r);
    Ok(())
}

/// Primary category counts, unclassified excluded, largest first.
fn category_breakdown(results: &[ClassificationResult]) -> Vec<(String, usize)> {
    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for result in results.iter().filter(|r| r.primary_category != UNCLASSIFIED) {
        *counts.entry(result.primary_category.clone()).or_insert(0) += 1;
    }
    let mut pairs: Vec<(String, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    pairs
}

// ── Item table pages ──────────────────────────────────────────────────────────

fn add_item_table_pages(
    doc: &PdfDocumentReference,
    records: &[NewsRecord],
    results: &[ClassificationResult],
) -> Result<()> {
    let font_b = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let font_r = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    const BASE_ROW_H: f32 = 7.0;
    const EXTRA_LINE_H: f32 = 3.5;
    const HDR_Y: f32 = 268.5;
    const FIRST_Y: f32 = 259.5;
    const BOT_MARGIN: f32 = 25.0;
    const TITLE_WRAP: usize = 52;

    let col_x = [MARGIN, MARGIN + 98.0, MARGIN + 128.0, MARGIN + 158.0];
    let headers = ["TITLE", "ENTITY", "CATEGORY", "SCORE"];

    let row_data: Vec<(Vec<String>, f32)> = records
        .iter()
        .map(|record| {
            let lines = wrap_text(&record.title, TITLE_WRAP);
            let extra = lines.len().saturating_sub(1);
            (lines, BASE_ROW_H + extra as f32 * EXTRA_LINE_H)
        })
        .collect();

    let mut cur_y = FIRST_Y;
    let mut layer: Option<PdfLayerReference> = None;
    let mut page_num: u32 = 0;

    for (row_idx, (record, result)) in records.iter().zip(results).enumerate() {
        let (title_lines, row_h) = &row_data[row_idx];
        let row_h = *row_h;

        if layer.is_none() || cur_y - row_h < BOT_MARGIN {
            page_num += 1;
            let (pi, li) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Items");
            let page = doc.get_page(pi).get_layer(li);

            fill_rect(&page, 0.0, 0.0, PAGE_W, PAGE_H, BG);
            fill_banner(&page, PAGE_H - 2.5, 2.5, 21);

            set_color(&page, TEXT_PRI);
            page.use_text("Classified Items", 14.0, Mm(MARGIN), Mm(282.5), &font_b);
            set_color(&page, TEXT_MUT);
            page.use_text(
                format!("Page {}", page_num),
                8.0, Mm(PAGE_W - MARGIN - 14.0), Mm(283.0), &font_r,
            );
            draw_hline(&page, MARGIN, T_END, 277.5, PANEL_BORDER);

            fill_rounded_rect(&page, MARGIN, HDR_Y - 7.5, PAGE_W - 2.0 * MARGIN, 9.5, R_BADGE, PANEL);
            stroke_rounded_rect(&page, MARGIN, HDR_Y - 7.5, PAGE_W - 2.0 * MARGIN, 9.5, R_BADGE, PANEL_BORDER);
            set_color(&page, TEXT_MUT);
            for (i, h) in headers.iter().enumerate() {
                page.use_text(*h, 7.0, Mm(col_x[i] + 1.5), Mm(HDR_Y - 4.0), &font_b);
            }

            draw_footer(&page, &font_r);

            cur_y = FIRST_Y;
            layer = Some(page);
        }

        let Some(page) = layer.as_ref() else { continue };

        if row_idx % 2 == 0 {
            fill_rect(page, MARGIN, cur_y - row_h + 1.5, PAGE_W - 2.0 * MARGIN, row_h, PANEL_ALT);
        }

        let text_y = cur_y - 4.0;

        set_color(page, TEXT_PRI);
        for (j, line) in title_lines.iter().enumerate() {
            let line_y = text_y - j as f32 * EXTRA_LINE_H;
            page.use_text(line.as_str(), 8.0, Mm(col_x[0] + 1.5), Mm(line_y), &font_r);
        }

        set_color(page, TEXT_SEC);
        page.use_text(
            truncate(result.primary_entity.as_deref().unwrap_or("-"), 16),
            8.0, Mm(col_x[1] + 1.5), Mm(text_y), &font_r,
        );

        let (fg, bg) = severity_colors(result.primary_score);
        let badge_y = cur_y - row_h + 2.2;
        fill_rounded_rect(page, col_x[2] + 1.5, badge_y, 26.0, 4.8, R_BADGE, bg);
        set_color(page, fg);
        page.use_text(
            truncate(&result.primary_category, 14),
            7.0, Mm(col_x[2] + 3.0), Mm(badge_y + 1.1), &font_b,
        );

        set_color(page, TEXT_SEC);
        page.use_text(
            format!("{:.1}", result.primary_score),
            8.0, Mm(col_x[3] + 1.5), Mm(text_y), &font_r,
        );

        draw_hline(page, MARGIN, T_END, cur_y - row_h + 1.5, PANEL_BORDER);
        cur_y -= row_h;
    }

    Ok(())
}

fn severity_colors(score: f64) -> ((f32, f32, f32), (f32, f32, f32)) {
    if score >= 3.0 {
        (HIGH_FG, HIGH_BG)
    } else if score >= 1.5 {
        (MED_FG, MED_BG)
    } else if score > 0.0 {
        (LOW_FG, LOW_BG)
    } else {
        (NONE_FG, PANEL_ALT)
    }
}

// ── Readiness pages ───────────────────────────────────────────────────────────

fn add_readiness_pages(doc: &PdfDocumentReference, scores: &[ReadinessScore]) -> Result<()> {
    let font_b = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let font_r = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    const FIRST_Y: f32 = 252.0;
    const ROW_H: f32 = 8.5;
    const BOT_MARGIN: f32 = 25.0;

    let label_w = 40.0f32;
    let bar_x = MARGIN + label_w;
    let bar_max_w = T_END - bar_x - 16.0;

    let mut cur_y = 0.0f32;
    let mut layer: Option<PdfLayerReference> = None;
    let mut page_num: u32 = 0;

    for (i, score) in scores.iter().enumerate() {
        if layer.is_none() || cur_y - ROW_H < BOT_MARGIN {
            page_num += 1;
            let (pi, li) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Readiness");
            let page = doc.get_page(pi).get_layer(li);

            fill_rect(&page, 0.0, 0.0, PAGE_W, PAGE_H, BG);
            fill_banner(&page, PAGE_H - 2.5, 2.5, 21);

            set_color(&page, TEXT_PRI);
            page.use_text("Supplier Readiness", 20.0, Mm(MARGIN), Mm(278.5), &font_b);
            set_color(&page, TEXT_SEC);
            page.use_text(
                "Composite readiness index (0-100), weighted over available dimensions",
                9.0, Mm(MARGIN), Mm(271.5), &font_r,
            );
            set_color(&page, TEXT_MUT);
            page.use_text(
                format!("Page {}", page_num),
                8.0, Mm(PAGE_W - MARGIN - 14.0), Mm(283.0), &font_r,
            );
            draw_hline(&page, MARGIN, T_END, 267.5, PANEL_BORDER);

            draw_footer(&page, &font_r);

            cur_y = FIRST_Y;
            layer = Some(page);
        }

        let Some(page) = layer.as_ref() else { continue };

        let row_y = cur_y - ROW_H * 0.55;

        if i % 2 == 0 {
            fill_rect(page, MARGIN, cur_y - ROW_H + 1.0, T_END - MARGIN, ROW_H, PANEL_ALT);
        }

        set_color(page, TEXT_PRI);
        page.use_text(truncate(&score.entity, 20), 8.5, Mm(MARGIN + 1.5), Mm(row_y), &font_r);

        // Bar track, then the filled portion
        fill_rounded_rect(page, bar_x, row_y - 0.8, bar_max_w, 4.0, R_BADGE, PANEL_ALT);
        match score.composite {
            Some(composite) => {
                let frac = (composite / 100.0).clamp(0.0, 1.0) as f32;
                let (fg, _) = composite_colors(composite);
                fill_rounded_rect(page, bar_x, row_y - 0.8, (bar_max_w * frac).max(1.5), 4.0, R_BADGE, fg);
                set_color(page, fg);
                page.use_text(
                    format!("{:.1}", composite),
                    8.5, Mm(bar_x + bar_max_w + 2.5), Mm(row_y), &font_b,
                );
            }
            None => {
                set_color(page, TEXT_MUT);
                page.use_text("-", 8.5, Mm(bar_x + bar_max_w + 2.5), Mm(row_y), &font_r);
            }
        }

        cur_y -= ROW_H;
    }

    Ok(())
}

fn composite_colors(composite: f64) -> ((f32, f32, f32), (f32, f32, f32)) {
    if composite >= 70.0 {
        (LOW_FG, LOW_BG)
    } else if composite >= 40.0 {
        (MED_FG, MED_BG)
    } else {
        (HIGH_FG, HIGH_BG)
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_stat_card(
    layer: &PdfLayerReference,
    x: f32, y: f32, w: f32, h: f32,
    label: &str,
    value: &str,
    accent: (f32, f32, f32),
    font_r: &IndirectFontRef,
    font_b: &IndirectFontRef,
) {
    fill_rounded_rect(layer, x, y, w, h, R_BADGE, PANEL);
    stroke_rounded_rect(layer, x, y, w, h, R_BADGE, PANEL_BORDER);
    fill_rect(layer, x, y + h - 2.0, w, 2.0, accent);

    set_color(layer, accent);
    layer.use_text(value, 20.0, Mm(x + 5.0), Mm(y + h * 0.38), font_b);

    set_color(layer, TEXT_MUT);
    layer.use_text(label, 6.5, Mm(x + 5.0), Mm(y + 3.5), font_r);
}

fn draw_footer(layer: &PdfLayerReference, font_r: &IndirectFontRef) {
    draw_hline(layer, MARGIN, T_END, 22.0, PANEL_BORDER);
    set_color(layer, TEXT_MUT);
    layer.use_text(
        format!("Generated by vendor-watchr v{}", env!("CARGO_PKG_VERSION")),
        7.5, Mm(MARGIN), Mm(15.0), font_r,
    );
    layer.use_text(date_stamp(), 7.5, Mm(PAGE_W - MARGIN - 22.0), Mm(15.0), font_r);
}

// ── Drawing helpers ───────────────────────────────────────────────────────────

fn rgb((r, g, b): (f32, f32, f32)) -> Color {
    Color::Rgb(Rgb { r, g, b, icc_profile: None })
}

fn set_color(layer: &PdfLayerReference, color: (f32, f32, f32)) {
    layer.set_fill_color(rgb(color));
}

fn draw_ring(layer: &PdfLayerReference, ring: Vec<(Point, bool)>, mode: PaintMode) {
    layer.add_polygon(Polygon {
        rings: vec![ring],
        mode,
        winding_order: WindingOrder::NonZero,
    });
}

fn rect_ring(x: f32, y: f32, w: f32, h: f32) -> Vec<(Point, bool)> {
    vec![
        (Point::new(Mm(x), Mm(y)), false),
        (Point::new(Mm(x + w), Mm(y)), false),
        (Point::new(Mm(x + w), Mm(y + h)), false),
        (Point::new(Mm(x), Mm(y + h)), false),
    ]
}

/// Rounded-rectangle outline: four quarter arcs approximated with short
/// chords, walked corner by corner.
fn rounded_rect_ring(x: f32, y: f32, w: f32, h: f32, radius: f32) -> Vec<(Point, bool)> {
    let r = radius.min(w / 2.0).min(h / 2.0);
    const ARC_SEGS: usize = 6;
    let arcs = [
        (x + w - r, y + r, -90.0f32),
        (x + w - r, y + h - r, 0.0),
        (x + r, y + h - r, 90.0),
        (x + r, y + r, 180.0),
    ];
    let mut ring = Vec::with_capacity(arcs.len() * (ARC_SEGS + 1));
    for (cx, cy, start) in arcs {
        for i in 0..=ARC_SEGS {
            let angle = (start + 90.0 * i as f32 / ARC_SEGS as f32).to_radians();
            ring.push((
                Point::new(Mm(cx + r * angle.cos()), Mm(cy + r * angle.sin())),
                false,
            ));
        }
    }
    ring
}

fn fill_rect(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32, color: (f32, f32, f32)) {
    set_color(layer, color);
    draw_ring(layer, rect_ring(x, y, w, h), PaintMode::Fill);
}

fn fill_rounded_rect(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32,
                     r: f32, color: (f32, f32, f32)) {
    set_color(layer, color);
    draw_ring(layer, rounded_rect_ring(x, y, w, h, r), PaintMode::Fill);
}

fn stroke_rounded_rect(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32,
                       r: f32, color: (f32, f32, f32)) {
    layer.set_outline_color(rgb(color));
    layer.set_outline_thickness(0.4);
    draw_ring(layer, rounded_rect_ring(x, y, w, h, r), PaintMode::Stroke);
}

fn draw_hline(layer: &PdfLayerReference, x1: f32, x2: f32, y: f32, color: (f32, f32, f32)) {
    layer.set_outline_color(rgb(color));
    layer.set_outline_thickness(0.3);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y)), false),
            (Point::new(Mm(x2), Mm(y)), false),
        ],
        is_closed: false,
    });
}

/// Full-width banner blending the two accent colours, drawn as a run of
/// vertical strips that overlap slightly to avoid rounding gaps.
fn fill_banner(layer: &PdfLayerReference, y: f32, h: f32, steps: usize) {
    let step_w = PAGE_W / steps as f32;
    for i in 0..steps {
        let t = i as f32 / (steps - 1).max(1) as f32;
        let color = (
            ACCENT_BLU.0 + (ACCENT_TEA.0 - ACCENT_BLU.0) * t,
            ACCENT_BLU.1 + (ACCENT_TEA.1 - ACCENT_BLU.1) * t,
            ACCENT_BLU.2 + (ACCENT_TEA.2 - ACCENT_BLU.2) * t,
        );
        fill_rect(layer, i as f32 * step_w, y, step_w + 0.6, h, color);
    }
}

// ── Text helpers ──────────────────────────────────────────────────────────────

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let head: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{head}…")
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for word in text.split_whitespace() {
        match lines.last_mut() {
            Some(line) if line.len() + 1 + word.len() <= max_chars => {
                line.push(' ');
                line.push_str(word);
            }
            _ => lines.push(word.to_string()),
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Current UTC date as `YYYY-MM-DD`.
fn date_stamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let (year, month, day) = civil_from_days((secs / 86400) as i64);
    format!("{:04}-{:02}-{:02}", year, month, day)
}

/// Proleptic Gregorian date for a day count since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_splits_long_titles() {
        let lines = wrap_text("chipmaker halts shipments after export control ruling", 20);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.len() <= 20 || !l.contains(' ')));
    }

    #[test]
    fn test_civil_from_days_handles_leap_years() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(10_957), (2000, 1, 1));
        assert_eq!(civil_from_days(19_782), (2024, 2, 29));
        assert_eq!(civil_from_days(19_783), (2024, 3, 1));
    }

    #[test]
    fn test_category_breakdown_excludes_unclassified() {
        let mk = |category: &str| ClassificationResult {
            matched_entities: Vec::new(),
            primary_entity: None,
            category_scores: Vec::new(),
            primary_category: category.to_string(),
            primary_score: 1.0,
        };
        let results = vec![mk("vendor"), mk("vendor"), mk(UNCLASSIFIED)];
        let breakdown = category_breakdown(&results);
        assert_eq!(breakdown, vec![("vendor".to_string(), 2)]);
    }
}
