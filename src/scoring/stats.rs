use crate::config::Direction;

/// Division that can never panic or produce infinities.
///
/// `0 / 0`, `x / 0`, and any non-finite operand all yield `None` — missing,
/// not an error and not zero.
pub fn safe_div(num: f64, den: f64) -> Option<f64> {
    if !num.is_finite() || !den.is_finite() || den == 0.0 {
        return None;
    }
    let q = num / den;
    q.is_finite().then_some(q)
}

/// Direction-aware min-max normalization onto [0, 1], clamped.
///
/// Lower-is-better dimensions invert the scale. Degenerate bounds
/// (`upper == lower`) yield `None`.
pub fn normalize(value: f64, lower: f64, upper: f64, direction: Direction) -> Option<f64> {
    let span = upper - lower;
    let raw = match direction {
        Direction::HigherIsBetter => safe_div(value - lower, span)?,
        Direction::LowerIsBetter => safe_div(upper - value, span)?,
    };
    Some(raw.clamp(0.0, 1.0))
}

/// Mean over the present values only; `None` when nothing is present.
pub fn mean_present(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().filter_map(|v| *v).collect();
    safe_div(present.iter().sum(), present.len() as f64)
}

/// Median of a sample; `None` on an empty sample.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Mean of a sample; `None` on an empty sample.
pub fn mean(values: &[f64]) -> Option<f64> {
    safe_div(values.iter().sum(), values.len() as f64)
}
