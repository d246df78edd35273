//! Text bar charts for terminal and Markdown output

/// A bar of `width` cells for a score in [0, 1], with the threshold cell marked.
pub fn bar(score: f64, threshold: f64, width: usize) -> String {
    let score = if score.is_finite() { score.clamp(0.0, 1.0) } else { 0.0 };
    let filled = (score * width as f64).round() as usize;
    let marker = ((threshold.clamp(0.0, 1.0) * width as f64).round() as usize).min(width.saturating_sub(1));

    (0..width)
        .map(|i| match (i < filled, i == marker) {
            (true, true) => '┃',
            (false, true) => '┆',
            (true, false) => '█',
            (false, false) => '·',
        })
        .collect()
}

/// Pad or cut a label to a fixed display width.
pub fn fit_label(label: &str, width: usize) -> String {
    let count = label.chars().count();
    if count <= width {
        format!("{}{}", label, " ".repeat(width - count))
    } else {
        let cut: String = label.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

pub fn format_score(score: Option<f64>) -> String {
    score.map_or_else(|| "—".to_string(), |s| format!("{:.2}", s))
}
