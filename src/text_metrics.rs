//! Card height prediction. Not a text measurement: a deterministic model of
//! how many rows a line wraps into, tuned so CJK-heavy cards stop clipping.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::CardMetrics;

static LINK_ALIAS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[.*?\|(.*?)\]\]").unwrap());

/// Per-character width approximation. Code points above the single-byte
/// range (CJK, fullwidth forms) render roughly 1.8x as wide as Latin glyphs.
pub fn char_visual_weight(ch: char, metrics: &CardMetrics) -> f32 {
    if (ch as u32) > 0xFF {
        metrics.wide_char_weight
    } else {
        1.0
    }
}

pub fn visual_length(line: &str, metrics: &CardMetrics) -> f32 {
    line.chars().map(|ch| char_visual_weight(ch, metrics)).sum()
}

/// Visual-length units a single rendered row holds at the given card width.
pub fn line_capacity(card_width: f32, metrics: &CardMetrics) -> f32 {
    if card_width > metrics.wide_width_threshold {
        metrics.wide_capacity
    } else {
        metrics.narrow_capacity
    }
}

/// Predicts the rendered pixel height of a card's text block: fixed padding,
/// per-line contributions (headings and dividers have their own heights),
/// and wrapped rows for everything else. Aliased wiki-links are reduced to
/// their display text first so link targets don't inflate the estimate.
pub fn estimate_height(text: &str, card_width: f32, metrics: &CardMetrics) -> f32 {
    if text.is_empty() {
        return metrics.empty_height;
    }

    let rendered = LINK_ALIAS_RE.replace_all(text, "$1");
    let capacity = line_capacity(card_width, metrics);

    let mut total = metrics.base_padding;
    for line in rendered.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            total += metrics.blank_height;
        } else if trimmed.starts_with("###") {
            total += metrics.heading_height;
        } else if trimmed.starts_with("---") {
            total += metrics.divider_height;
        } else {
            let rows = (visual_length(trimmed, metrics) / capacity).ceil().max(1.0);
            total += rows * metrics.line_height;
        }
    }

    total + metrics.bottom_buffer
}
