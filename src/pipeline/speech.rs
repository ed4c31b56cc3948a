//! Slide detection for the speech path.
//!
//! Text pulled from a slide deck is a list of short fragments; read aloud
//! verbatim it sounds robotic. Dense prose reads fine as-is. Many short
//! lines is a cheap, explainable proxy for "slides", so:
//!
//! ```text
//! slide-like  ⇔  line_count >= min_lines  &&  avg_line_len < max_avg_len
//! ```
//!
//! with `avg_line_len = total chars / line_count` over the `\n`-split text.
//! Defaults are 8 lines and 80 characters.

/// Line statistics of a text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStats {
    pub line_count: usize,
    pub avg_line_len: f64,
}

impl LineStats {
    pub fn of(text: &str) -> Self {
        let line_count = text.split('\n').count();
        let total = text.chars().count();
        Self {
            line_count,
            avg_line_len: total as f64 / line_count as f64,
        }
    }
}

/// Thresholds for [`is_slide_like`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideThresholds {
    pub min_lines: usize,
    pub max_avg_line_len: usize,
}

impl Default for SlideThresholds {
    fn default() -> Self {
        Self {
            min_lines: 8,
            max_avg_line_len: 80,
        }
    }
}

/// `true` when `stats` look like slide bullets rather than prose.
pub fn is_slide_like(stats: LineStats, thresholds: SlideThresholds) -> bool {
    stats.line_count >= thresholds.min_lines
        && stats.avg_line_len < thresholds.max_avg_line_len as f64
}
