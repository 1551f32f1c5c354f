//! Display and formatting utilities
//!
//! ANSI colors, bar charts and formatted terminal output.

use gitwell_core::ColorMode;

use crate::report::HealthBand;
use crate::trend::TrendDirection;

/// ANSI color codes (only used when terminal supports it)
pub struct Colors {
    pub red: &'static str,
    pub green: &'static str,
    pub yellow: &'static str,
    pub blue: &'static str,
    pub cyan: &'static str,
    pub bold: &'static str,
    pub dim: &'static str,
    pub reset: &'static str,
}

impl Colors {
    pub fn new(color_enabled: bool) -> Self {
        if color_enabled {
            Self {
                red: "\x1b[0;31m",
                green: "\x1b[0;32m",
                yellow: "\x1b[0;33m",
                blue: "\x1b[0;34m",
                cyan: "\x1b[0;36m",
                bold: "\x1b[1m",
                dim: "\x1b[2m",
                reset: "\x1b[0m",
            }
        } else {
            Self {
                red: "",
                green: "",
                yellow: "",
                blue: "",
                cyan: "",
                bold: "",
                dim: "",
                reset: "",
            }
        }
    }

    /// Check if stdout is a TTY (terminal)
    pub fn is_tty() -> bool {
        atty_check()
    }

    /// Get colors for the configured mode, detecting the terminal in auto
    pub fn for_mode(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Always => Self::new(true),
            ColorMode::Never => Self::new(false),
            ColorMode::Auto => Self::new(Self::is_tty()),
        }
    }
}

fn atty_check() -> bool {
    #[cfg(unix)]
    unsafe {
        libc::isatty(libc::STDOUT_FILENO) != 0
    }

    #[cfg(not(unix))]
    true
}

/// Draw a simple bar chart
pub fn draw_bar(value: f64, max: f64, width: usize) -> String {
    let max = if max <= 0.0 { 1.0 } else { max };
    let ratio = (value / max).clamp(0.0, 1.0);
    let filled = ((ratio * width as f64).round() as usize).min(width);
    let empty = width - filled;

    format!("{}{}", "\u{2588}".repeat(filled), "\u{2591}".repeat(empty))
}

/// Color for a 0-100 health score
pub fn score_color<'a>(score: f64, colors: &'a Colors) -> &'a str {
    match HealthBand::from_score(score) {
        HealthBand::Excellent => colors.green,
        HealthBand::Good => colors.blue,
        HealthBand::Moderate => colors.yellow,
        HealthBand::NeedsImprovement => colors.red,
    }
}

/// Format a health score as "72.5/100" with color
pub fn format_score(score: f64, colors: &Colors) -> String {
    format!("{}{:.1}/100{}", score_color(score, colors), score, colors.reset)
}

/// Format a trend direction and change rate with an arrow
pub fn format_trend(direction: TrendDirection, change_rate: f64, colors: &Colors) -> String {
    match direction {
        TrendDirection::Increasing => {
            format!("{}^ {:.1}%{}", colors.green, change_rate, colors.reset)
        }
        TrendDirection::Decreasing => {
            format!("{}v {:.1}%{}", colors.red, change_rate.abs(), colors.reset)
        }
        TrendDirection::Stable => {
            format!("{}= {:.1}%{}", colors.yellow, change_rate, colors.reset)
        }
    }
}

/// Format a section header
pub fn section_header(title: &str, colors: &Colors) -> String {
    format!("{}{}{}", colors.cyan, title, colors.reset)
}

/// Format a bold title
pub fn title(text: &str, colors: &Colors) -> String {
    format!("{}{}{}", colors.bold, text, colors.reset)
}

/// Format a bulleted list in one color
pub fn format_list(items: &[String], color: &str, colors: &Colors) -> String {
    let mut result = String::new();
    for item in items {
        result.push_str(&format!("  {}-{} {}\n", color, colors.reset, item));
    }
    result
}
