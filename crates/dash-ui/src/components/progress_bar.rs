use crate::themes::Theme;
use dash_core::formatting::format_number;
use dash_data::presentation::AudienceSlice;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

/// Configuration controlling visual appearance of a bar.
pub struct ProgressBarConfig {
    /// Total width in terminal columns of the bar portion (excluding labels).
    pub width: u16,
    /// Character used to fill the completed portion of the bar.
    pub filled_char: char,
    /// Character used to fill the empty portion of the bar.
    pub empty_char: char,
    /// Column width reserved for the leading label.
    pub label_width: usize,
}

impl Default for ProgressBarConfig {
    fn default() -> Self {
        Self {
            width: 40,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
            label_width: 22,
        }
    }
}

// ── AudienceBar ──────────────────────────────────────────────────────────────

/// Horizontal bar for one subscription-status × country-bucket slice.
///
/// The fill is scaled against the largest slice so the biggest audience
/// always spans the full width.
pub struct AudienceBar<'a> {
    pub slice: &'a AudienceSlice,
    /// Views of the largest slice on screen.
    pub max_views: f64,
    /// Views across all slices, for the share label.
    pub total_views: f64,
    pub theme: &'a Theme,
    pub config: ProgressBarConfig,
}

impl<'a> AudienceBar<'a> {
    pub fn new(slice: &'a AudienceSlice, max_views: f64, total_views: f64, theme: &'a Theme) -> Self {
        Self {
            slice,
            max_views,
            total_views,
            theme,
            config: ProgressBarConfig::default(),
        }
    }

    /// `"Subscribed · USA"` style label.
    pub fn label(&self) -> String {
        let status = if self.slice.is_subscribed {
            "Subscribed"
        } else {
            "Not subscribed"
        };
        format!("{} · {}", status, self.slice.bucket)
    }

    /// Number of filled columns.
    pub fn filled(&self) -> u16 {
        if self.max_views > 0.0 && self.slice.views.is_finite() {
            let ratio = (self.slice.views / self.max_views).clamp(0.0, 1.0);
            (ratio * self.config.width as f64).round() as u16
        } else {
            0
        }
    }

    /// Render the bar as a [`Line`]:
    /// `"Subscribed · USA      ████░░░░ 1,234 (12.3%)"`.
    pub fn to_line(&self) -> Line<'a> {
        let label = self.label();
        let pad = self.config.label_width.saturating_sub(label.width());
        let filled = self.filled();
        let empty = self.config.width.saturating_sub(filled);

        let filled_str: String =
            std::iter::repeat_n(self.config.filled_char, filled as usize).collect();
        let empty_str: String =
            std::iter::repeat_n(self.config.empty_char, empty as usize).collect();

        let share = if self.total_views > 0.0 {
            self.slice.views / self.total_views * 100.0
        } else {
            0.0
        };

        Line::from(vec![
            Span::styled(format!("{}{}", label, " ".repeat(pad)), self.theme.label),
            Span::styled(filled_str, self.theme.audience_style(self.slice.is_subscribed)),
            Span::styled(empty_str, self.theme.progress_empty),
            Span::styled(
                format!(" {} ({:.1}%)", format_number(self.slice.views, 0), share),
                self.theme.progress_label,
            ),
        ])
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
