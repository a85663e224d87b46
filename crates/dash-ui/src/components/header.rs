use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Decorative sparkle string placed either side of the application title.
pub const SPARKLES: &str = "✦ ✧ ✦ ✧";

/// Dashboard header rendering four lines:
///
/// 1. Application title with sparkle decorations (ALL CAPS).
/// 2. A 60-column `=` separator.
/// 3. Mode, timezone and video count in `[ mode | timezone | N videos ]` format.
/// 4. An empty line.
pub struct Header<'a> {
    /// Dashboard mode label (e.g. "aggregate", "video").
    pub mode: &'a str,
    /// IANA timezone used to read the exports.
    pub timezone: &'a str,
    /// Number of videos loaded.
    pub video_count: usize,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(mode: &'a str, timezone: &'a str, video_count: usize, theme: &'a Theme) -> Self {
        Self {
            mode,
            timezone,
            video_count,
            theme,
        }
    }

    /// Render the header as a `Vec<Line>` containing exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);

        vec![
            Line::from(vec![
                Span::styled(SPARKLES, self.theme.header_sparkle),
                Span::styled(" YOUTUBE CHANNEL DASHBOARD ", self.theme.header),
                Span::styled(SPARKLES, self.theme.header_sparkle),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.mode.to_lowercase(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.timezone.to_string(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(format!("{} videos", self.video_count), self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
