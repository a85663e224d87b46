use crate::themes::Theme;
use dash_core::formatting::{format_number, format_percent};
use dash_core::models::HeadlineMetric;
use dash_data::presentation::CellTone;
use ratatui::text::{Line, Span};

// ── MetricTile ───────────────────────────────────────────────────────────────

/// Headline tile: six-month median with its change against the twelve-month
/// median.
///
/// ```text
/// Views
/// 12,345.0
/// ▲ 4.25%
/// ```
pub struct MetricTile<'a> {
    pub metric: &'a HeadlineMetric,
    pub theme: &'a Theme,
}

impl<'a> MetricTile<'a> {
    pub fn new(metric: &'a HeadlineMetric, theme: &'a Theme) -> Self {
        Self { metric, theme }
    }

    /// Arrow for the direction of the delta; a dot when undefined or flat.
    pub fn arrow(&self) -> &'static str {
        match CellTone::of(self.metric.delta) {
            CellTone::Positive => "▲",
            CellTone::Negative => "▼",
            CellTone::Neutral => "•",
        }
    }

    /// Render the tile as three lines: label, value, delta.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let tone_style = self.theme.tone_style(CellTone::of(self.metric.delta));
        vec![
            Line::from(Span::styled(self.metric.metric.label(), self.theme.label)),
            Line::from(Span::styled(
                format_number(self.metric.median_6mo, 1),
                self.theme.value,
            )),
            Line::from(vec![
                Span::styled(self.arrow(), tone_style),
                Span::raw(" "),
                Span::styled(format_percent(self.metric.delta, 2), tone_style),
            ]),
        ]
    }
}

// ── TopNInput ────────────────────────────────────────────────────────────────

/// Editable top-N field with the currently applied value and the last
/// rejected input, if any.
pub struct TopNInput<'a> {
    /// Text typed so far.
    pub buffer: &'a str,
    /// Count currently shown in the list.
    pub applied: usize,
    /// Message from the last rejected input.
    pub error: Option<&'a str>,
    /// Whether the field has keyboard focus.
    pub editing: bool,
    pub theme: &'a Theme,
}

impl<'a> TopNInput<'a> {
    pub fn new(buffer: &'a str, applied: usize, error: Option<&'a str>, theme: &'a Theme) -> Self {
        Self {
            buffer,
            applied,
            error,
            editing: false,
            theme,
        }
    }

    pub fn editing(mut self, editing: bool) -> Self {
        self.editing = editing;
        self
    }

    /// Format: `"Top N: [7_] showing 5"`, followed by the error when present.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let cursor = if self.editing { "_" } else { "" };
        let mut lines = vec![Line::from(vec![
            Span::styled("Top N: ", self.theme.label),
            Span::styled(format!("[{}{}]", self.buffer, cursor), self.theme.value),
            Span::styled(format!(" showing {}", self.applied), self.theme.dim),
        ])];
        if let Some(err) = self.error {
            lines.push(Line::from(Span::styled(err.to_string(), self.theme.error)));
        }
        lines
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
