//! Aggregate dashboard mode.
//!
//! Headline tiles across the top, the baseline deviation table on the left
//! and the engagement leaderboard with its top-N input on the right.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use dash_core::formatting::format_percent;
use dash_data::presentation::{AggregateView, DeviationRow, RankedVideo, DEVIATION_COLUMNS};

use crate::components::indicators::{MetricTile, TopNInput};
use crate::themes::Theme;

/// Tiles per row of the headline strip.
const TILES_PER_ROW: usize = 5;

const TITLE_COLUMN_WIDTH: u16 = 32;

/// Render the aggregate mode into `area`.
pub fn render_aggregate_view(
    frame: &mut Frame,
    area: Rect,
    view: &AggregateView,
    input: TopNInput<'_>,
    theme: &Theme,
) {
    let tile_rows = view.headline.len().div_ceil(TILES_PER_ROW) as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(tile_rows * 4 + 2), Constraint::Min(5)])
        .split(area);

    render_headline(frame, chunks[0], view, theme);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(chunks[1]);

    render_deviation_table(frame, body[0], &view.rows, theme);
    render_leaderboard(frame, body[1], &view.top_videos, input, theme);
}

/// Headline tiles, six-month median against the twelve-month median.
fn render_headline(frame: &mut Frame, area: Rect, view: &AggregateView, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.table_border)
        .title(" Last 6 months vs 12-month median ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            view.headline
                .chunks(TILES_PER_ROW)
                .map(|_| Constraint::Length(4))
                .collect::<Vec<_>>(),
        )
        .split(inner);

    for (row_area, tiles) in row_areas.iter().zip(view.headline.chunks(TILES_PER_ROW)) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(
                (0..TILES_PER_ROW)
                    .map(|_| Constraint::Ratio(1, TILES_PER_ROW as u32))
                    .collect::<Vec<_>>(),
            )
            .split(*row_area);
        for (col, metric) in cols.iter().zip(tiles) {
            let lines = MetricTile::new(metric, theme).to_lines();
            frame.render_widget(Paragraph::new(Text::from(lines)), *col);
        }
    }
}

/// Every video's metrics as a percentage difference from the baseline,
/// red below and green above.
pub fn render_deviation_table(frame: &mut Frame, area: Rect, rows: &[DeviationRow], theme: &Theme) {
    let header_cells = ["Video title", "Published"]
        .into_iter()
        .map(String::from)
        .chain(DEVIATION_COLUMNS.iter().map(|m| m.label().to_string()))
        .map(|h| Cell::from(h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let data_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            let mut cells = vec![
                Cell::from(truncate_to_width(&row.title, TITLE_COLUMN_WIDTH as usize)),
                Cell::from(row.publish_date.format("%Y-%m-%d").to_string()),
            ];
            cells.extend(
                row.cells
                    .iter()
                    .map(|c| Cell::from(c.text.clone()).style(theme.tone_style(c.tone))),
            );
            Row::new(cells).style(style)
        })
        .collect();

    let mut widths = vec![Constraint::Length(TITLE_COLUMN_WIDTH), Constraint::Length(10)];
    widths.extend(DEVIATION_COLUMNS.iter().map(|_| Constraint::Min(8)));

    let table = Table::new(data_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Difference from 12-month median "),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Top videos by engagement ratio with the top-N input underneath.
pub fn render_leaderboard(
    frame: &mut Frame,
    area: Rect,
    top: &[RankedVideo],
    input: TopNInput<'_>,
    theme: &Theme,
) {
    let mut lines: Vec<Line> = top
        .iter()
        .map(|r| {
            Line::from(vec![
                Span::styled(format!("{:>2}. ", r.rank), theme.dim),
                Span::styled(format_percent(r.engagement_ratio, 2), theme.value),
                Span::raw("  "),
                Span::styled(
                    truncate_to_width(&r.title, area.width.saturating_sub(14) as usize),
                    theme.text,
                ),
            ])
        })
        .collect();
    if top.is_empty() {
        lines.push(Line::from(Span::styled("No videos to rank", theme.dim)));
    }
    lines.push(Line::from(""));
    lines.extend(input.to_lines());

    frame.render_widget(
        Paragraph::new(Text::from(lines)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Top videos by engagement "),
        ),
        area,
    );
}

/// Render a placeholder when there is nothing to show.
pub fn render_no_data(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No channel data", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme.dim)),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Channel Dash "),
        ),
        area,
    );
}

/// Cut `s` to at most `max` display columns, marking the cut with `…`.
pub(crate) fn truncate_to_width(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────
