//! Individual video mode: picker, audience breakdown and the cumulative view
//! trajectory drawn over the channel's percentile bands.

use chrono_tz::Tz;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    symbols::Marker,
    text::{Line, Span, Text},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, ListState, Paragraph},
    Frame,
};

use dash_core::formatting::format_number;
use dash_data::presentation::VideoDetail;

use crate::aggregate_view::truncate_to_width;
use crate::components::progress_bar::AudienceBar;
use crate::themes::Theme;

/// Render the video mode into `area`. `detail` is `None` when the selected
/// title could not be resolved.
pub fn render_video_view(
    frame: &mut Frame,
    area: Rect,
    titles: &[&str],
    selected: usize,
    detail: Option<&VideoDetail>,
    tz: Tz,
    theme: &Theme,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(area);

    render_picker(frame, columns[0], titles, selected, theme);

    let Some(detail) = detail else {
        frame.render_widget(
            Paragraph::new(Span::styled("No video selected", theme.dim))
                .block(Block::default().borders(Borders::ALL).border_style(theme.table_border)),
            columns[1],
        );
        return;
    };

    let bar_rows = detail.audience.len().max(1) as u16;
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(bar_rows + 2),
            Constraint::Min(8),
        ])
        .split(columns[1]);

    render_summary(frame, right[0], detail, tz, theme);
    render_audience(frame, right[1], detail, theme);
    render_trajectory_chart(frame, right[2], detail, theme);
}

/// Scrollable title list with the current selection highlighted.
pub fn render_picker(frame: &mut Frame, area: Rect, titles: &[&str], selected: usize, theme: &Theme) {
    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = titles
        .iter()
        .map(|t| ListItem::new(truncate_to_width(t, width)).style(theme.text))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Videos (↑/↓) "),
        )
        .highlight_style(theme.table_selected)
        .highlight_symbol("▶ ");

    let mut state = ListState::default().with_selected((!titles.is_empty()).then_some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_summary(frame: &mut Frame, area: Rect, detail: &VideoDetail, tz: Tz, theme: &Theme) {
    let total_views = detail.trajectory.last().map(|p| p.cumulative_views);
    let lines = vec![
        Line::from(Span::styled(detail.title.clone(), theme.header)),
        Line::from(vec![
            Span::styled("Published: ", theme.label),
            Span::styled(
                format!("{} {}", detail.publish_time.format("%Y-%m-%d %H:%M"), tz.name()),
                theme.value,
            ),
            Span::styled("  ID: ", theme.label),
            Span::styled(detail.video_id.to_string(), theme.value),
        ]),
        Line::from(vec![
            Span::styled("Views in first 30 days: ", theme.label),
            Span::styled(
                total_views.map_or_else(|| "n/a".to_string(), |v| format_number(v, 0)),
                theme.value,
            ),
        ]),
    ];
    frame.render_widget(Paragraph::new(Text::from(lines)), area);
}

/// One bar per subscription status and country bucket present in the data.
pub fn render_audience(frame: &mut Frame, area: Rect, detail: &VideoDetail, theme: &Theme) {
    let views = detail.audience.iter().map(|s| s.views).filter(|v| v.is_finite());
    let max_views = views.clone().fold(0.0_f64, f64::max);
    let total_views: f64 = views.sum();

    let mut lines: Vec<Line> = detail
        .audience
        .iter()
        .map(|slice| AudienceBar::new(slice, max_views, total_views, theme).to_line())
        .collect();
    if lines.is_empty() {
        lines.push(Line::from(Span::styled("No audience breakdown for this video", theme.dim)));
    }

    frame.render_widget(
        Paragraph::new(Text::from(lines)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Views by subscription and country "),
        ),
        area,
    );
}

/// Cumulative views by day since publish, over the p20/median/p80 bands.
pub fn render_trajectory_chart(frame: &mut Frame, area: Rect, detail: &VideoDetail, theme: &Theme) {
    let p80: Vec<(f64, f64)> = detail
        .bands
        .iter()
        .map(|b| (b.days_published as f64, b.p80_views))
        .collect();
    let median: Vec<(f64, f64)> = detail
        .bands
        .iter()
        .map(|b| (b.days_published as f64, b.median_views))
        .collect();
    let p20: Vec<(f64, f64)> = detail
        .bands
        .iter()
        .map(|b| (b.days_published as f64, b.p20_views))
        .collect();
    let video: Vec<(f64, f64)> = detail
        .trajectory
        .iter()
        .map(|p| (p.days_published as f64, p.cumulative_views))
        .collect();

    let (x_max, y_max) = chart_bounds([&p80, &median, &p20, &video]);

    let datasets = vec![
        line_dataset("80th percentile", &p80, theme.band_p80),
        line_dataset("Median", &median, theme.band_median),
        line_dataset("20th percentile", &p20, theme.band_p20),
        line_dataset("This video", &video, theme.trajectory),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Cumulative views vs channel percentiles "),
        )
        .x_axis(
            Axis::default()
                .title(Span::styled("Days since published", theme.dim))
                .style(theme.dim)
                .bounds([0.0, x_max])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(format!("{}", (x_max / 2.0).round())),
                    Span::raw(format!("{x_max}")),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("Views", theme.dim))
                .style(theme.dim)
                .bounds([0.0, y_max])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(format_number(y_max / 2.0, 0)),
                    Span::raw(format_number(y_max, 0)),
                ]),
        );

    frame.render_widget(chart, area);
}

fn line_dataset<'a>(name: &'a str, data: &'a [(f64, f64)], style: ratatui::style::Style) -> Dataset<'a> {
    Dataset::default()
        .name(name)
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(style)
        .data(data)
}

/// Axis upper bounds across every series, never collapsing to zero.
fn chart_bounds(series: [&[(f64, f64)]; 4]) -> (f64, f64) {
    let points = series.iter().flat_map(|s| s.iter());
    let x_max = points
        .clone()
        .map(|&(x, _)| x)
        .filter(|x| x.is_finite())
        .fold(0.0_f64, f64::max);
    let y_max = points
        .map(|&(_, y)| y)
        .filter(|y| y.is_finite())
        .fold(0.0_f64, f64::max);
    (
        if x_max > 0.0 { x_max } else { 1.0 },
        if y_max > 0.0 { y_max * 1.05 } else { 1.0 },
    )
}

// ── Tests ──────────────────────────────────────────────────────────────────────
