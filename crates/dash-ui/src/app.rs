//! Main application state and TUI event loop for the channel dashboard.
//!
//! [`App`] borrows the finished [`ChannelAnalysis`] and owns everything the
//! user can change at runtime: the mode, the selected video and the top-N
//! input. Key handling is kept separate from the terminal loop so it can be
//! driven directly in tests.

use std::io;
use std::time::Duration;

use chrono_tz::Tz;
use crossterm::{
    cursor::Show,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame, Terminal,
};

use dash_data::analysis::ChannelAnalysis;
use dash_data::presentation::{
    aggregate_view, parse_top_n, video_detail, video_titles, AggregateView, VideoDetail,
};

use crate::aggregate_view::{render_aggregate_view, render_no_data};
use crate::components::header::Header;
use crate::components::indicators::TopNInput;
use crate::themes::Theme;
use crate::video_view::render_video_view;

/// Pause between input drains. Short enough that typing feels immediate.
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);

// ── TerminalGuard ─────────────────────────────────────────────────────────────

/// Raw mode and the alternate screen, restored on drop so the terminal is
/// usable again even when the event loop future is cancelled.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
    }
}

/// Next pending terminal event without blocking.
fn poll_pending_event() -> io::Result<Option<Event>> {
    if event::poll(Duration::ZERO)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

// ── ViewMode ──────────────────────────────────────────────────────────────────

/// Which dashboard mode the TUI is currently rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Baseline deviations, headline tiles and the engagement leaderboard.
    Aggregate,
    /// One video's audience and trajectory.
    Video,
}

impl ViewMode {
    /// Parse the `--view` value. Anything other than `"video"` is aggregate.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("video") {
            ViewMode::Video
        } else {
            ViewMode::Aggregate
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Aggregate => "aggregate",
            ViewMode::Video => "video",
        }
    }

    fn toggled(self) -> Self {
        match self {
            ViewMode::Aggregate => ViewMode::Video,
            ViewMode::Video => ViewMode::Aggregate,
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App<'a> {
    analysis: &'a ChannelAnalysis,
    theme: Theme,
    timezone: String,
    tz: Tz,
    pub view_mode: ViewMode,
    titles: Vec<&'a str>,
    selected: usize,
    aggregate: AggregateView,
    detail: Option<VideoDetail>,
    top_n_buffer: String,
    input_error: Option<String>,
    should_quit: bool,
}

impl<'a> App<'a> {
    pub fn new(
        analysis: &'a ChannelAnalysis,
        theme_name: &str,
        view_mode: ViewMode,
        timezone: &str,
        top_n: usize,
    ) -> Self {
        let tz = timezone.parse::<Tz>().unwrap_or(Tz::UTC);
        let titles = video_titles(analysis);
        let mut app = Self {
            analysis,
            theme: Theme::from_name(theme_name),
            timezone: timezone.to_string(),
            tz,
            view_mode,
            titles,
            selected: 0,
            aggregate: aggregate_view(analysis, top_n),
            detail: None,
            top_n_buffer: top_n.to_string(),
            input_error: None,
            should_quit: false,
        };
        app.refresh_detail();
        app
    }

    /// Preselect the first video titled `title`. Unknown titles leave the
    /// selection unchanged.
    pub fn with_selected_video(mut self, title: &str) -> Self {
        if let Some(index) = self.titles.iter().position(|t| *t == title) {
            self.selected = index;
            self.refresh_detail();
        }
        self
    }

    pub fn selected_title(&self) -> Option<&str> {
        self.titles.get(self.selected).copied()
    }

    pub fn top_n(&self) -> usize {
        self.aggregate.top_n
    }

    pub fn input_error(&self) -> Option<&str> {
        self.input_error.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Apply one key press to the application state.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Tab => self.view_mode = self.view_mode.toggled(),
            KeyCode::Up if self.view_mode == ViewMode::Video => self.select_previous(),
            KeyCode::Down if self.view_mode == ViewMode::Video => self.select_next(),
            KeyCode::Char(c) if self.view_mode == ViewMode::Aggregate && c.is_ascii_digit() => {
                self.top_n_buffer.push(c);
            }
            KeyCode::Backspace if self.view_mode == ViewMode::Aggregate => {
                self.top_n_buffer.pop();
            }
            KeyCode::Enter if self.view_mode == ViewMode::Aggregate => self.apply_top_n(),
            _ => {}
        }
    }

    /// Parse the input buffer; a rejected value keeps the current list.
    pub fn apply_top_n(&mut self) {
        match parse_top_n(&self.top_n_buffer) {
            Ok(n) => {
                self.aggregate = aggregate_view(self.analysis, n);
                self.input_error = None;
            }
            Err(e) => self.input_error = Some(e.to_string()),
        }
    }

    fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.refresh_detail();
        }
    }

    fn select_next(&mut self) {
        if self.selected + 1 < self.titles.len() {
            self.selected += 1;
            self.refresh_detail();
        }
    }

    fn refresh_detail(&mut self) {
        self.detail = self
            .selected_title()
            .and_then(|title| video_detail(self.analysis, title).ok());
    }

    /// Run the interactive loop until the user quits.
    ///
    /// The loop awaits between input drains, so callers can race it against
    /// other futures such as an OS signal. Dropping the future restores the
    /// terminal.
    pub async fn run(mut self) -> io::Result<()> {
        let _guard = TerminalGuard::enter()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        self.event_loop(&mut terminal, poll_pending_event).await
    }

    /// Draw, apply every pending event, then sleep until the next drain.
    /// Returns once a quit key has been handled.
    pub async fn event_loop<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        mut next_event: impl FnMut() -> io::Result<Option<Event>>,
    ) -> io::Result<()> {
        loop {
            terminal
                .draw(|frame| self.render(frame))
                .map_err(|e| io::Error::other(e.to_string()))?;

            while let Some(event) = next_event()? {
                if let Event::Key(key) = event {
                    self.handle_key(key);
                }
            }
            if self.should_quit {
                return Ok(());
            }

            tokio::time::sleep(INPUT_POLL_INTERVAL).await;
        }
    }

    /// Draw the header, the active mode and the key help line.
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let header = Header::new(
            self.view_mode.label(),
            &self.timezone,
            self.titles.len(),
            &self.theme,
        );
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), chunks[0]);

        if self.titles.is_empty() {
            render_no_data(frame, chunks[1], "The export contains no videos", &self.theme);
        } else {
            match self.view_mode {
                ViewMode::Aggregate => {
                    let input = TopNInput::new(
                        &self.top_n_buffer,
                        self.aggregate.top_n,
                        self.input_error.as_deref(),
                        &self.theme,
                    )
                    .editing(true);
                    render_aggregate_view(frame, chunks[1], &self.aggregate, input, &self.theme);
                }
                ViewMode::Video => render_video_view(
                    frame,
                    chunks[1],
                    &self.titles,
                    self.selected,
                    self.detail.as_ref(),
                    self.tz,
                    &self.theme,
                ),
            }
        }

        let help = match self.view_mode {
            ViewMode::Aggregate => "Tab: video view  0-9/Backspace: edit top N  Enter: apply  q: quit",
            ViewMode::Video => "Tab: aggregate view  ↑/↓: select video  q: quit",
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(help, self.theme.dim))),
            chunks[2],
        );
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
