//! Task screen: stdout and stderr of a launched task.
//!
//! Stdout hides the executor preamble until toggled. A pane whose stream
//! came back empty is not drawn at all.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use eremetic_util::format_fetched_at;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use super::ansi::ansi_line;
use super::state::{KillStatus, LogPane, TaskViewState};
use crate::app::{App, Effect, Route};
use crate::ui::components::component::Component;
use crate::ui::theme::Theme;
use crate::ui::theme::theme_helpers::block;

#[derive(Debug, Default)]
pub struct TaskComponent {
    stdout_scroll: u16,
    stderr_scroll: u16,
}

impl TaskComponent {
    fn header_line(app: &App, state: &TaskViewState) -> Line<'static> {
        let theme = app.theme.as_ref();
        let mut spans = vec![
            Span::styled("Task ", theme.text_secondary_style()),
            Span::styled(state.task_id.to_string(), theme.accent_emphasis_style()),
        ];
        if let Some(at) = state.fetched_at {
            spans.push(Span::styled(format!("  fetched {}", format_fetched_at(at)), theme.text_muted_style()));
        }
        match &state.kill {
            KillStatus::Idle => {}
            KillStatus::Pending => spans.push(Span::styled(format!("  {} killing...", app.throbber()), theme.status_info())),
            KillStatus::Requested => spans.push(Span::styled("  kill requested", theme.status_success())),
            KillStatus::Failed(message) => spans.push(Span::styled(format!("  ✖ kill failed: {message}"), theme.status_error())),
        }
        Line::from(spans)
    }

    fn stdout_lines(app: &App, state: &TaskViewState) -> Vec<Line<'static>> {
        let theme = app.theme.as_ref();
        match &state.stdout {
            LogPane::Loading => vec![loading_line(app)],
            LogPane::Empty => Vec::new(),
            LogPane::Failed(message) => vec![Line::from(Span::styled(format!("✖ {message}"), theme.status_error()))],
            LogPane::Ready(output) => {
                let mut lines = Vec::new();
                if !state.show_preamble
                    && let Some(hint) = output.hidden_hint()
                {
                    lines.push(Line::from(Span::styled(
                        format!("… {hint} (p to show)"),
                        theme.text_muted_style().add_modifier(Modifier::ITALIC),
                    )));
                }
                let preamble_len = if state.show_preamble { output.preamble.len() } else { 0 };
                lines.extend(output.visible_lines(state.show_preamble).enumerate().map(|(index, line)| {
                    let style = if index < preamble_len { theme.text_muted_style() } else { theme.text_primary_style() };
                    ansi_line(line, style)
                }));
                lines
            }
        }
    }

    fn stderr_lines(app: &App, state: &TaskViewState) -> Vec<Line<'static>> {
        let theme = app.theme.as_ref();
        match &state.stderr {
            LogPane::Loading => vec![loading_line(app)],
            LogPane::Empty => Vec::new(),
            LogPane::Failed(message) => vec![Line::from(Span::styled(format!("✖ {message}"), theme.status_error()))],
            LogPane::Ready(lines) => lines
                .iter()
                .map(|line| ansi_line(line, theme.text_muted_style()))
                .collect(),
        }
    }
}

fn loading_line(app: &App) -> Line<'static> {
    Line::from(Span::styled(format!("{} Loading...", app.throbber()), app.theme.status_info()))
}

fn scroll_by(scroll: &mut u16, delta: i32) {
    *scroll = (i32::from(*scroll) + delta).clamp(0, i32::from(u16::MAX)) as u16;
}

impl Component for TaskComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let Some(state) = app.task.as_mut() else {
            return Vec::new();
        };
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return Vec::new();
        }
        match key.code {
            KeyCode::Char('r') => {
                self.stdout_scroll = 0;
                self.stderr_scroll = 0;
                return state.refresh();
            }
            KeyCode::Char('k') => return state.request_kill(),
            KeyCode::Char('p') => state.toggle_preamble(),
            KeyCode::Char('n') | KeyCode::Esc => return vec![Effect::SwitchTo(Route::Launch)],
            _ => {}
        }

        // Shift scrolls the stderr pane.
        let scroll = if key.modifiers.contains(KeyModifiers::SHIFT) {
            &mut self.stderr_scroll
        } else {
            &mut self.stdout_scroll
        };
        match key.code {
            KeyCode::Up => scroll_by(scroll, -1),
            KeyCode::Down => scroll_by(scroll, 1),
            KeyCode::PageUp => scroll_by(scroll, -10),
            KeyCode::PageDown => scroll_by(scroll, 10),
            KeyCode::Home => *scroll = 0,
            _ => {}
        }
        Vec::new()
    }

    fn hints(&self, _app: &App) -> Vec<(&'static str, &'static str)> {
        vec![
            ("r", "refresh"),
            ("k", "kill"),
            ("p", "preamble"),
            ("↑↓", "scroll"),
            ("n/Esc", "new task"),
            ("^C", "quit"),
        ]
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let Some(state) = app.task.as_ref() else {
            return;
        };
        let theme = app.theme.as_ref();
        let [header_area, body_area] = Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).areas(rect);
        frame.render_widget(Paragraph::new(Self::header_line(app, state)), header_area);

        let show_stdout = state.stdout.is_visible();
        let show_stderr = state.stderr.is_visible();
        if !show_stdout && !show_stderr {
            let empty = Paragraph::new(Span::styled("The task has not written any output yet.", theme.text_muted_style()))
                .block(block(theme, Some(" Output "), false));
            frame.render_widget(empty, body_area);
            return;
        }

        let constraints: Vec<Constraint> = [show_stdout, show_stderr]
            .into_iter()
            .filter(|visible| *visible)
            .map(|_| Constraint::Fill(1))
            .collect();
        let areas = Layout::vertical(constraints).split(body_area);
        let mut areas = areas.iter().copied();

        if show_stdout && let Some(area) = areas.next() {
            let pane = Paragraph::new(Self::stdout_lines(app, state))
                .block(block(theme, Some(" stdout "), true))
                .wrap(Wrap { trim: false })
                .scroll((self.stdout_scroll, 0));
            frame.render_widget(pane, area);
        }
        if show_stderr && let Some(area) = areas.next() {
            let pane = Paragraph::new(Self::stderr_lines(app, state))
                .block(block(theme, Some(" stderr "), false))
                .wrap(Wrap { trim: false })
                .scroll((self.stderr_scroll, 0));
            frame.render_widget(pane, area);
        }
    }
}
