//! Launch form screen.
//!
//! Draws the scalar inputs, one section per collection with its entries and
//! an add button, and the submit/reset buttons. All values come from the
//! form session through the engine's view models.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use eremetic_engine::{EntryRow, FieldView};
use eremetic_types::{CollectionType, FieldKind};
use eremetic_util::mask_value;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use super::state::{FocusTarget, LaunchState, Notice};
use crate::app::{App, Effect};
use crate::ui::components::component::Component;
use crate::ui::theme::Theme;
use crate::ui::theme::theme_helpers::{block, button_style, input_style};

const LABEL_WIDTH: usize = 20;
const ENTRY_INDENT: usize = 4;

#[derive(Debug, Default)]
pub struct LaunchComponent {
    scroll: u16,
}

/// Lines of the form plus where the focus landed.
struct FormLines {
    lines: Vec<Line<'static>>,
    focused_line: usize,
    /// Column of the text cursor within the focused line.
    cursor_column: Option<u16>,
}

impl LaunchComponent {
    fn activate(state: &mut LaunchState) -> Vec<Effect> {
        match state.focus() {
            FocusTarget::Field(_) | FocusTarget::Submit => state.submit(),
            FocusTarget::Add(collection) => {
                state.add_entry(collection);
                Vec::new()
            }
            FocusTarget::Remove(collection, id) => {
                state.remove_entry(collection, id);
                Vec::new()
            }
            FocusTarget::Reset => {
                state.reset();
                Vec::new()
            }
        }
    }

    fn on_button(state: &LaunchState) -> bool {
        !matches!(state.focus(), FocusTarget::Field(_))
    }

    fn field_lines(
        out: &mut FormLines,
        field: &FieldView,
        indent: usize,
        state: &LaunchState,
        theme: &dyn Theme,
    ) {
        let focused = state.focus() == FocusTarget::Field(field.key);
        let marker = if field.required { "*" } else { " " };
        let label = format!("{:indent$}{:<width$}{marker} ", "", field.label, width = LABEL_WIDTH);
        let hidden = field.masked && !state.reveal_masked;

        let raw = if focused { state.editor().input() } else { field.value.as_str() };
        let value_span = if raw.is_empty() && !focused {
            Span::styled(field.placeholder.to_string(), theme.text_muted_style().add_modifier(Modifier::ITALIC))
        } else {
            let shown = match field.kind {
                FieldKind::Choice(_) => format!("‹ {raw} ›"),
                _ if hidden => mask_value(raw),
                _ => raw.to_string(),
            };
            Span::styled(shown, input_style(theme, field.error.is_none(), focused))
        };

        if focused {
            out.focused_line = out.lines.len();
            let editable = !hidden && !matches!(field.kind, FieldKind::Choice(_));
            out.cursor_column = editable.then(|| {
                let editor = state.editor();
                (label.width() + editor.input()[..editor.cursor()].width()) as u16
            });
        }
        let label_style = if focused { theme.accent_emphasis_style() } else { theme.text_secondary_style() };
        out.lines.push(Line::from(vec![Span::styled(label, label_style), value_span]));

        if let Some(error) = &field.error {
            out.lines.push(Line::from(Span::styled(
                format!("{:width$}↳ {error}", "", width = indent + LABEL_WIDTH + 2),
                theme.status_error(),
            )));
        }
    }

    fn button_line(out: &mut FormLines, label: String, target: FocusTarget, indent: usize, state: &LaunchState, theme: &dyn Theme) {
        let focused = state.focus() == target;
        if focused {
            out.focused_line = out.lines.len();
        }
        let enabled = !state.session.is_submitting();
        out.lines.push(Line::from(vec![
            Span::raw(" ".repeat(indent)),
            Span::styled(format!("[ {label} ]"), button_style(theme, enabled, focused)),
        ]));
    }

    fn entry_lines(out: &mut FormLines, row: &EntryRow, state: &LaunchState, theme: &dyn Theme) {
        let title = format!("  {} #{}", singular(row.collection), row.id);
        out.lines.push(Line::from(Span::styled(title, theme.text_muted_style())));
        for field in &row.fields {
            Self::field_lines(out, field, ENTRY_INDENT, state, theme);
        }
        Self::button_line(out, "Remove".into(), FocusTarget::Remove(row.collection, row.id), ENTRY_INDENT, state, theme);
    }

    fn form_lines(state: &LaunchState, theme: &dyn Theme) -> FormLines {
        let mut out = FormLines {
            lines: Vec::new(),
            focused_line: 0,
            cursor_column: None,
        };
        for field in state.session.scalar_views() {
            Self::field_lines(&mut out, &field, 0, state, theme);
        }
        for collection in CollectionType::ALL {
            out.lines.push(Line::default());
            out.lines.push(Line::from(Span::styled(collection.label().to_string(), theme.accent_emphasis_style())));
            for row in state.session.entry_rows(collection) {
                Self::entry_lines(&mut out, &row, state, theme);
            }
            let add_label = format!("+ Add {}", singular(collection));
            Self::button_line(&mut out, add_label, FocusTarget::Add(collection), 2, state, theme);
        }
        out.lines.push(Line::default());
        let submit_label = if state.session.is_submitting() { "Submitting..." } else { "Submit" };
        Self::button_line(&mut out, submit_label.into(), FocusTarget::Submit, 0, state, theme);
        Self::button_line(&mut out, "Reset".into(), FocusTarget::Reset, 0, state, theme);
        out
    }

    fn status_line(app: &App) -> Line<'static> {
        let theme = app.theme.as_ref();
        let state = &app.launch;
        if let Some(message) = state.session.submission_error() {
            return Line::from(vec![
                Span::styled(format!("✖ {message}"), theme.status_error()),
                Span::styled("  (Esc to dismiss)", theme.text_muted_style()),
            ]);
        }
        if state.session.is_submitting() {
            return Line::from(Span::styled(format!("{} Submitting task...", app.throbber()), theme.status_info()));
        }
        match &state.notice {
            Some(Notice::Error(message)) => Line::from(Span::styled(format!("✖ {message}"), theme.status_warning())),
            Some(Notice::Info(message)) => Line::from(Span::styled(message.clone(), theme.status_info())),
            None => Line::default(),
        }
    }

    fn keep_visible(&mut self, focused_line: usize, height: u16) {
        let line = focused_line as u16;
        if height == 0 {
            return;
        }
        if line < self.scroll {
            self.scroll = line;
        } else if line >= self.scroll + height {
            self.scroll = line + 1 - height;
        }
    }
}

fn singular(collection: CollectionType) -> &'static str {
    match collection {
        CollectionType::Volumes => "Volume",
        CollectionType::VolumesFrom => "Volume From",
        CollectionType::Uris => "URI",
        CollectionType::AgentConstraints => "Constraint",
        CollectionType::Ports => "Port",
        CollectionType::Envs => "Variable",
        CollectionType::MaskedEnvs => "Masked Variable",
    }
}

impl Component for LaunchComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let state = &mut app.launch;
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        if control {
            match key.code {
                KeyCode::Char('s') => return state.submit(),
                KeyCode::Char('n') => {
                    if let Some(collection) = state.focused_collection() {
                        state.add_entry(collection);
                    }
                }
                KeyCode::Char('d') => state.remove_focused_entry(),
                KeyCode::Char('r') => state.reset(),
                KeyCode::Char('v') => state.toggle_reveal(),
                _ => {}
            }
            return Vec::new();
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => state.focus_next(),
            KeyCode::BackTab | KeyCode::Up => state.focus_prev(),
            KeyCode::Enter => return Self::activate(state),
            KeyCode::Char(' ') if Self::on_button(state) => return Self::activate(state),
            KeyCode::Esc => state.dismiss(),
            KeyCode::Left => {
                if !state.cycle_choice(false) {
                    state.edit(|editor| editor.move_left());
                }
            }
            KeyCode::Right => {
                if !state.cycle_choice(true) {
                    state.edit(|editor| editor.move_right());
                }
            }
            KeyCode::Home => state.edit(|editor| editor.move_home()),
            KeyCode::End => state.edit(|editor| editor.move_end()),
            KeyCode::Backspace => state.edit(|editor| editor.backspace()),
            KeyCode::Delete => state.edit(|editor| editor.delete()),
            KeyCode::Char(c) => state.edit(|editor| editor.insert_char(c)),
            _ => {}
        }
        Vec::new()
    }

    fn hints(&self, _app: &App) -> Vec<(&'static str, &'static str)> {
        vec![
            ("Tab/↑↓", "move"),
            ("Enter", "submit"),
            ("^N", "add"),
            ("^D", "remove"),
            ("^V", "reveal"),
            ("^R", "reset"),
            ("^C", "quit"),
        ]
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let [form_area, status_area] = Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(rect);
        let theme = app.theme.as_ref();

        let form = Self::form_lines(&app.launch, theme);
        let outer = block(theme, Some(" Launch Task "), true);
        let inner = outer.inner(form_area);
        self.keep_visible(form.focused_line, inner.height);

        frame.render_widget(Paragraph::new(form.lines).block(outer).scroll((self.scroll, 0)), form_area);
        frame.render_widget(Paragraph::new(Self::status_line(app)), status_area);

        if let Some(column) = form.cursor_column
            && let Some(row) = (form.focused_line as u16).checked_sub(self.scroll)
            && row < inner.height
            && column < inner.width
        {
            frame.set_cursor_position(Position::new(inner.x + column, inner.y + row));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crossterm::event::{KeyEventKind, KeyEventState};
    use eremetic_api::EremeticClient;
    use eremetic_types::ScalarField;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;

    fn app() -> App {
        let client = EremeticClient::new("http://localhost:8000", None, Duration::from_secs(1)).unwrap();
        App::new(Arc::new(client))
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn type_text(component: &mut LaunchComponent, app: &mut App, text: &str) {
        for c in text.chars() {
            component.handle_key_events(app, key(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn enter_submits_from_a_text_field() {
        let mut app = app();
        let mut component = LaunchComponent::default();
        type_text(&mut component, &mut app, "alpine:3.10");
        component.handle_key_events(&mut app, key(KeyCode::Tab, KeyModifiers::NONE));
        type_text(&mut component, &mut app, "echo hi");

        let effects = component.handle_key_events(&mut app, key(KeyCode::Enter, KeyModifiers::NONE));
        assert!(matches!(effects.as_slice(), [Effect::SubmitLaunch { .. }]));

        // A second submit while in flight does nothing.
        let effects = component.handle_key_events(&mut app, key(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert!(effects.is_empty());
    }

    #[test]
    fn masked_values_are_hidden_until_revealed() {
        let mut app = app();
        let mut component = LaunchComponent::default();
        app.launch.add_entry(CollectionType::MaskedEnvs);
        type_text(&mut component, &mut app, "TOKEN");
        component.handle_key_events(&mut app, key(KeyCode::Tab, KeyModifiers::NONE));
        type_text(&mut component, &mut app, "hunter2");
        component.handle_key_events(&mut app, key(KeyCode::Tab, KeyModifiers::NONE));

        let mut terminal = Terminal::new(TestBackend::new(80, 80)).unwrap();
        terminal.draw(|frame| component.render(frame, frame.area(), &mut app)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("TOKEN"));
        assert!(!text.contains("hunter2"));

        component.handle_key_events(&mut app, key(KeyCode::Char('v'), KeyModifiers::CONTROL));
        terminal.draw(|frame| component.render(frame, frame.area(), &mut app)).unwrap();
        assert!(screen_text(&terminal).contains("hunter2"));
    }

    #[test]
    fn errors_render_next_to_their_field() {
        let mut app = app();
        let mut component = LaunchComponent::default();
        component.handle_key_events(&mut app, key(KeyCode::Char('s'), KeyModifiers::CONTROL));

        let mut terminal = Terminal::new(TestBackend::new(80, 60)).unwrap();
        terminal.draw(|frame| component.render(frame, frame.area(), &mut app)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Docker Image is required"));
        assert!(text.contains("2 fields need attention"));
        assert_eq!(app.launch.focus(), FocusTarget::Field(ScalarField::DockerImage.into()));
    }
}
