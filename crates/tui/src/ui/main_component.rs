//! Top-level view: header, the component for the current route, and the
//! hint bar.

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use super::components::component::Component;
use super::components::hint_bar::draw_hints;
use super::components::{LaunchComponent, TaskComponent};
use crate::app::{App, Effect, Msg, Route};

pub struct MainView {
    /// Component for the current route.
    pub content_view: Box<dyn Component>,
}

impl Default for MainView {
    fn default() -> Self {
        Self::new()
    }
}

impl MainView {
    pub fn new() -> Self {
        Self {
            content_view: Box::new(LaunchComponent::default()),
        }
    }

    /// Enter `route`. Use [`Effect::SwitchTo`] rather than calling this from
    /// components.
    pub fn set_current_route(&mut self, app: &mut App, route: Route) -> Vec<Effect> {
        self.content_view = match route {
            Route::Launch => Box::new(LaunchComponent::default()),
            Route::Task(_) => Box::new(TaskComponent::default()),
        };
        app.switch_to(route)
    }

    pub fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        self.content_view.handle_key_events(app, key)
    }

    pub fn handle_message(&mut self, app: &mut App, msg: Msg) -> Vec<Effect> {
        app.update(msg)
    }

    fn header_line(app: &App) -> Line<'static> {
        let theme = app.theme.as_ref();
        let screen = match &app.route {
            Route::Launch => "New Task",
            Route::Task(_) => "Task Output",
        };
        Line::from(vec![
            Span::styled("Eremetic", theme.accent_emphasis_style().add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {screen}"), theme.text_secondary_style()),
            Span::styled(format!("  {}", app.client.base_url()), theme.text_muted_style()),
        ])
    }

    pub fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let [header_area, content_area, hints_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1)]).areas(rect);

        let roles = app.theme.roles();
        frame.render_widget(Block::default().style(Style::default().bg(roles.background)), rect);
        frame.render_widget(
            Paragraph::new(Self::header_line(app)).style(Style::default().bg(roles.surface_muted)),
            header_area,
        );
        self.content_view.render(frame, content_area, app);
        let hints = self.content_view.hints(app);
        draw_hints(frame, hints_area, app.theme.as_ref(), &hints);
    }
}
