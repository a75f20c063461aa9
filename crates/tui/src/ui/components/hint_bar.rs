//! Single-line strip of key bindings for the current screen.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ui::theme::Theme;

pub fn draw_hints(frame: &mut Frame, rect: Rect, theme: &dyn Theme, hints: &[(&str, &str)]) {
    let mut spans = Vec::with_capacity(hints.len() * 3);
    for (index, (keys, action)) in hints.iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled("  ", theme.text_muted_style()));
        }
        spans.push(Span::styled(*keys, theme.accent_emphasis_style()));
        spans.push(Span::styled(format!(" {action}"), theme.text_muted_style()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), rect);
}
