use ratatui::{
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, BorderType, Borders},
};

use super::roles::{Theme, ThemeRoles};

/// Build a standard Block with theme surfaces and borders.
pub fn block<'a, T: Theme + ?Sized>(theme: &T, title: Option<&'a str>, focused: bool) -> Block<'a> {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .border_style(theme.border_style(focused))
        .style(panel_style(theme));
    if let Some(title) = title {
        block = block.title(Span::styled(title, theme.text_secondary_style().add_modifier(Modifier::BOLD)));
    }
    block
}

/// Style for panel-like containers.
pub fn panel_style<T: Theme + ?Sized>(theme: &T) -> Style {
    let ThemeRoles { surface, text, .. } = *theme.roles();
    Style::default().bg(surface).fg(text)
}

/// Style for an input value; invalid inputs are drawn in the error color.
pub fn input_style<T: Theme + ?Sized>(theme: &T, valid: bool, focused: bool) -> Style {
    let ThemeRoles { text, error, selection_bg, .. } = *theme.roles();
    let mut style = Style::default().fg(if valid { text } else { error });
    if focused {
        style = style.bg(selection_bg).add_modifier(Modifier::BOLD);
    }
    style
}

/// Inline button label such as `[ Submit ]`.
pub fn button_style<T: Theme + ?Sized>(theme: &T, enabled: bool, focused: bool) -> Style {
    if !enabled {
        return theme.text_muted_style();
    }
    let ThemeRoles {
        accent_secondary,
        accent_primary,
        selection_bg,
        ..
    } = *theme.roles();
    if focused {
        Style::default().fg(accent_primary).bg(selection_bg).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(accent_secondary)
    }
}
