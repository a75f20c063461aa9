//! ANSI escape handling for task output.
//!
//! SGR sequences become ratatui styles layered over the pane's base style.
//! Every other escape sequence (cursor movement, OSC titles) is dropped.

use once_cell::sync::Lazy;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use regex::Regex;

static ESCAPE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\x1b(?:\[([0-9;:?]*)([@-~])|\][^\x07\x1b]*(?:\x07|\x1b\\)?|[@-_])?").ok());

const BASIC_COLORS: [Color; 16] = [
    Color::Black,
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
    Color::Gray,
    Color::DarkGray,
    Color::LightRed,
    Color::LightGreen,
    Color::LightYellow,
    Color::LightBlue,
    Color::LightMagenta,
    Color::LightCyan,
    Color::White,
];

/// Convert one line of terminal output into a styled [`Line`].
pub fn ansi_line(line: &str, base: Style) -> Line<'static> {
    let Some(escape) = ESCAPE.as_ref() else {
        return Line::from(Span::styled(line.to_string(), base));
    };

    let mut spans = Vec::new();
    let mut style = base;
    let mut last = 0;
    for captures in escape.captures_iter(line) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        if whole.start() > last {
            spans.push(Span::styled(line[last..whole.start()].to_string(), style));
        }
        last = whole.end();
        if captures.get(2).is_some_and(|end| end.as_str() == "m") {
            let params = captures.get(1).map_or("", |params| params.as_str());
            style = apply_sgr(style, base, params);
        }
    }
    if last < line.len() {
        spans.push(Span::styled(line[last..].to_string(), style));
    }
    Line::from(spans)
}

fn apply_sgr(mut style: Style, base: Style, params: &str) -> Style {
    let mut codes = params.split([';', ':']).map(|code| code.parse::<u16>().unwrap_or(0));
    while let Some(code) = codes.next() {
        style = match code {
            0 => base,
            1 => style.add_modifier(Modifier::BOLD),
            2 => style.add_modifier(Modifier::DIM),
            3 => style.add_modifier(Modifier::ITALIC),
            4 => style.add_modifier(Modifier::UNDERLINED),
            7 => style.add_modifier(Modifier::REVERSED),
            22 => style.remove_modifier(Modifier::BOLD | Modifier::DIM),
            23 => style.remove_modifier(Modifier::ITALIC),
            24 => style.remove_modifier(Modifier::UNDERLINED),
            27 => style.remove_modifier(Modifier::REVERSED),
            30..=37 => style.fg(BASIC_COLORS[usize::from(code - 30)]),
            90..=97 => style.fg(BASIC_COLORS[usize::from(code - 90 + 8)]),
            40..=47 => style.bg(BASIC_COLORS[usize::from(code - 40)]),
            100..=107 => style.bg(BASIC_COLORS[usize::from(code - 100 + 8)]),
            38 => extended_color(&mut codes).map_or(style, |color| style.fg(color)),
            48 => extended_color(&mut codes).map_or(style, |color| style.bg(color)),
            39 => style.fg(base.fg.unwrap_or(Color::Reset)),
            49 => style.bg(base.bg.unwrap_or(Color::Reset)),
            _ => style,
        };
    }
    style
}

/// `5;n` (256-colour palette) or `2;r;g;b` (true colour).
fn extended_color(codes: &mut impl Iterator<Item = u16>) -> Option<Color> {
    let mut channel = || codes.next().and_then(|value| u8::try_from(value).ok());
    match channel()? {
        5 => channel().map(Color::Indexed),
        2 => Some(Color::Rgb(channel()?, channel()?, channel()?)),
        _ => None,
    }
}
