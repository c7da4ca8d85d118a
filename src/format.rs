use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

/// Lines at or above this many characters are never treated as place names.
pub const PLACE_NAME_MAX_CHARS: usize = 50;

const LINE_BREAK: &str = "<br>";

/// One line of a chat message after the place-name heuristic has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedLine {
    pub text: String,
    pub emphasized: bool,
}

/// Short lines without sentence punctuation are most likely place names
/// returned by the places agent, so they get bold emphasis.
pub fn looks_like_place_name(line: &str) -> bool {
    let len = line.chars().count();
    len > 0 && len < PLACE_NAME_MAX_CHARS && !line.contains(['.', '?', '!'])
}

/// Split raw message text into trimmed lines and mark the place names.
pub fn format_lines(text: &str) -> Vec<FormattedLine> {
    text.split('\n')
        .map(|line| {
            let trimmed = line.trim();
            FormattedLine {
                text: trimmed.to_string(),
                emphasized: looks_like_place_name(trimmed),
            }
        })
        .collect()
}

/// Escape the characters that are significant in markup.
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render formatted lines as markup. Text is escaped before any tags are
/// added, so the only live markup in the output is `<strong>` and `<br>`.
pub fn to_markup(lines: &[FormattedLine]) -> String {
    lines
        .iter()
        .map(|line| {
            let escaped = escape_markup(&line.text);
            if line.emphasized {
                format!("<strong>{}</strong>", escaped)
            } else {
                escaped
            }
        })
        .collect::<Vec<_>>()
        .join(LINE_BREAK)
}

pub fn format_message(text: &str) -> String {
    to_markup(&format_lines(text))
}

/// Terminal projection of the same formatting: emphasized lines are bold.
pub fn to_styled_lines(lines: &[FormattedLine]) -> Vec<Line<'static>> {
    lines
        .iter()
        .map(|line| {
            if line.text.is_empty() {
                Line::default()
            } else if line.emphasized {
                Line::from(Span::styled(
                    line.text.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(line.text.clone())
            }
        })
        .collect()
}
