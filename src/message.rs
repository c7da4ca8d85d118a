use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use crate::format::{format_lines, to_markup, to_styled_lines, FormattedLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

impl Role {
    /// Tag used to style the entry, mirrors the `user` / `bot` message classes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Bot => "bot",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "You:",
            Role::Bot => "Guide:",
        }
    }

    pub fn label_style(&self) -> Style {
        let color = match self {
            Role::User => Color::Cyan,
            Role::Bot => Color::Yellow,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub role: Role,
}

/// A message as it sits in the log, formatted once when appended.
#[derive(Debug, Clone)]
pub struct LogEntry {
    message: Message,
    lines: Vec<FormattedLine>,
}

impl LogEntry {
    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn role(&self) -> Role {
        self.message.role
    }

    pub fn lines(&self) -> &[FormattedLine] {
        &self.lines
    }

    pub fn markup(&self) -> String {
        to_markup(&self.lines)
    }

    /// The entry as the log draws it: role label, content, blank separator.
    pub fn to_lines(&self) -> Vec<Line<'static>> {
        let role = self.role();
        let mut lines = Vec::with_capacity(self.lines.len() + 2);
        lines.push(Line::from(Span::styled(role.label(), role.label_style())));
        lines.extend(to_styled_lines(&self.lines));
        lines.push(Line::default());
        lines
    }

    /// Rows this entry takes at `width` columns, word-wrapped exactly as the
    /// log paragraph wraps it.
    fn rows(&self, width: u16) -> u16 {
        let count = Paragraph::new(self.to_lines())
            .wrap(Wrap { trim: false })
            .line_count(width);
        u16::try_from(count).unwrap_or(u16::MAX)
    }
}

/// Scrolling chat log. Entries are only ever appended.
#[derive(Debug, Default)]
pub struct MessageLog {
    entries: Vec<LogEntry>,
    scroll: u16,
    viewport_height: u16,
    viewport_width: u16,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Format `text`, append it under `role` and keep the newest entry in view.
    pub fn append(&mut self, text: impl Into<String>, role: Role) -> &LogEntry {
        let text = text.into();
        let lines = format_lines(&text);
        self.entries.push(LogEntry {
            message: Message { text, role },
            lines,
        });
        self.scroll_to_bottom();
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_role(&self, role: Role) -> usize {
        self.entries.iter().filter(|e| e.role() == role).count()
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    /// Called by the renderer with the inner size of the log area.
    pub fn set_viewport(&mut self, width: u16, height: u16) {
        let at_bottom = self.scroll >= self.max_scroll();
        self.viewport_width = width;
        self.viewport_height = height;
        if at_bottom {
            self.scroll_to_bottom();
        } else {
            self.scroll = self.scroll.min(self.max_scroll());
        }
    }

    pub fn total_rows(&self) -> u16 {
        // Default to 50 columns until the first render reports a size
        let wrap_width = if self.viewport_width > 0 {
            self.viewport_width
        } else {
            50
        };
        self.entries
            .iter()
            .fold(0u16, |acc, e| acc.saturating_add(e.rows(wrap_width)))
    }

    fn max_scroll(&self) -> u16 {
        let visible_height = if self.viewport_height > 0 {
            self.viewport_height
        } else {
            20
        };
        self.total_rows().saturating_sub(visible_height)
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.max_scroll();
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.scroll = self.scroll.saturating_add(rows).min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.scroll = self.scroll.saturating_sub(rows);
    }
}
