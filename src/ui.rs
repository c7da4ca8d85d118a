use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};
use crate::app::App;
use crate::controller::Focus;

const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

/// Input box grows with Shift+Enter newlines up to this many text rows.
const MAX_INPUT_ROWS: u16 = 6;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let input_rows = (app.chat.input().value().split('\n').count() as u16).clamp(1, MAX_INPUT_ROWS);

    // Main layout: header, log, input, footer
    let [header_area, log_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(input_rows + 2),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_log(app, frame, log_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let header = Line::from(vec![
        Span::styled(" Tourism Guide ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!(" {} ", app.client.base_url()),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

fn render_log(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store area for mouse hit-testing
    app.log_area = Some(area);

    // Inner size minus borders, for scroll calculations
    app.chat
        .log_mut()
        .set_viewport(area.width.saturating_sub(2), area.height.saturating_sub(2));

    let focused = app.chat.focus() == Focus::Log;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Chat ");

    let log = app.chat.log();
    let text = if log.is_empty() {
        Text::from(Span::styled(
            "Ask about a place: its weather, places to visit, or both.",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(
            log.entries()
                .iter()
                .flat_map(|entry| entry.to_lines())
                .collect::<Vec<_>>(),
        )
    };

    let scroll = log.scroll();
    let total_rows = log.total_rows();

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);

    let visible = area.height.saturating_sub(2);
    if total_rows > visible {
        let mut scrollbar_state = ScrollbarState::new(total_rows.saturating_sub(visible) as usize)
            .position(scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut scrollbar_state,
        );
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let controls = app.chat.controls();
    let focused = app.chat.focus() == Focus::Input;

    let border_color = if !controls.input_enabled {
        Color::DarkGray
    } else if focused {
        Color::Cyan
    } else {
        Color::Gray
    };
    let text_style = if controls.input_enabled {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Ask ");

    let input = Paragraph::new(app.chat.input().value())
        .style(text_style)
        .block(block);
    frame.render_widget(input, area);

    // Only a focused, enabled input shows the cursor
    if focused && controls.input_enabled {
        let (row, col) = cursor_row_col(app.chat.input().value(), app.chat.input().cursor());
        let x = area.x + 1 + col.min(area.width.saturating_sub(3));
        let y = area.y + 1 + row.min(area.height.saturating_sub(3));
        frame.set_cursor_position(Position::new(x, y));
    }
}

/// Row and column of the cursor in a possibly multi-line input.
fn cursor_row_col(value: &str, cursor: usize) -> (u16, u16) {
    let before: String = value.chars().take(cursor).collect();
    let row = before.matches('\n').count() as u16;
    let col = before
        .rsplit('\n')
        .next()
        .map(|line| line.chars().count())
        .unwrap_or(0) as u16;
    (row, col)
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let controls = app.chat.controls();
    let key_style = Style::default().fg(Color::Black).bg(Color::DarkGray);
    let label_style = Style::default().fg(Color::DarkGray);

    let button_style = if controls.submit_enabled {
        Style::default().fg(Color::Black).bg(Color::Cyan).bold()
    } else {
        Style::default().fg(Color::Gray).bg(Color::DarkGray)
    };

    let mut spans = vec![Span::styled(format!(" {} ", controls.submit_label), button_style)];
    if controls.spinner_visible {
        let frame_idx = app.animation_frame as usize % SPINNER_FRAMES.len();
        spans.push(Span::styled(
            format!(" {} ", SPINNER_FRAMES[frame_idx]),
            Style::default().fg(Color::Yellow),
        ));
    }
    spans.extend([
        Span::raw(" "),
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" S-Enter ", key_style),
        Span::styled(" newline ", label_style),
        Span::styled(" Tab ", key_style),
        Span::styled(" focus ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::message::Role;
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        let mut text = String::new();
        for row in buffer.content.chunks(width) {
            for cell in row {
                text.push_str(cell.symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn cursor_tracks_newlines() {
        assert_eq!(cursor_row_col("Paris", 5), (0, 5));
        assert_eq!(cursor_row_col("Paris\nFr", 8), (1, 2));
        assert_eq!(cursor_row_col("Paris\nFr", 3), (0, 3));
    }

    #[test]
    fn renders_messages_and_send_label() {
        let mut app = App::new(&Config::new()).unwrap();
        app.chat.log_mut().append("Bangalore", Role::User);
        app.chat.log_mut().append("Lalbagh\nCubbon Park", Role::Bot);

        let mut terminal = Terminal::new(TestBackend::new(60, 16)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        let screen = buffer_text(&terminal);
        assert!(screen.contains("You:"));
        assert!(screen.contains("Guide:"));
        assert!(screen.contains("Cubbon Park"));
        assert!(screen.contains(" Send "));
        assert!(app.log_area.is_some());
    }

    #[test]
    fn newest_word_wrapped_reply_is_fully_visible() {
        let mut app = App::new(&Config::new()).unwrap();
        app.chat.log_mut().append("Bangalore", Role::User);
        let words: Vec<String> = (1..=20).map(|i| format!("place{i:04}")).collect();
        app.chat.log_mut().append(words.join(" "), Role::Bot);

        // 30x12 leaves a 28x5 log interior
        let mut terminal = Terminal::new(TestBackend::new(30, 12)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        let screen = buffer_text(&terminal);
        assert!(screen.contains("place0019"));
        assert!(screen.contains("place0020"));
    }
}
