use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::App;
use crate::controller::Focus;
use crate::tui::AppEvent;

const WHEEL_ROWS: u16 = 3;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.poll_query().await;
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any focus
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Esc => {
            app.should_quit = true;
            return;
        }
        KeyCode::Tab => {
            let next = match app.chat.focus() {
                Focus::Input => Focus::Log,
                Focus::Log => Focus::Input,
            };
            app.chat.set_focus(next);
            return;
        }
        _ => {}
    }

    match app.chat.focus() {
        Focus::Input => handle_input_key(app, key),
        Focus::Log => handle_log_key(app, key),
    }
}

fn handle_input_key(app: &mut App, key: KeyEvent) {
    // Enter submits; Shift+Enter falls through to the input as a newline
    if key.code == KeyCode::Enter && !key.modifiers.contains(KeyModifiers::SHIFT) {
        app.submit();
        return;
    }

    let Some(input) = app.chat.input_mut() else {
        return;
    };

    match key.code {
        KeyCode::Enter => input.insert('\n'),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        KeyCode::Char(c) => input.insert(c),
        _ => {}
    }
}

fn handle_log_key(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Char('i') | KeyCode::Enter) {
        app.chat.set_focus(Focus::Input);
        return;
    }

    let half_page = app
        .log_area
        .map(|area| area.height.saturating_sub(2) / 2)
        .unwrap_or(5)
        .max(1);
    let log = app.chat.log_mut();

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => log.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => log.scroll_up(1),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            log.scroll_down(half_page)
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            log.scroll_up(half_page)
        }
        KeyCode::PageDown => log.scroll_down(half_page),
        KeyCode::PageUp => log.scroll_up(half_page),
        KeyCode::Char('g') | KeyCode::Home => log.scroll_to_top(),
        KeyCode::Char('G') | KeyCode::End => log.scroll_to_bottom(),
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let Some(area) = app.log_area else {
        return;
    };
    if !point_in_rect(mouse.column, mouse.row, area) {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.chat.log_mut().scroll_down(WHEEL_ROWS),
        MouseEventKind::ScrollUp => app.chat.log_mut().scroll_up(WHEEL_ROWS),
        _ => {}
    }
}
