use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use tokio::sync::mpsc;

use crate::app::Action;

pub async fn run_event_loop(tx: mpsc::UnboundedSender<Action>) {
    let mut reader = EventStream::new();
    let mut tick = tokio::time::interval(Duration::from_millis(250));

    loop {
        tokio::select! {
            _ = tick.tick() => {
                if tx.send(Action::Tick).is_err() {
                    break;
                }
            }
            maybe_event = reader.next() => {
                let action = match maybe_event {
                    Some(Ok(Event::Key(key))) => key_to_action(key),
                    Some(Ok(Event::FocusLost)) => Some(Action::FocusLost),
                    Some(Ok(Event::Resize(_, _))) => {
                        // Terminal will re-render on next frame
                        None
                    }
                    Some(Err(_)) | None => break,
                    _ => None,
                };
                if let Some(action) = action {
                    if tx.send(action).is_err() {
                        break;
                    }
                }
            }
        }
    }
}

fn key_to_action(key: KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    // Ctrl+C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    let key = match key.code {
        KeyCode::Up => KeyAction::Up,
        KeyCode::Down => KeyAction::Down,
        KeyCode::Left => KeyAction::Left,
        KeyCode::Right => KeyAction::Right,
        KeyCode::Enter => KeyAction::Enter,
        KeyCode::Esc => KeyAction::Escape,
        KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => KeyAction::BackTab,
        KeyCode::Tab => KeyAction::Tab,
        KeyCode::BackTab => KeyAction::BackTab,
        KeyCode::Backspace => KeyAction::Backspace,
        KeyCode::Char(c) => KeyAction::Char(c),
        _ => return None,
    };
    Some(Action::Key(key))
}

/// Keys are interpreted by the app according to the current mode, so
/// letters arrive as `Char` rather than as commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
    Tab,
    BackTab,
    Backspace,
    Char(char),
}
