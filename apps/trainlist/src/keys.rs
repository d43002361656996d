use std::{thread, time::Duration};

use client_core::{CancelHandle, Column, ViewCommand};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use shared::domain::TerritoryId;
use tokio::sync::mpsc;
use tracing::{info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    View(ViewCommand),
    Quit,
}

/// Digits 1-9 sort by the matching column and 0 toggles unknown territories. F1, F2, ...
/// toggle the known territories in `territories` order.
pub fn key_action(key: KeyEvent, territories: &[TerritoryId]) -> Option<KeyAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyAction::Quit)
        }
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(KeyAction::Quit),
        KeyCode::Char('0') => Some(KeyAction::View(ViewCommand::ToggleUnknown)),
        KeyCode::Char(digit @ '1'..='9') => {
            let index = digit as usize - '1' as usize;
            let column = Column::ALL.get(index)?;
            Some(KeyAction::View(ViewCommand::SortBy(*column)))
        }
        KeyCode::F(number) => {
            let territory = territories.get(usize::from(number).checked_sub(1)?)?;
            Some(KeyAction::View(ViewCommand::ToggleTerritory(*territory)))
        }
        _ => None,
    }
}

/// Reads the keyboard on its own thread. Quitting cancels the session through `cancel`.
pub fn spawn_input_thread(
    territories: Vec<TerritoryId>,
    commands: mpsc::Sender<ViewCommand>,
    cancel: CancelHandle,
) {
    thread::spawn(move || loop {
        match event::poll(POLL_INTERVAL) {
            Ok(true) => {}
            Ok(false) if commands.is_closed() => break,
            Ok(false) => continue,
            Err(err) => {
                warn!(error = %err, "terminal input failed");
                break;
            }
        }
        let key = match event::read() {
            Ok(Event::Key(key)) => key,
            Ok(_) => continue,
            Err(err) => {
                warn!(error = %err, "terminal input failed");
                break;
            }
        };
        match key_action(key, &territories) {
            Some(KeyAction::View(command)) => {
                if commands.blocking_send(command).is_err() {
                    break;
                }
            }
            Some(KeyAction::Quit) => {
                info!("quit requested");
                cancel.cancel();
                break;
            }
            None => {}
        }
    });
}

#[cfg(test)]
#[path = "tests/keys_tests.rs"]
mod tests;
