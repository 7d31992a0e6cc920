//! Keyboard shortcuts for the scanner window

use cosmic::iced::keyboard::{Key, Modifiers, key::Named};

use super::messages::Msg;
use super::state::ScannerState;

pub fn handle_key_event(state: &ScannerState, key: Key, modifiers: Modifiers) -> Option<Msg> {
    let has_result = state.result.is_some();

    match key {
        // Space or Enter: start/stop
        Key::Named(Named::Space) | Key::Named(Named::Enter) if !modifiers.control() => {
            Some(if state.is_active() { Msg::Stop } else { Msg::Start })
        }
        Key::Named(Named::Escape) if state.is_active() => Some(Msg::Stop),
        Key::Named(Named::Escape) if has_result => Some(Msg::ClearResult),
        Key::Character(c) if c.as_str() == "c" && modifiers.control() && has_result => {
            Some(Msg::CopyResult)
        }
        Key::Named(Named::F5) if !state.is_active() => Some(Msg::RefreshCameras),
        _ => None,
    }
}
