use serde::{Deserialize, Serialize};

use crate::config::AnnotatorConfig;
use crate::session::messages::Msg;
use crate::session::state::AnnotationStore;
use crate::widget::event::Modifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Named {
    Escape,
    Delete,
    Backspace,
    Enter,
}

/// A key press, either a named key or the character it produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Key {
    Named(Named),
    Character(String),
}

impl Key {
    pub fn character(c: &str) -> Self {
        Key::Character(c.to_string())
    }
}

impl From<String> for Key {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Escape" => Key::Named(Named::Escape),
            "Delete" => Key::Named(Named::Delete),
            "Backspace" => Key::Named(Named::Backspace),
            "Enter" => Key::Named(Named::Enter),
            _ => Key::Character(raw),
        }
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        match key {
            Key::Named(named) => format!("{named:?}"),
            Key::Character(c) => c,
        }
    }
}

pub fn handle_key_event(
    store: &AnnotationStore,
    config: &AnnotatorConfig,
    key: &Key,
    modifiers: Modifiers,
) -> Option<Msg> {
    let outlining = store.interaction().is_outlining();
    let has_table = store.selected_table().is_some();
    let has_row = store.selected_row().is_some();

    match key {
        // Escape: first abandon an outline, then drop the selection
        Key::Named(Named::Escape) if outlining => Some(Msg::cancel_outline()),
        Key::Named(Named::Escape) if has_table => Some(Msg::deselect()),
        Key::Named(Named::Delete | Named::Backspace) if has_row => {
            Some(Msg::delete_selected_row())
        }
        // Ctrl+r / Ctrl+R: fine rotation for deskewing
        Key::Character(c) if c == "r" && modifiers.control() => {
            Some(Msg::rotate(config.fine_rotation_step))
        }
        Key::Character(c) if c == "R" && modifiers.control() => {
            Some(Msg::rotate(-config.fine_rotation_step))
        }
        Key::Character(c) if c == "r" => Some(Msg::rotate(config.rotation_step)),
        Key::Character(c) if c == "R" => Some(Msg::rotate(-config.rotation_step)),
        Key::Character(c) if c == "s" && modifiers.control() => Some(Msg::save()),
        Key::Character(c) if c == "a" && has_table => Some(Msg::add_row_at_pointer()),
        Key::Character(c) if c == "n" && has_table => Some(Msg::predict_next_row()),
        _ => None,
    }
}
