//! Pointer events delivered to the page view's controllers

use serde::{Deserialize, Serialize};

use crate::domain::Point;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub control: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        control: false,
    };

    pub fn shift(self) -> bool {
        self.shift
    }

    pub fn control(self) -> bool {
        self.control
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Down,
    Move,
    Up,
    /// Press and release without movement in between
    Click,
    /// Native drag gesture start (image drag, text selection)
    DragStart,
}

/// A pointer event travelling from the knobs (top) to the page image
/// (bottom). Handlers can suppress the native default action and stop the
/// event from reaching handlers further down.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// Screen position
    pub position: Point,
    pub modifiers: Modifiers,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, position: Point) -> Self {
        Self {
            kind,
            position,
            modifiers: Modifiers::NONE,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn click(position: Point) -> Self {
        Self::new(PointerKind::Click, position)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}
