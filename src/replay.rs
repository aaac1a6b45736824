//! Scripted input for the page view
//!
//! A script is a JSON lines file, one event per line:
//!
//! ```text
//! {"event": "measure", "x": 100, "y": 50}
//! {"event": "click", "x": 150, "y": 120}
//! {"event": "click", "x": 200, "y": 200, "shift": true}
//! {"event": "drag", "from": {"x": 84, "y": 250}, "to": {"x": 84, "y": 262}}
//! {"event": "key", "key": "r", "control": true}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::Point;
use crate::session::messages::Msg;
use crate::session::shortcuts::Key;
use crate::widget::event::{Modifiers, PointerEvent, PointerKind};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// Page image laid out with its top-left corner here
    Measure { x: f32, y: f32 },
    Click {
        x: f32,
        y: f32,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        control: bool,
    },
    /// A single raw pointer event
    Pointer { kind: PointerKind, x: f32, y: f32 },
    /// Press at `from`, move to `to`, release, then the trailing click
    Drag { from: Point, to: Point },
    Key {
        key: Key,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        control: bool,
    },
    Rotate { degrees: f32 },
}

impl ScriptEvent {
    pub fn into_msg(self) -> Msg {
        match self {
            ScriptEvent::Measure { x, y } => Msg::measured(Point::new(x, y)),
            ScriptEvent::Click {
                x,
                y,
                shift,
                control,
            } => Msg::Pointer(
                PointerEvent::click(Point::new(x, y)).with_modifiers(Modifiers { shift, control }),
            ),
            ScriptEvent::Pointer { kind, x, y } => {
                Msg::Pointer(PointerEvent::new(kind, Point::new(x, y)))
            }
            ScriptEvent::Drag { from, to } => Msg::Batch(vec![
                Msg::Pointer(PointerEvent::new(PointerKind::Down, from)),
                Msg::Pointer(PointerEvent::new(PointerKind::Move, to)),
                Msg::Pointer(PointerEvent::new(PointerKind::Up, to)),
                Msg::Pointer(PointerEvent::click(to)),
            ]),
            ScriptEvent::Key {
                key,
                shift,
                control,
            } => Msg::Key(key, Modifiers { shift, control }),
            ScriptEvent::Rotate { degrees } => Msg::rotate(degrees),
        }
    }
}

pub fn parse_script(script: &str) -> Result<Vec<ScriptEvent>> {
    script
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid event on line {}", index + 1))
        })
        .collect()
}
