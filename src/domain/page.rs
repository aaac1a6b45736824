//! The page image being annotated

use serde::{Deserialize, Serialize};

use super::geometry::{Point, Size};

/// Page image metadata as listed by the backend's `GET /images`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageImage {
    pub name: String,
    /// Image path relative to the data directory
    pub src: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub center: Option<PagePoint>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePoint {
    pub x: i64,
    pub y: i64,
}

impl PageImage {
    pub fn new(name: impl Into<String>, src: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            src: src.into(),
            width,
            height,
            center: None,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    /// Visual center of the image; the rotation pivot
    pub fn center(&self) -> Point {
        self.size().center()
    }
}
