//! Coordinate transforms and the positioning constants shared between
//! pointer handling, knob layout and raster rendering.
//!
//! Three spaces are involved:
//! - screen: pointer coordinates
//! - document: pixels of the unrotated page image
//! - table frame: document space turned by a table's own rotation, in which
//!   the outline is axis-aligned
//!
//! The page image is rendered rotated about its visual center, so the
//! forward transform is `screen = position + pivot + R(θ)(doc - pivot)` and
//! [`screen_to_document`] applies exactly the inverse.

use crate::domain::{DocumentPosition, Point, Rect, Rotation, Size};

/// Row knob geometry
pub mod knob {
    /// Side length of a knob handle in screen pixels
    pub const SIZE: f32 = 14.0;
    /// Horizontal distance from the table's left edge to the knob center,
    /// so the knob does not cover table content
    pub const OFFSET: f32 = 16.0;
}

/// Raster constants for row prediction
pub mod raster {
    /// Height of the pixel strip compared when predicting row positions
    pub const ROW_STRIP_HEIGHT: u32 = 3;
    /// Candidate window (± pixels) around the expected next row position
    pub const ROW_SEARCH_AREA: i32 = 10;
}

/// Pivot of the page image rotation: the visual center of the image box.
#[inline]
pub fn rotation_pivot(page: Size) -> Point {
    page.center()
}

/// Rotate `point` about `pivot`, clockwise on screen for positive angles
#[inline]
pub fn rotate_about(point: Point, pivot: Point, rotation: Rotation) -> Point {
    let (sin, cos) = rotation.radians().sin_cos();
    let dx = point.x - pivot.x;
    let dy = point.y - pivot.y;
    Point::new(
        pivot.x + dx * cos - dy * sin,
        pivot.y + dx * sin + dy * cos,
    )
}

/// Anything whose rendered bounds can be measured, e.g. the page image
/// element once it has been laid out.
pub trait MeasuredElement {
    /// Screen-space bounds of the unrotated layout box, `None` while the
    /// element is not mounted.
    fn bounding_rect(&self) -> Option<Rect>;
}

/// Screen offset of the rendered page image's top-left corner.
pub fn page_offset(element: &impl MeasuredElement) -> Option<DocumentPosition> {
    element.bounding_rect().map(|rect| rect.top_left())
}

/// Map a pointer position to document coordinates.
pub fn screen_to_document(
    screen: Point,
    position: DocumentPosition,
    rotation: Rotation,
    pivot: Point,
) -> Point {
    rotate_about(screen.minus(position), pivot, rotation.inverse())
}

/// Map a document point to the screen, as the renderer draws it.
pub fn document_to_screen(
    document: Point,
    position: DocumentPosition,
    rotation: Rotation,
    pivot: Point,
) -> Point {
    rotate_about(document, pivot, rotation).offset(position)
}

/// Map a document point into a table frame turned by `frame_rotation`
pub fn document_to_frame(document: Point, frame_rotation: Rotation, pivot: Point) -> Point {
    rotate_about(document, pivot, frame_rotation)
}

/// Map a table frame point back to document space
pub fn frame_to_document(frame: Point, frame_rotation: Rotation, pivot: Point) -> Point {
    rotate_about(frame, pivot, frame_rotation.inverse())
}

/// The full screen/document mapping of one page view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub position: DocumentPosition,
    pub rotation: Rotation,
    pub pivot: Point,
}

impl ViewTransform {
    pub fn new(position: DocumentPosition, rotation: Rotation, page: Size) -> Self {
        Self {
            position,
            rotation,
            pivot: rotation_pivot(page),
        }
    }

    pub fn to_document(&self, screen: Point) -> Point {
        screen_to_document(screen, self.position, self.rotation, self.pivot)
    }

    pub fn to_screen(&self, document: Point) -> Point {
        document_to_screen(document, self.position, self.rotation, self.pivot)
    }
}
