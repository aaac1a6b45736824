//! Table outlines with their row and column boundaries
//!
//! A table lives in its own frame: the page turned by the rotation that was
//! active when the table was outlined. In that frame the outline is an
//! axis-aligned rectangle and row/column boundaries are plain y/x positions.
//! With a rotation of zero the frame is document space.

use serde::{Deserialize, Serialize};

use super::cells::CellGrid;
use super::geometry::{Point, Rect};
use super::rotation::Rotation;
use crate::render::geometry::frame_to_document;

/// Smallest distance a boundary keeps from the outline edges and from
/// another boundary
pub const MIN_BOUNDARY_GAP: f32 = 1.0;

/// Identifier of a table within one page view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableId(pub u64);

impl std::fmt::Display for TableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "table-{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableOutline {
    pub id: TableId,
    /// Outline in the table frame
    pub outline: Rect,
    /// Rotation of the table frame relative to document space
    pub rotation: Rotation,
    rows: Vec<f32>,
    columns: Vec<f32>,
}

impl TableOutline {
    pub fn new(id: TableId, outline: Rect, rotation: Rotation) -> Self {
        Self {
            id,
            outline,
            rotation,
            rows: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Row boundaries (frame y), sorted top to bottom
    pub fn rows(&self) -> &[f32] {
        &self.rows
    }

    /// Column boundaries (frame x), sorted left to right
    pub fn columns(&self) -> &[f32] {
        &self.columns
    }

    /// Outline corners in document space, clockwise from the frame's top-left
    pub fn polygon(&self, pivot: Point) -> [Point; 4] {
        self.outline
            .corners()
            .map(|corner| frame_to_document(corner, self.rotation, pivot))
    }

    fn clamp_row(&self, y: f32) -> f32 {
        let low = self.outline.top + MIN_BOUNDARY_GAP;
        let high = (self.outline.bottom - MIN_BOUNDARY_GAP).max(low);
        y.clamp(low, high)
    }

    fn inside_rows(&self, y: f32) -> bool {
        y > self.outline.top && y < self.outline.bottom
    }

    fn inside_columns(&self, x: f32) -> bool {
        x > self.outline.left && x < self.outline.right
    }

    /// Insert a row boundary at frame `y`.
    ///
    /// Returns the new boundary's index, or `None` when `y` is outside the
    /// outline or too close to an existing boundary.
    pub fn insert_row(&mut self, y: f32) -> Option<usize> {
        if !self.inside_rows(y) {
            return None;
        }
        insert_boundary(&mut self.rows, y)
    }

    /// Insert a column boundary at frame `x`
    pub fn insert_column(&mut self, x: f32) -> Option<usize> {
        if !self.inside_columns(x) {
            return None;
        }
        insert_boundary(&mut self.columns, x)
    }

    /// Move row `index` to frame `y`, clamped inside the outline.
    ///
    /// Rows stay sorted, so the boundary may change index; the new index is
    /// returned. A target too close to another boundary leaves the row
    /// where it was and returns `None`.
    pub fn move_row(&mut self, index: usize, y: f32) -> Option<usize> {
        if index >= self.rows.len() {
            return None;
        }
        let y = self.clamp_row(y);
        let original = self.rows.remove(index);
        match insert_boundary(&mut self.rows, y) {
            Some(at) => Some(at),
            None => {
                self.rows.insert(index, original);
                None
            }
        }
    }

    pub fn remove_row(&mut self, index: usize) -> Option<f32> {
        (index < self.rows.len()).then(|| self.rows.remove(index))
    }

    /// Cells as rectangles relative to the outline's top-left corner.
    ///
    /// Boundaries `[0] + rows + [height]` by `[0] + columns + [width]`.
    pub fn cell_grid(&self) -> CellGrid<Rect> {
        let rows = relative_boundaries(&self.rows, self.outline.top, self.outline.height());
        let columns =
            relative_boundaries(&self.columns, self.outline.left, self.outline.width());
        rows.windows(2)
            .map(|row| {
                columns
                    .windows(2)
                    .map(|column| Rect::new(column[0], row[0], column[1], row[1]))
                    .collect()
            })
            .collect()
    }

    /// Backend representation
    pub fn to_record(&self) -> TableRecord {
        let relative = |values: &[f32], origin: f32| {
            values
                .iter()
                .map(|value| (value - origin).round() as i32)
                .collect()
        };
        TableRecord {
            outline: OutlineRecord {
                top_left: PointRecord::from(Point::new(self.outline.left, self.outline.top)),
                bottom_right: PointRecord::from(Point::new(
                    self.outline.right,
                    self.outline.bottom,
                )),
            },
            rows: relative(&self.rows, self.outline.top),
            columns: relative(&self.columns, self.outline.left),
            rotation_degrees: self.rotation.degrees(),
        }
    }

    /// Build a table from its backend representation.
    ///
    /// Boundaries outside the outline are dropped.
    pub fn from_record(id: TableId, record: &TableRecord) -> Self {
        let outline = Rect::from_corners(
            record.outline.top_left.into(),
            record.outline.bottom_right.into(),
        );
        let mut table = TableOutline::new(id, outline, Rotation::new(record.rotation_degrees));
        for row in &record.rows {
            table.insert_row(outline.top + *row as f32);
        }
        for column in &record.columns {
            table.insert_column(outline.left + *column as f32);
        }
        table
    }
}

fn insert_boundary(boundaries: &mut Vec<f32>, value: f32) -> Option<usize> {
    if boundaries
        .iter()
        .any(|existing| (existing - value).abs() < MIN_BOUNDARY_GAP)
    {
        return None;
    }
    let at = boundaries.partition_point(|existing| *existing < value);
    boundaries.insert(at, value);
    Some(at)
}

fn relative_boundaries(boundaries: &[f32], origin: f32, extent: f32) -> Vec<f32> {
    std::iter::once(0.0)
        .chain(boundaries.iter().map(|value| value - origin))
        .chain(std::iter::once(extent))
        .collect()
}

/// Table as exchanged with the backend. Boundaries are integer offsets
/// from the outline's top/left edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRecord {
    pub outline: OutlineRecord,
    #[serde(default)]
    pub rows: Vec<i32>,
    #[serde(default)]
    pub columns: Vec<i32>,
    #[serde(default)]
    pub rotation_degrees: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineRecord {
    pub top_left: PointRecord,
    pub bottom_right: PointRecord,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: i32,
    pub y: i32,
}

impl From<Point> for PointRecord {
    fn from(point: Point) -> Self {
        Self {
            x: point.x.round() as i32,
            y: point.y.round() as i32,
        }
    }
}

impl From<PointRecord> for Point {
    fn from(record: PointRecord) -> Self {
        Point::new(record.x as f32, record.y as f32)
    }
}
