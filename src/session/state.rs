//! The annotation store: single source of truth for one page view.
//!
//! Fields are private; the methods below are the only way to change them,
//! and each one leaves the store consistent:
//! - a row selection always points at an existing row of the selected table
//! - the document position is written at most once
//! - outlining only starts or completes while no table is selected

use crate::domain::{
    DocumentPosition, Interaction, PageImage, Point, Rect, Rotation, Selection, TableId,
    TableOutline, TableRecord,
};
use crate::render::geometry::{ViewTransform, document_to_frame};

/// Outlines narrower or shorter than this (frame pixels) are not created
pub const MIN_OUTLINE_EXTENT: f32 = 2.0;

/// Result of routing a click through [`AnnotationStore::outline_table`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutlineStep {
    /// First corner anchored, in document space
    Started { anchor: Point },
    /// Second corner placed; the new table is selected
    Completed(TableId),
    /// The document position has not been measured yet
    NotReady,
    /// A table is selected, or the outline would be empty
    Ignored,
}

#[derive(Clone, Debug)]
pub struct AnnotationStore {
    page: PageImage,
    document_position: Option<DocumentPosition>,
    rotation: Rotation,
    tables: Vec<TableOutline>,
    interaction: Interaction,
    next_table_id: u64,
}

impl AnnotationStore {
    pub fn new(page: PageImage) -> Self {
        Self {
            page,
            document_position: None,
            rotation: Rotation::ZERO,
            tables: Vec::new(),
            interaction: Interaction::Idle,
            next_table_id: 1,
        }
    }

    pub fn page(&self) -> &PageImage {
        &self.page
    }

    pub fn document_position(&self) -> Option<DocumentPosition> {
        self.document_position
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn tables(&self) -> &[TableOutline] {
        &self.tables
    }

    pub fn table(&self, id: TableId) -> Option<&TableOutline> {
        self.tables.iter().find(|table| table.id == id)
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn selection(&self) -> Selection {
        self.interaction.selection()
    }

    pub fn selected_table(&self) -> Option<TableId> {
        self.selection().table()
    }

    pub fn selected_row(&self) -> Option<usize> {
        self.selection().row()
    }

    pub fn selected_table_outline(&self) -> Option<&TableOutline> {
        self.selected_table().and_then(|id| self.table(id))
    }

    /// Screen/document mapping, `None` until the page has been measured
    pub fn view_transform(&self) -> Option<ViewTransform> {
        self.document_position
            .map(|position| ViewTransform::new(position, self.rotation, self.page.size()))
    }

    /// Record where the page image was laid out. First measurement wins.
    pub fn set_document_position(&mut self, position: DocumentPosition) -> bool {
        if self.document_position.is_some() {
            log::debug!("Ignoring document position {position:?}, already measured");
            return false;
        }
        self.document_position = Some(position);
        true
    }

    /// Start or complete a table outline at a pointer position.
    pub fn outline_table(&mut self, screen: Point) -> OutlineStep {
        let Some(transform) = self.view_transform() else {
            log::debug!("Outline click before the page was measured");
            return OutlineStep::NotReady;
        };
        let document = transform.to_document(screen);

        match self.interaction {
            Interaction::Selected { .. } => {
                log::debug!("Outline click while a table is selected, ignoring");
                OutlineStep::Ignored
            }
            Interaction::Idle => {
                self.interaction = Interaction::Outlining { anchor: document };
                OutlineStep::Started { anchor: document }
            }
            Interaction::Outlining { anchor } => {
                let pivot = self.page.center();
                let outline = Rect::from_corners(
                    document_to_frame(anchor, self.rotation, pivot),
                    document_to_frame(document, self.rotation, pivot),
                );
                if outline.width() < MIN_OUTLINE_EXTENT || outline.height() < MIN_OUTLINE_EXTENT {
                    log::debug!("Outline {outline:?} too small, keep outlining");
                    return OutlineStep::Ignored;
                }
                let id = self.allocate_id();
                self.tables
                    .push(TableOutline::new(id, outline, self.rotation));
                self.interaction = Interaction::Selected {
                    table: id,
                    row: None,
                };
                log::info!("Outlined {id} at {outline:?}");
                OutlineStep::Completed(id)
            }
        }
    }

    /// Abandon a half-drawn outline
    pub fn cancel_outline(&mut self) -> bool {
        if self.interaction.is_outlining() {
            self.interaction = Interaction::Idle;
            true
        } else {
            false
        }
    }

    /// Select a table, or clear the selection (including any row) with `None`
    pub fn select_table(&mut self, table: Option<TableId>) -> bool {
        match table {
            None => {
                self.interaction = Interaction::Idle;
                true
            }
            Some(id) if self.table(id).is_some() => {
                self.interaction = Interaction::Selected {
                    table: id,
                    row: None,
                };
                true
            }
            Some(id) => {
                log::debug!("Cannot select unknown {id}");
                false
            }
        }
    }

    /// Toggle the selection of row `index` of the selected table
    pub fn select_row(&mut self, index: usize) -> bool {
        let Interaction::Selected { table, row } = self.interaction else {
            log::debug!("Row {index} clicked without a selected table");
            return false;
        };
        let in_bounds = self
            .table(table)
            .is_some_and(|outline| index < outline.rows().len());
        if !in_bounds {
            log::debug!("Row {index} out of bounds for {table}");
            return false;
        }
        let row = if row == Some(index) { None } else { Some(index) };
        self.interaction = Interaction::Selected { table, row };
        true
    }

    /// Turn the page display by `delta` degrees
    pub fn rotate(&mut self, delta: f32) {
        self.rotation = self.rotation.rotated_by(delta);
    }

    /// Map a pointer position into the frame of the selected table
    fn selected_frame_point(&self, screen: Point) -> Option<(TableId, Point)> {
        let transform = self.view_transform()?;
        let table = self.selected_table_outline()?;
        let document = transform.to_document(screen);
        Some((
            table.id,
            document_to_frame(document, table.rotation, self.page.center()),
        ))
    }

    fn selected_table_mut(&mut self) -> Option<&mut TableOutline> {
        let id = self.selected_table()?;
        self.tables.iter_mut().find(|table| table.id == id)
    }

    /// Insert a row boundary of the selected table at frame `y`.
    ///
    /// A selected row keeps pointing at the same boundary.
    pub fn insert_row_at(&mut self, y: f32) -> Option<usize> {
        let Interaction::Selected { table, row } = self.interaction else {
            return None;
        };
        let index = self.selected_table_mut()?.insert_row(y)?;
        let row = row.map(|selected| if index <= selected { selected + 1 } else { selected });
        self.interaction = Interaction::Selected { table, row };
        Some(index)
    }

    /// Insert a row boundary of the selected table under the pointer
    pub fn add_row(&mut self, screen: Point) -> Option<usize> {
        let (_, frame) = self.selected_frame_point(screen)?;
        self.insert_row_at(frame.y)
    }

    /// Insert a column boundary of the selected table under the pointer
    pub fn add_column(&mut self, screen: Point) -> Option<usize> {
        let (_, frame) = self.selected_frame_point(screen)?;
        self.selected_table_mut()?.insert_column(frame.x)
    }

    /// Drag row `index` of the selected table to the pointer; the dragged
    /// row becomes the selected row.
    pub fn move_row(&mut self, index: usize, screen: Point) -> Option<usize> {
        let (table, frame) = self.selected_frame_point(screen)?;
        let moved = self.selected_table_mut()?.move_row(index, frame.y)?;
        self.interaction = Interaction::Selected {
            table,
            row: Some(moved),
        };
        Some(moved)
    }

    /// Remove the selected row boundary, keeping the table selected
    pub fn delete_selected_row(&mut self) -> bool {
        let Interaction::Selected {
            table,
            row: Some(row),
        } = self.interaction
        else {
            return false;
        };
        let removed = self
            .selected_table_mut()
            .and_then(|outline| outline.remove_row(row))
            .is_some();
        self.interaction = Interaction::Selected { table, row: None };
        removed
    }

    /// Replace all tables with the backend's records; clears the selection
    pub fn load_tables(&mut self, records: &[TableRecord]) {
        self.reset_tables();
        for record in records {
            let id = self.allocate_id();
            self.tables.push(TableOutline::from_record(id, record));
        }
        log::info!("Loaded {} tables for {}", self.tables.len(), self.page.name);
    }

    /// Drop every table, e.g. when navigating away from the page
    pub fn reset_tables(&mut self) {
        self.tables.clear();
        self.interaction = Interaction::Idle;
    }

    pub fn table_records(&self) -> Vec<TableRecord> {
        self.tables.iter().map(TableOutline::to_record).collect()
    }

    fn allocate_id(&mut self) -> TableId {
        let id = TableId(self.next_table_id);
        self.next_table_id += 1;
        id
    }
}
