//! Message types for the annotator
//!
//! This module contains:
//! - Msg enum with nested sub-enums for organized message handling
//! - Shorthand constructors used by shortcuts and the replay driver

use crate::domain::{DocumentPosition, PageImage, TableRecord};
use crate::ocr::{CellKey, OcrDataPoint};
use crate::widget::event::{Modifiers, PointerEvent};
use crate::widget::ocr_correction::ViewId;

use super::shortcuts::Key;

// ============================================================================
// Page View Messages
// ============================================================================

/// Lifecycle of the page image view
#[derive(Debug, Clone)]
pub enum PageMsg {
    /// Show a page with no tables
    Mount(PageImage),
    /// The page image has been laid out at this screen position
    Measured(DocumentPosition),
    /// Replace the page's tables with the ones saved on the backend
    LoadTables,
    /// Navigate away; tables and selection are dropped
    Unmount,
}

// ============================================================================
// Table Editing Messages
// ============================================================================

#[derive(Debug, Clone)]
pub enum TableMsg {
    /// Turn the page by this many degrees
    Rotate(f32),
    /// Abandon a half-drawn outline
    CancelOutline,
    /// Clear table and row selection
    Deselect,
    /// Remove the selected row boundary
    DeleteSelectedRow,
    /// Add a row boundary at the last pointer position
    AddRowAtPointer,
    /// Snap a new row boundary below the last one using the page raster
    PredictNextRow,
    /// Push the page's tables to the backend
    Save,
}

// ============================================================================
// OCR Correction Messages
// ============================================================================

#[derive(Debug, Clone)]
pub enum OcrMsg {
    /// Open the correction view
    Mount,
    /// Close the correction view
    Unmount,
    /// Data points arrived for the view that requested them
    Loaded {
        view: ViewId,
        result: Result<Vec<OcrDataPoint>, String>,
    },
    /// Local edit of a cell transcription
    Edit { key: CellKey, text: String },
    /// Try again after a failed load
    Retry,
}

// ============================================================================
// Backend Responses
// ============================================================================

#[derive(Debug, Clone)]
pub enum BackendMsg {
    TablesLoaded {
        image: String,
        result: Result<Vec<TableRecord>, String>,
    },
    TablesStored {
        image: String,
        result: Result<String, String>,
    },
    ImagesListed(Result<Vec<PageImage>, String>),
}

// ============================================================================
// Main Message Enum
// ============================================================================

#[derive(Debug, Clone)]
pub enum Msg {
    Page(PageMsg),
    /// Pointer input over the page view
    Pointer(PointerEvent),
    /// Keyboard input, mapped through the shortcut table
    Key(Key, Modifiers),
    Table(TableMsg),
    Ocr(OcrMsg),
    Backend(BackendMsg),
    /// Refresh the list of page images
    ListImages,
    /// Several messages handled in order as one event
    Batch(Vec<Msg>),
}

impl Msg {
    pub fn mount(page: PageImage) -> Self {
        Msg::Page(PageMsg::Mount(page))
    }

    pub fn measured(position: DocumentPosition) -> Self {
        Msg::Page(PageMsg::Measured(position))
    }

    pub fn rotate(degrees: f32) -> Self {
        Msg::Table(TableMsg::Rotate(degrees))
    }

    pub fn cancel_outline() -> Self {
        Msg::Table(TableMsg::CancelOutline)
    }

    pub fn deselect() -> Self {
        Msg::Table(TableMsg::Deselect)
    }

    pub fn delete_selected_row() -> Self {
        Msg::Table(TableMsg::DeleteSelectedRow)
    }

    pub fn add_row_at_pointer() -> Self {
        Msg::Table(TableMsg::AddRowAtPointer)
    }

    pub fn predict_next_row() -> Self {
        Msg::Table(TableMsg::PredictNextRow)
    }

    pub fn save() -> Self {
        Msg::Table(TableMsg::Save)
    }
}
