//! View-level components of the annotator
//!
//! Pointer events hit the row knobs first, then the page image.

pub mod event;
pub mod ocr_correction;
pub mod page_image;
pub mod row_knobs;
