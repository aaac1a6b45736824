//! Page annotation session
//!
//! This module contains:
//! - The annotation store, the single source of truth for one page view
//! - Message types for page, table, OCR and backend events
//! - Keyboard shortcut mapping

pub mod messages;
pub mod shortcuts;
pub mod state;
