//! Pure domain types with minimal dependencies
//!
//! Types here carry no I/O, rendering or runtime concerns.

pub mod cells;
pub mod geometry;
pub mod page;
pub mod rotation;
pub mod selection;
pub mod table;

pub use geometry::*;
pub use page::*;
pub use rotation::*;
pub use selection::*;
pub use table::*;
