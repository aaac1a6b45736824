//! Geometry and raster rendering
//!
//! This module contains:
//! - Coordinate transforms and positioning constants shared by pointer
//!   handling, knob layout and image work
//! - Raster operations on page images and the annotation overlay

pub mod geometry;
pub mod image;
