//! Core application module
//!
//! This module contains:
//! - The application state and its update function
//! - The effect runtime executing backend requests
//! - Route-derived asset paths

pub mod app;
pub mod route;
pub mod runtime;
