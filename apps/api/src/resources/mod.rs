//! Yearly resource matrix: row building, visibility and expansion state.

pub mod handlers;
pub mod loader;
pub mod matrix;
pub mod rows;
pub mod visibility;
