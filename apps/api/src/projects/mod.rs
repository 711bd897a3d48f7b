//! Project list, creation and editing.

pub mod handlers;
