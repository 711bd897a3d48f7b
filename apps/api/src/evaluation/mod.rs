//! Monthly evaluations: metric-backed drafts, generated comments and annual reports.

pub mod generator;
pub mod handlers;
pub mod prompts;
