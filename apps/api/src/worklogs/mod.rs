//! Timesheet rows: listing, saving, and turning free-text work reports into rows.

pub mod handlers;
pub mod prompts;
pub mod report_parser;
