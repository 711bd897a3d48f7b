pub mod evaluation;
pub mod person;
pub mod project;
pub mod worklog;
