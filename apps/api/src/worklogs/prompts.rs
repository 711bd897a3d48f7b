// Prompt constants for work report parsing.

/// System prompt for work report parsing. Append `JSON_ONLY_SYSTEM`.
pub const WORK_REPORT_SYSTEM: &str = "You are an assistant for a project planning tool. \
    Parse a team member's free-text work report into structured entries. \
    Match every project mentioned to one of the valid project names you are given. \
    When a name is ambiguous or missing from the list, pick the most likely valid project.";

/// Work report prompt template.
/// Replace: {project_names}, {context}, {report_text}
pub const WORK_REPORT_PROMPT_TEMPLATE: &str = r#"Parse the following work report into a JSON array.

The report describes {context} work.

VALID PROJECT NAMES: [{project_names}]

WORK REPORT:
"""
{report_text}
"""

RULES:
- One entry per task. Split a sentence that mentions several projects.
- "hours" is a non-negative number of hours.
- "projectName" must be one of the valid project names.

Return a JSON array with this EXACT schema (no extra fields):
[
  { "projectName": "string", "task": "string", "hours": 0.0 }
]"#;
