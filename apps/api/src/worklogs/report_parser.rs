//! Report parser: turns a free-text work report into per-project hour entries.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LlmClient;
use crate::models::project::Project;
use crate::worklogs::prompts::{WORK_REPORT_PROMPT_TEMPLATE, WORK_REPORT_SYSTEM};

/// Whether the reported hours are planned or already spent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportContext {
    Plan,
    #[default]
    Actual,
}

impl ReportContext {
    fn describe(self) -> &'static str {
        match self {
            ReportContext::Plan => "planned (upcoming)",
            ReportContext::Actual => "completed",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    project_name: String,
    #[serde(default)]
    task: String,
    hours: f64,
}

/// One parsed entry. `project_id` is `None` when the name matched no project.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedWorkEntry {
    pub project_name: String,
    pub project_id: Option<String>,
    pub task: String,
    pub hours: f64,
}

pub fn build_work_report_prompt(text: &str, projects: &[Project], context: ReportContext) -> String {
    let names = projects
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    WORK_REPORT_PROMPT_TEMPLATE
        .replace("{project_names}", &names)
        .replace("{context}", context.describe())
        .replace("{report_text}", text.trim())
}

fn resolve_entries(raw: Vec<RawEntry>, projects: &[Project]) -> Result<Vec<ParsedWorkEntry>, String> {
    raw.into_iter()
        .map(|entry| {
            if !entry.hours.is_finite() || entry.hours < 0.0 {
                return Err(format!(
                    "entry '{}' has invalid hours {}",
                    entry.project_name, entry.hours
                ));
            }
            let wanted = entry.project_name.trim().to_lowercase();
            let project_id = projects
                .iter()
                .find(|p| p.name.trim().to_lowercase() == wanted)
                .map(|p| p.id.clone());
            Ok(ParsedWorkEntry {
                project_name: entry.project_name,
                project_id,
                task: entry.task.trim().to_string(),
                hours: entry.hours,
            })
        })
        .collect()
}

/// Parses `text` into work entries against the given project list.
pub async fn parse_work_report(
    llm: &LlmClient,
    text: &str,
    projects: &[Project],
    context: ReportContext,
) -> Result<Vec<ParsedWorkEntry>, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Validation("work report text is empty".to_string()));
    }
    let prompt = build_work_report_prompt(text, projects, context);
    let system = format!("{WORK_REPORT_SYSTEM} {JSON_ONLY_SYSTEM}");
    let raw: Vec<RawEntry> = llm
        .call_json(&prompt, &system)
        .await
        .map_err(|e| AppError::Llm(format!("Work report parsing failed: {e}")))?;
    resolve_entries(raw, projects).map_err(|e| AppError::Llm(format!("Work report rejected: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::parse_json_output;
    use crate::store::fixtures::seed_projects;

    fn raw(json: &str) -> Vec<RawEntry> {
        parse_json_output(json).unwrap()
    }

    #[test]
    fn test_prompt_lists_projects_and_context() {
        let projects = seed_projects();
        let prompt = build_work_report_prompt("  did stuff  ", &projects, ReportContext::Plan);
        assert!(prompt.contains(&projects[0].name));
        assert!(prompt.contains("planned (upcoming)"));
        assert!(prompt.contains("\ndid stuff\n"));
        assert!(!prompt.contains("{report_text}"));
    }

    #[test]
    fn test_names_resolve_case_insensitively() {
        let projects = seed_projects();
        let name = projects[0].name.to_uppercase();
        let json = format!(r#"[{{"projectName":"{name}","task":" review ","hours":3.5}}]"#);
        let entries = resolve_entries(raw(&json), &projects).unwrap();
        assert_eq!(entries[0].project_id.as_deref(), Some(projects[0].id.as_str()));
        assert_eq!(entries[0].task, "review");
        assert_eq!(entries[0].hours, 3.5);
    }

    #[test]
    fn test_unknown_project_keeps_name_without_id() {
        let entries = resolve_entries(
            raw(r#"[{"projectName":"Side quest","task":"x","hours":1}]"#),
            &seed_projects(),
        )
        .unwrap();
        assert_eq!(entries[0].project_id, None);
        assert_eq!(entries[0].project_name, "Side quest");
    }

    #[test]
    fn test_negative_hours_are_rejected() {
        let result = resolve_entries(
            raw(r#"[{"projectName":"Alpha","task":"x","hours":-2}]"#),
            &seed_projects(),
        );
        assert!(result.unwrap_err().contains("invalid hours"));
    }

    #[test]
    fn test_context_wire_names() {
        let plan: ReportContext = serde_json::from_str(r#""plan""#).unwrap();
        assert_eq!(plan, ReportContext::Plan);
        assert_eq!(ReportContext::default(), ReportContext::Actual);
    }

    #[tokio::test]
    async fn test_empty_report_is_rejected_before_calling_the_service() {
        let llm = LlmClient::new("test-key".to_string())
            .unwrap()
            .with_base_url("http://127.0.0.1:9/models");
        let result = parse_work_report(&llm, "   ", &seed_projects(), ReportContext::Actual).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
