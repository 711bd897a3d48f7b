//! Evaluation drafting: metrics-backed drafts and generated comments.
//!
//! Flow: get_or_draft_evaluation → (manager edits scores) → generate_monthly_report
//!       → apply_monthly_report → save. Annual reports summarise a year of
//!       stored evaluations in free text.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::evaluation::prompts::{
    ANNUAL_MONTH_ENTRY_TEMPLATE, ANNUAL_REPORT_PROMPT_TEMPLATE, ANNUAL_REPORT_SYSTEM,
    MONTHLY_REPORT_PROMPT_TEMPLATE, MONTHLY_REPORT_SYSTEM, NO_ANNUAL_DATA_MESSAGE,
};
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, KOREAN_OUTPUT_INSTRUCTION};
use crate::llm_client::{GenerationOptions, LlmClient};
use crate::metrics::evaluation_metrics;
use crate::models::evaluation::{
    uniform_criteria, Evaluation, EvaluationCriterion, EvaluationStatus, NEUTRAL_SCORE,
};
use crate::month::{month_bounds, parse_month};
use crate::store::{PlanningStore, WorklogQuery};

/// Temperature of the annual report call.
const ANNUAL_REPORT_TEMPERATURE: f32 = 0.6;

// ────────────────────────────────────────────────────────────────────────────
// Drafts
// ────────────────────────────────────────────────────────────────────────────

/// Returns the stored evaluation of `user_id` for `month`, or a fresh draft.
///
/// A draft carries metrics computed from the monthly plan and the month's
/// worklogs, a neutral score on every criterion and no comments. It is not saved.
pub async fn get_or_draft_evaluation(
    store: &dyn PlanningStore,
    user_id: &str,
    month: &str,
) -> Result<Evaluation, AppError> {
    let month_start = parse_month(month)
        .ok_or_else(|| AppError::Validation(format!("month '{month}' is not a YYYY-MM month")))?;

    if let Some(stored) = store.get_evaluation(user_id, month).await? {
        return Ok(stored);
    }

    let (start, end) = month_bounds(month_start);
    let projects = store.list_projects().await?;
    let worklogs = store
        .list_worklogs(&WorklogQuery {
            user_id: Some(user_id.to_string()),
            start,
            end,
        })
        .await?;

    Ok(Evaluation {
        id: Evaluation::id_for(user_id, month),
        user_id: user_id.to_string(),
        month: month.to_string(),
        status: EvaluationStatus::Draft,
        metrics: evaluation_metrics(&projects, month, user_id, &worklogs),
        criteria: uniform_criteria(NEUTRAL_SCORE),
        final_comment: String::new(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Monthly report
// ────────────────────────────────────────────────────────────────────────────

/// Model output before validation. Unknown criterion keys are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMonthlyReport {
    #[serde(default)]
    criteria_comments: HashMap<String, String>,
    #[serde(default)]
    final_comment: Option<String>,
}

/// Generated comments: one per criterion plus a final summary.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyReport {
    pub criteria_comments: BTreeMap<EvaluationCriterion, String>,
    pub final_comment: String,
}

pub fn build_monthly_report_prompt(evaluation: &Evaluation, user_name: &str) -> String {
    let criteria_scores = EvaluationCriterion::ALL
        .iter()
        .map(|c| {
            let score = evaluation.criteria.get(c).map_or(0.0, |s| s.score);
            format!("- {} ({}): {}/5", c.label(), c.key(), score)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let criteria_schema = EvaluationCriterion::ALL
        .iter()
        .map(|c| format!("    \"{}\": \"comment on {}\"", c.key(), c.label()))
        .collect::<Vec<_>>()
        .join(",\n");

    MONTHLY_REPORT_PROMPT_TEMPLATE
        .replace("{user_name}", user_name)
        .replace("{month}", &evaluation.month)
        .replace("{criteria_scores}", &criteria_scores)
        .replace("{criteria_schema}", &criteria_schema)
        .replace("{language_instruction}", KOREAN_OUTPUT_INSTRUCTION)
}

/// Checks that the model wrote a non-blank comment for every criterion and a final comment.
fn validate_monthly_report(raw: RawMonthlyReport) -> Result<MonthlyReport, String> {
    let mut criteria_comments = BTreeMap::new();
    for criterion in EvaluationCriterion::ALL {
        let comment = raw
            .criteria_comments
            .get(criterion.key())
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| format!("no comment for criterion '{}'", criterion.key()))?;
        criteria_comments.insert(criterion, comment.to_string());
    }

    let final_comment = raw
        .final_comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| "no final comment".to_string())?
        .to_string();

    Ok(MonthlyReport {
        criteria_comments,
        final_comment,
    })
}

/// Parses and validates a model response to the monthly report prompt.
pub fn parse_monthly_report(text: &str) -> Result<MonthlyReport, AppError> {
    let raw: RawMonthlyReport = crate::llm_client::parse_json_output(text)
        .map_err(|e| AppError::Llm(format!("Monthly report was not valid JSON: {e}")))?;
    validate_monthly_report(raw)
        .map_err(|e| AppError::Llm(format!("Monthly report incomplete: {e}")))
}

/// Asks the model for comments on `evaluation` as currently scored.
pub async fn generate_monthly_report(
    llm: &LlmClient,
    evaluation: &Evaluation,
    user_name: &str,
) -> Result<MonthlyReport, AppError> {
    let prompt = build_monthly_report_prompt(evaluation, user_name);
    let system = format!("{MONTHLY_REPORT_SYSTEM} {JSON_ONLY_SYSTEM}");
    let text = llm
        .call_text(&prompt, &system, GenerationOptions::json())
        .await
        .map_err(|e| AppError::Llm(format!("Monthly report LLM call failed: {e}")))?;
    let report = parse_monthly_report(&text)?;
    info!(
        "Drafted monthly comments for {} {}",
        evaluation.user_id, evaluation.month
    );
    Ok(report)
}

/// Copies generated comments into `evaluation`, keeping its scores.
pub fn apply_monthly_report(mut evaluation: Evaluation, report: MonthlyReport) -> Evaluation {
    for (criterion, comment) in report.criteria_comments {
        if let Some(entry) = evaluation.criteria.get_mut(&criterion) {
            entry.comment = comment;
        }
    }
    evaluation.final_comment = report.final_comment;
    evaluation
}

// ────────────────────────────────────────────────────────────────────────────
// Annual report
// ────────────────────────────────────────────────────────────────────────────

pub fn build_annual_report_prompt(
    evaluations: &[Evaluation],
    user_name: &str,
    year: i32,
) -> String {
    let monthly_summaries = evaluations
        .iter()
        .map(|e| {
            ANNUAL_MONTH_ENTRY_TEMPLATE
                .replace("{month}", &e.month)
                .replace("{average_score}", &format!("{:.1}", e.average_score()))
                .replace("{final_comment}", &e.final_comment)
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    ANNUAL_REPORT_PROMPT_TEMPLATE
        .replace("{user_name}", user_name)
        .replace("{year}", &year.to_string())
        .replace("{monthly_summaries}", &monthly_summaries)
        .replace("{language_instruction}", KOREAN_OUTPUT_INSTRUCTION)
}

/// Writes the annual report for `user_name` from the year's evaluations.
///
/// With no evaluations the fixed no-data message is returned and the model is not called.
pub async fn generate_annual_report(
    llm: &LlmClient,
    evaluations: &[Evaluation],
    user_name: &str,
    year: i32,
) -> Result<String, AppError> {
    if evaluations.is_empty() {
        return Ok(NO_ANNUAL_DATA_MESSAGE.to_string());
    }

    let prompt = build_annual_report_prompt(evaluations, user_name, year);
    let report = llm
        .call_text(
            &prompt,
            ANNUAL_REPORT_SYSTEM,
            GenerationOptions::report(ANNUAL_REPORT_TEMPERATURE),
        )
        .await
        .map_err(|e| AppError::Llm(format!("Annual report LLM call failed: {e}")))?;
    info!(
        "Generated annual report for {} from {} evaluations",
        user_name,
        evaluations.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::{date, worklog};
    use crate::models::evaluation::{CriterionScore, EvaluationMetrics};
    use crate::store::MemoryPlanningStore;

    fn evaluation(month: &str, score: f64, final_comment: &str) -> Evaluation {
        Evaluation {
            id: Evaluation::id_for("u-1", month),
            user_id: "u-1".to_string(),
            month: month.to_string(),
            status: EvaluationStatus::Confirmed,
            metrics: EvaluationMetrics::default(),
            criteria: uniform_criteria(score),
            final_comment: final_comment.to_string(),
        }
    }

    fn full_response() -> serde_json::Value {
        let comments: serde_json::Map<String, serde_json::Value> = EvaluationCriterion::ALL
            .iter()
            .map(|c| (c.key().to_string(), serde_json::json!(format!("{} 좋음", c.label()))))
            .collect();
        serde_json::json!({
            "criteriaComments": comments,
            "finalComment": "전반적으로 우수합니다."
        })
    }

    #[test]
    fn test_monthly_prompt_lists_every_criterion_with_score() {
        let mut eval = evaluation("2025-03", 3.0, "");
        eval.criteria.insert(
            EvaluationCriterion::Collaboration,
            CriterionScore {
                score: 4.5,
                comment: String::new(),
            },
        );
        let prompt = build_monthly_report_prompt(&eval, "Ko Eunyoung");

        assert!(prompt.contains("'Ko Eunyoung'"));
        assert!(prompt.contains("2025-03"));
        assert!(prompt.contains("4.5/5"));
        for criterion in EvaluationCriterion::ALL {
            assert!(prompt.contains(criterion.label()));
            assert!(prompt.contains(&format!("\"{}\"", criterion.key())));
        }
        assert!(!prompt.contains("{user_name}"));
    }

    #[test]
    fn test_complete_monthly_response_is_accepted() {
        let report = parse_monthly_report(&full_response().to_string()).unwrap();
        assert_eq!(report.criteria_comments.len(), EvaluationCriterion::ALL.len());
        assert_eq!(report.final_comment, "전반적으로 우수합니다.");
    }

    #[test]
    fn test_monthly_response_missing_a_criterion_is_rejected() {
        let mut response = full_response();
        response["criteriaComments"]
            .as_object_mut()
            .unwrap()
            .remove("cultureFit");
        let err = parse_monthly_report(&response.to_string()).unwrap_err();
        assert!(err.to_string().contains("cultureFit"));
    }

    #[test]
    fn test_monthly_response_with_blank_fields_is_rejected() {
        let mut blank_comment = full_response();
        blank_comment["criteriaComments"]["teamwork"] = serde_json::json!("ignored");
        blank_comment["criteriaComments"]["development"] = serde_json::json!("   ");
        assert!(parse_monthly_report(&blank_comment.to_string()).is_err());

        let mut blank_final = full_response();
        blank_final["finalComment"] = serde_json::json!("");
        assert!(parse_monthly_report(&blank_final.to_string()).is_err());
    }

    #[test]
    fn test_fenced_monthly_response_is_accepted() {
        let fenced = format!("```json\n{}\n```", full_response());
        assert!(parse_monthly_report(&fenced).is_ok());
    }

    #[test]
    fn test_apply_report_keeps_scores_and_fills_comments() {
        let report = parse_monthly_report(&full_response().to_string()).unwrap();
        let applied = apply_monthly_report(evaluation("2025-03", 4.0, ""), report);
        let entry = &applied.criteria[&EvaluationCriterion::WorkPerformance];
        assert_eq!(entry.score, 4.0);
        assert!(!entry.comment.is_empty());
        assert_eq!(applied.final_comment, "전반적으로 우수합니다.");
    }

    #[test]
    fn test_annual_prompt_summarises_each_month() {
        let evaluations = vec![
            evaluation("2025-01", 3.0, "steady start"),
            evaluation("2025-02", 4.5, "strong delivery"),
        ];
        let prompt = build_annual_report_prompt(&evaluations, "Ko Eunyoung", 2025);
        assert!(prompt.contains("### 2025-01"));
        assert!(prompt.contains("Average Score: 3.0/5.0"));
        assert!(prompt.contains("Average Score: 4.5/5.0"));
        assert!(prompt.contains("\"strong delivery\""));
        assert!(prompt.contains("the year 2025"));
    }

    #[tokio::test]
    async fn test_annual_report_without_evaluations_skips_the_model() {
        // nothing listens here, so any call would fail
        let llm = LlmClient::new("unused".to_string())
            .unwrap()
            .with_base_url("http://127.0.0.1:9/models");
        let report = generate_annual_report(&llm, &[], "Ko Eunyoung", 2025)
            .await
            .unwrap();
        assert_eq!(report, NO_ANNUAL_DATA_MESSAGE);
    }

    #[tokio::test]
    async fn test_draft_has_neutral_scores_and_computed_metrics() {
        let store = MemoryPlanningStore::seeded();
        let mut unsaved = worklog("u-1", "p-1", date(2025, 2, 4), 8.0, 48.0);
        unsaved.id = "new-1".to_string();
        store.upsert_worklogs(vec![unsaved]).await.unwrap();

        let draft = get_or_draft_evaluation(&store, "u-1", "2025-02").await.unwrap();
        assert_eq!(draft.id, "eval-u-1-2025-02");
        assert_eq!(draft.status, EvaluationStatus::Draft);
        assert!(draft.criteria.values().all(|c| c.score == NEUTRAL_SCORE));
        assert!(draft.criteria.values().all(|c| c.comment.is_empty()));
        assert!((draft.metrics.plan_mm - 0.6).abs() < 1e-9);
        assert!((draft.metrics.actual_mm - 0.3).abs() < 1e-9);
        assert!((draft.metrics.pa - 50.0).abs() < 1e-9);
        // drafts are not persisted
        assert!(store.get_evaluation("u-1", "2025-02").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stored_evaluation_wins_over_draft() {
        let store = MemoryPlanningStore::seeded();
        store
            .save_evaluation(evaluation("2025-02", 4.0, "saved"))
            .await
            .unwrap();
        let found = get_or_draft_evaluation(&store, "u-1", "2025-02").await.unwrap();
        assert_eq!(found.final_comment, "saved");
    }

    #[tokio::test]
    async fn test_draft_rejects_bad_month() {
        let store = MemoryPlanningStore::seeded();
        let result = get_or_draft_evaluation(&store, "u-1", "Feb 2025").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
