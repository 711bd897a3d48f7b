use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::worklog::Worklog;
use crate::state::AppState;
use crate::store::WorklogQuery;
use crate::worklogs::report_parser::{parse_work_report, ParsedWorkEntry, ReportContext};

#[derive(Deserialize)]
pub struct WorklogListQuery {
    pub user_id: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// GET /api/v1/worklogs
pub async fn handle_list_worklogs(
    State(state): State<AppState>,
    Query(params): Query<WorklogListQuery>,
) -> Result<Json<Vec<Worklog>>, AppError> {
    if params.end < params.start {
        return Err(AppError::Validation(format!(
            "end {} is before start {}",
            params.end, params.start
        )));
    }
    let query = WorklogQuery {
        user_id: params.user_id,
        start: params.start,
        end: params.end,
    };
    Ok(Json(state.store.list_worklogs(&query).await?))
}

/// POST /api/v1/worklogs
///
/// Saves a batch of timesheet rows. Rows with an empty or `new-` id are created.
pub async fn handle_upsert_worklogs(
    State(state): State<AppState>,
    Json(worklogs): Json<Vec<Worklog>>,
) -> Result<Json<Vec<Worklog>>, AppError> {
    for worklog in &worklogs {
        worklog.validate().map_err(AppError::Validation)?;
    }
    let count = worklogs.len();
    let saved = state.store.upsert_worklogs(worklogs).await?;
    info!("Saved {count} worklogs");
    Ok(Json(saved))
}

#[derive(Deserialize)]
pub struct ParseReportRequest {
    pub text: String,
    #[serde(default)]
    pub context: ReportContext,
}

#[derive(Serialize)]
pub struct ParseReportResponse {
    pub entries: Vec<ParsedWorkEntry>,
}

/// POST /api/v1/worklogs/parse
pub async fn handle_parse_report(
    State(state): State<AppState>,
    Json(req): Json<ParseReportRequest>,
) -> Result<Json<ParseReportResponse>, AppError> {
    let projects: Vec<_> = state
        .store
        .list_projects()
        .await?
        .into_iter()
        .filter(|p| p.is_active())
        .collect();
    let entries = parse_work_report(&state.llm, &req.text, &projects, req.context).await?;
    Ok(Json(ParseReportResponse { entries }))
}
