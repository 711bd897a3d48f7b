use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::evaluation::generator::{
    apply_monthly_report, generate_annual_report, generate_monthly_report,
    get_or_draft_evaluation,
};
use crate::models::evaluation::Evaluation;
use crate::models::person::Person;
use crate::state::AppState;
use crate::store::PlanningStore;

#[derive(Deserialize)]
pub struct YearQuery {
    pub year: i32,
}

#[derive(Serialize)]
pub struct AnnualReportResponse {
    pub report: String,
}

/// Roster entry of `user_id`, or 404.
async fn find_person(store: &dyn PlanningStore, user_id: &str) -> Result<Person, AppError> {
    store
        .list_people()
        .await?
        .into_iter()
        .find(|p| p.id == user_id)
        .ok_or_else(|| AppError::NotFound(format!("Person {user_id} not found")))
}

fn ensure_path_matches(
    evaluation: &Evaluation,
    user_id: &str,
    month: &str,
) -> Result<(), AppError> {
    if evaluation.user_id != user_id || evaluation.month != month {
        return Err(AppError::Validation(format!(
            "evaluation is for {} {}, not {user_id} {month}",
            evaluation.user_id, evaluation.month
        )));
    }
    Ok(())
}

/// GET /api/v1/evaluations/:user_id
pub async fn handle_list_evaluations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<YearQuery>,
) -> Result<Json<Vec<Evaluation>>, AppError> {
    let evaluations = state.store.list_evaluations(&user_id, params.year).await?;
    Ok(Json(evaluations))
}

/// GET /api/v1/evaluations/:user_id/:month
pub async fn handle_get_evaluation(
    State(state): State<AppState>,
    Path((user_id, month)): Path<(String, String)>,
) -> Result<Json<Evaluation>, AppError> {
    let evaluation = get_or_draft_evaluation(state.store.as_ref(), &user_id, &month).await?;
    Ok(Json(evaluation))
}

/// PUT /api/v1/evaluations/:user_id/:month
pub async fn handle_save_evaluation(
    State(state): State<AppState>,
    Path((user_id, month)): Path<(String, String)>,
    Json(mut evaluation): Json<Evaluation>,
) -> Result<Json<Evaluation>, AppError> {
    ensure_path_matches(&evaluation, &user_id, &month)?;
    evaluation.validate().map_err(AppError::Validation)?;
    evaluation.id = Evaluation::id_for(&user_id, &month);
    let saved = state.store.save_evaluation(evaluation).await?;
    Ok(Json(saved))
}

/// POST /api/v1/evaluations/:user_id/:month/draft-comments
///
/// Returns the posted evaluation with generated comments. Nothing is saved.
pub async fn handle_draft_comments(
    State(state): State<AppState>,
    Path((user_id, month)): Path<(String, String)>,
    Json(evaluation): Json<Evaluation>,
) -> Result<Json<Evaluation>, AppError> {
    ensure_path_matches(&evaluation, &user_id, &month)?;
    evaluation.validate().map_err(AppError::Validation)?;
    let person = find_person(state.store.as_ref(), &user_id).await?;
    let report = generate_monthly_report(&state.llm, &evaluation, &person.name).await?;
    Ok(Json(apply_monthly_report(evaluation, report)))
}

/// POST /api/v1/annual-reports/:user_id
pub async fn handle_annual_report(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<YearQuery>,
) -> Result<Json<AnnualReportResponse>, AppError> {
    let person = find_person(state.store.as_ref(), &user_id).await?;
    let evaluations = state.store.list_evaluations(&user_id, params.year).await?;
    let report = generate_annual_report(&state.llm, &evaluations, &person.name, params.year).await?;
    Ok(Json(AnnualReportResponse { report }))
}
