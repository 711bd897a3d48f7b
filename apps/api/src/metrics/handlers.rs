use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::errors::AppError;
use crate::metrics::dashboard::{load_dashboard, DashboardData, DashboardScope};
use crate::metrics::my_work::{load_my_work_summary, MyWorkSummary};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct MyWorkQuery {
    pub user_id: String,
    pub month: String,
    /// Any day of the week to summarise. Defaults to today.
    pub week_of: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub scope: DashboardScope,
    pub user_id: String,
    pub month: String,
    pub today: Option<NaiveDate>,
}

/// GET /api/v1/my-work/summary
pub async fn handle_my_work_summary(
    State(state): State<AppState>,
    Query(params): Query<MyWorkQuery>,
) -> Result<Json<MyWorkSummary>, AppError> {
    let week_of = params.week_of.unwrap_or_else(|| Utc::now().date_naive());
    let summary =
        load_my_work_summary(state.store.as_ref(), &params.user_id, &params.month, week_of)
            .await?;
    Ok(Json(summary))
}

/// GET /api/v1/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardQuery>,
) -> Result<Json<DashboardData>, AppError> {
    let today = params.today.unwrap_or_else(|| Utc::now().date_naive());
    let data = load_dashboard(
        state.store.as_ref(),
        params.scope,
        &params.user_id,
        &params.month,
        today,
    )
    .await?;
    Ok(Json(data))
}
