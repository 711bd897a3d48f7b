use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::resources::matrix::load_matrix;
use crate::resources::rows::{GroupBy, MatrixResponse, ResourceRow};
use crate::resources::visibility::{compute_visible_rows, toggle_expansion, ExpansionSet};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct YearlyQuery {
    pub year: i32,
    #[serde(default)]
    pub group: GroupBy,
}

#[derive(Deserialize)]
pub struct VisibleRowsRequest {
    pub rows: Vec<ResourceRow>,
    #[serde(default)]
    pub expanded: ExpansionSet,
}

#[derive(Serialize)]
pub struct VisibleRowsResponse {
    pub rows: Vec<ResourceRow>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    #[serde(default)]
    pub expanded: ExpansionSet,
    pub row_id: String,
}

#[derive(Serialize)]
pub struct ToggleResponse {
    pub expanded: ExpansionSet,
}

/// GET /api/v1/resources/yearly
pub async fn handle_yearly_matrix(
    State(state): State<AppState>,
    Query(params): Query<YearlyQuery>,
) -> Result<Json<MatrixResponse>, AppError> {
    let matrix = load_matrix(state.store.as_ref(), params.year, params.group).await?;
    Ok(Json(matrix))
}

/// POST /api/v1/resources/visible
pub async fn handle_visible_rows(
    Json(req): Json<VisibleRowsRequest>,
) -> Result<Json<VisibleRowsResponse>, AppError> {
    // client-supplied rows
    let visible = compute_visible_rows(&req.rows, &req.expanded)
        .map_err(|e| AppError::UnprocessableEntity(format!("Malformed hierarchy: {e}")))?;
    Ok(Json(VisibleRowsResponse {
        rows: visible.into_iter().cloned().collect(),
    }))
}

/// POST /api/v1/resources/expansion/toggle
pub async fn handle_toggle_expansion(
    Json(req): Json<ToggleRequest>,
) -> Json<ToggleResponse> {
    Json(ToggleResponse {
        expanded: toggle_expansion(&req.expanded, &req.row_id),
    })
}
