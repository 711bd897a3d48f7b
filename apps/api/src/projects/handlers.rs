use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::project::{validate_project_fields, NewProject, Project};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ProjectListQuery {
    #[serde(default)]
    pub include_archived: bool,
}

/// GET /api/v1/projects
///
/// Active projects only unless `include_archived=true`.
pub async fn handle_list_projects(
    State(state): State<AppState>,
    Query(params): Query<ProjectListQuery>,
) -> Result<Json<Vec<Project>>, AppError> {
    let projects = state
        .store
        .list_projects()
        .await?
        .into_iter()
        .filter(|p| params.include_archived || p.is_active())
        .collect();
    Ok(Json(projects))
}

/// POST /api/v1/projects
pub async fn handle_create_project(
    State(state): State<AppState>,
    Json(req): Json<NewProject>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    validate_project_fields(&req.name, req.start_date, req.end_date, &req.monthly_plan)
        .map_err(AppError::Validation)?;
    let project = state.store.create_project(req).await?;
    info!("Created project {} ({})", project.id, project.name);
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/projects/:id
pub async fn handle_get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Project>, AppError> {
    let project = state
        .store
        .get_project(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {id} not found")))?;
    Ok(Json(project))
}

/// PUT /api/v1/projects/:id
pub async fn handle_update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(project): Json<Project>,
) -> Result<Json<Project>, AppError> {
    if project.id != id {
        return Err(AppError::Validation(format!(
            "body id '{}' does not match path id '{id}'",
            project.id
        )));
    }
    validate_project_fields(
        &project.name,
        project.start_date,
        project.end_date,
        &project.monthly_plan,
    )
    .map_err(AppError::Validation)?;
    let updated = state.store.update_project(project).await?;
    Ok(Json(updated))
}
