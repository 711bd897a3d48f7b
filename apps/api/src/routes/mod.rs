pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers as evaluation;
use crate::metrics::handlers as metrics;
use crate::projects::handlers as projects;
use crate::resources::handlers as resources;
use crate::state::AppState;
use crate::worklogs::handlers as worklogs;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resource matrix
        .route(
            "/api/v1/resources/yearly",
            get(resources::handle_yearly_matrix),
        )
        .route(
            "/api/v1/resources/visible",
            post(resources::handle_visible_rows),
        )
        .route(
            "/api/v1/resources/expansion/toggle",
            post(resources::handle_toggle_expansion),
        )
        // Projects
        .route(
            "/api/v1/projects",
            get(projects::handle_list_projects).post(projects::handle_create_project),
        )
        .route(
            "/api/v1/projects/:id",
            get(projects::handle_get_project).put(projects::handle_update_project),
        )
        // Worklogs
        .route(
            "/api/v1/worklogs",
            get(worklogs::handle_list_worklogs).post(worklogs::handle_upsert_worklogs),
        )
        .route("/api/v1/worklogs/parse", post(worklogs::handle_parse_report))
        // Dashboards
        .route(
            "/api/v1/my-work/summary",
            get(metrics::handle_my_work_summary),
        )
        .route("/api/v1/dashboard", get(metrics::handle_dashboard))
        // Evaluations
        .route(
            "/api/v1/evaluations/:user_id",
            get(evaluation::handle_list_evaluations),
        )
        .route(
            "/api/v1/evaluations/:user_id/:month",
            get(evaluation::handle_get_evaluation).put(evaluation::handle_save_evaluation),
        )
        .route(
            "/api/v1/evaluations/:user_id/:month/draft-comments",
            post(evaluation::handle_draft_comments),
        )
        .route(
            "/api/v1/annual-reports/:user_id",
            post(evaluation::handle_annual_report),
        )
        .with_state(state)
}
