//! Planning store: the data-access boundary for people, projects, worklogs and evaluations.
//!
//! Handlers and the matrix builder only see `dyn PlanningStore`; `AppState`
//! carries an `Arc<dyn PlanningStore>` chosen at startup from config.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::evaluation::Evaluation;
use crate::models::person::Person;
use crate::models::project::{NewProject, Project};
use crate::models::worklog::Worklog;

pub mod fixtures;
pub mod memory;
pub mod postgres;

pub use memory::MemoryPlanningStore;
pub use postgres::PgPlanningStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Stored {entity} {id} is corrupt: {reason}")]
    Corrupt {
        entity: &'static str,
        id: String,
        reason: String,
    },
}

/// Worklog filter. `user_id = None` spans the whole team.
#[derive(Debug, Clone)]
pub struct WorklogQuery {
    pub user_id: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WorklogQuery {
    pub fn matches(&self, worklog: &Worklog) -> bool {
        self.user_id
            .as_deref()
            .map_or(true, |user_id| worklog.user_id == user_id)
            && worklog.date >= self.start
            && worklog.date <= self.end
    }
}

#[async_trait]
pub trait PlanningStore: Send + Sync {
    /// Team roster in canonical order.
    async fn list_people(&self) -> Result<Vec<Person>, StoreError>;

    /// Every project, archived included, in list order.
    async fn list_projects(&self) -> Result<Vec<Project>, StoreError>;

    async fn get_project(&self, id: &str) -> Result<Option<Project>, StoreError>;

    async fn create_project(&self, project: NewProject) -> Result<Project, StoreError>;

    async fn update_project(&self, project: Project) -> Result<Project, StoreError>;

    async fn list_worklogs(&self, query: &WorklogQuery) -> Result<Vec<Worklog>, StoreError>;

    /// Inserts unsaved rows under fresh ids and replaces known ones.
    async fn upsert_worklogs(&self, worklogs: Vec<Worklog>) -> Result<Vec<Worklog>, StoreError>;

    async fn get_evaluation(
        &self,
        user_id: &str,
        month: &str,
    ) -> Result<Option<Evaluation>, StoreError>;

    async fn save_evaluation(&self, evaluation: Evaluation) -> Result<Evaluation, StoreError>;

    /// Stored evaluations of one person within `year`, ordered by month.
    async fn list_evaluations(
        &self,
        user_id: &str,
        year: i32,
    ) -> Result<Vec<Evaluation>, StoreError>;
}
