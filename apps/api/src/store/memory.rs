//! In-memory planning store. Used when no `DATABASE_URL` is configured and in tests.

use async_trait::async_trait;
use chrono::Datelike;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::evaluation::Evaluation;
use crate::models::person::Person;
use crate::models::project::{NewProject, Project};
use crate::models::worklog::Worklog;
use crate::month::parse_month;
use crate::store::fixtures::{seed_people, seed_projects};
use crate::store::{PlanningStore, StoreError, WorklogQuery};

#[derive(Default)]
struct Tables {
    people: Vec<Person>,
    projects: Vec<Project>,
    worklogs: Vec<Worklog>,
    evaluations: Vec<Evaluation>,
}

/// Owns its data behind a `RwLock`; cloned values go out, nothing is shared by reference.
#[derive(Default)]
pub struct MemoryPlanningStore {
    tables: RwLock<Tables>,
}

impl MemoryPlanningStore {
    pub fn new(people: Vec<Person>, projects: Vec<Project>) -> Self {
        Self {
            tables: RwLock::new(Tables {
                people,
                projects,
                ..Tables::default()
            }),
        }
    }

    /// Store pre-loaded with the fixture roster and project list.
    pub fn seeded() -> Self {
        Self::new(seed_people(), seed_projects())
    }
}

#[async_trait]
impl PlanningStore for MemoryPlanningStore {
    async fn list_people(&self) -> Result<Vec<Person>, StoreError> {
        Ok(self.tables.read().await.people.clone())
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.tables.read().await.projects.clone())
    }

    async fn get_project(&self, id: &str) -> Result<Option<Project>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn create_project(&self, project: NewProject) -> Result<Project, StoreError> {
        let project = project.into_project(format!("p-{}", Uuid::new_v4()));
        self.tables.write().await.projects.push(project.clone());
        debug!("Created project {}", project.id);
        Ok(project)
    }

    async fn update_project(&self, project: Project) -> Result<Project, StoreError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .projects
            .iter_mut()
            .find(|p| p.id == project.id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "Project",
                id: project.id.clone(),
            })?;
        *slot = project.clone();
        Ok(project)
    }

    async fn list_worklogs(&self, query: &WorklogQuery) -> Result<Vec<Worklog>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .worklogs
            .iter()
            .filter(|w| query.matches(w))
            .cloned()
            .collect())
    }

    async fn upsert_worklogs(&self, worklogs: Vec<Worklog>) -> Result<Vec<Worklog>, StoreError> {
        let mut tables = self.tables.write().await;
        // Staged on a copy; a failed batch leaves the table untouched.
        let mut staged = tables.worklogs.clone();
        let mut saved = Vec::with_capacity(worklogs.len());
        for mut worklog in worklogs {
            if worklog.is_unsaved() {
                worklog.id = Uuid::new_v4().to_string();
                staged.push(worklog.clone());
            } else if let Some(slot) = staged.iter_mut().find(|w| w.id == worklog.id) {
                *slot = worklog.clone();
            } else {
                return Err(StoreError::NotFound {
                    entity: "Worklog",
                    id: worklog.id,
                });
            }
            saved.push(worklog);
        }
        tables.worklogs = staged;
        Ok(saved)
    }

    async fn get_evaluation(
        &self,
        user_id: &str,
        month: &str,
    ) -> Result<Option<Evaluation>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .evaluations
            .iter()
            .find(|e| e.user_id == user_id && e.month == month)
            .cloned())
    }

    async fn save_evaluation(&self, evaluation: Evaluation) -> Result<Evaluation, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.evaluations.iter_mut().find(|e| e.id == evaluation.id) {
            Some(slot) => *slot = evaluation.clone(),
            None => tables.evaluations.push(evaluation.clone()),
        }
        Ok(evaluation)
    }

    async fn list_evaluations(
        &self,
        user_id: &str,
        year: i32,
    ) -> Result<Vec<Evaluation>, StoreError> {
        let tables = self.tables.read().await;
        let mut found: Vec<Evaluation> = tables
            .evaluations
            .iter()
            .filter(|e| {
                e.user_id == user_id
                    && parse_month(&e.month).is_some_and(|m| m.year() == year)
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.month.cmp(&b.month));
        Ok(found)
    }
}
