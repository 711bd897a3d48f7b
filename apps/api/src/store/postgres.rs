//! PostgreSQL planning store. Schema lives in `schema.sql` at the crate root.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::models::evaluation::{
    CriterionScore, Evaluation, EvaluationCriterion, EvaluationMetrics, EvaluationStatus,
};
use crate::models::person::Person;
use crate::models::project::{
    MonthlyPlan, NewProject, PlanSource, Project, ProjectStatus, ProjectType, Release,
};
use crate::models::worklog::{Worklog, WorklogSource, WorklogStatus};
use crate::store::{PlanningStore, StoreError, WorklogQuery};

const PROJECT_COLUMNS: &str = "id, name, project_type, status, color, assignee_ids, \
     start_date, end_date, monthly_plan, plan_source, release";

const WORKLOG_COLUMNS: &str =
    "id, user_id, project_id, work_date, task, plan_h, actual_h, status, source";

const EVALUATION_COLUMNS: &str = "id, user_id, month, status, metrics, criteria, final_comment";

#[derive(Debug, FromRow)]
struct ProjectRow {
    id: String,
    name: String,
    project_type: String,
    status: String,
    color: String,
    assignee_ids: Vec<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    monthly_plan: Json<MonthlyPlan>,
    plan_source: Option<Json<PlanSource>>,
    release: Option<Json<Release>>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = StoreError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| StoreError::Corrupt {
            entity: "Project",
            id: row.id.clone(),
            reason,
        };
        let project_type = ProjectType::parse(&row.project_type)
            .ok_or_else(|| corrupt(format!("unknown project_type '{}'", row.project_type)))?;
        let status = ProjectStatus::parse(&row.status)
            .ok_or_else(|| corrupt(format!("unknown status '{}'", row.status)))?;
        Ok(Project {
            id: row.id,
            name: row.name,
            project_type,
            status,
            color: row.color,
            assignee_ids: row.assignee_ids,
            start_date: row.start_date,
            end_date: row.end_date,
            monthly_plan: row.monthly_plan.0,
            plan_source: row.plan_source.map(|j| j.0),
            release: row.release.map(|j| j.0),
        })
    }
}

#[derive(Debug, FromRow)]
struct WorklogRow {
    id: Uuid,
    user_id: String,
    project_id: String,
    work_date: NaiveDate,
    task: String,
    plan_h: f64,
    actual_h: f64,
    status: String,
    source: String,
}

impl TryFrom<WorklogRow> for Worklog {
    type Error = StoreError;

    fn try_from(row: WorklogRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| StoreError::Corrupt {
            entity: "Worklog",
            id: row.id.to_string(),
            reason,
        };
        let status = WorklogStatus::parse(&row.status)
            .ok_or_else(|| corrupt(format!("unknown status '{}'", row.status)))?;
        let source = WorklogSource::parse(&row.source)
            .ok_or_else(|| corrupt(format!("unknown source '{}'", row.source)))?;
        Ok(Worklog {
            id: row.id.to_string(),
            user_id: row.user_id,
            project_id: row.project_id,
            date: row.work_date,
            task: row.task,
            plan_h: row.plan_h,
            actual_h: row.actual_h,
            status,
            source,
        })
    }
}

#[derive(Debug, FromRow)]
struct EvaluationRow {
    id: String,
    user_id: String,
    month: String,
    status: String,
    metrics: Json<EvaluationMetrics>,
    criteria: Json<BTreeMap<EvaluationCriterion, CriterionScore>>,
    final_comment: String,
}

impl TryFrom<EvaluationRow> for Evaluation {
    type Error = StoreError;

    fn try_from(row: EvaluationRow) -> Result<Self, Self::Error> {
        let status = EvaluationStatus::parse(&row.status).ok_or_else(|| StoreError::Corrupt {
            entity: "Evaluation",
            id: row.id.clone(),
            reason: format!("unknown status '{}'", row.status),
        })?;
        Ok(Evaluation {
            id: row.id,
            user_id: row.user_id,
            month: row.month,
            status,
            metrics: row.metrics.0,
            criteria: row.criteria.0,
            final_comment: row.final_comment,
        })
    }
}

/// Store backed by a shared connection pool.
#[derive(Clone)]
pub struct PgPlanningStore {
    pool: PgPool,
}

impl PgPlanningStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanningStore for PgPlanningStore {
    async fn list_people(&self) -> Result<Vec<Person>, StoreError> {
        Ok(sqlx::query_as::<_, Person>(
            "SELECT id, name, avatar, role FROM people ORDER BY position ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY position ASC");
        sqlx::query_as::<_, ProjectRow>(&query)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Project::try_from)
            .collect()
    }

    async fn get_project(&self, id: &str) -> Result<Option<Project>, StoreError> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Project::try_from)
            .transpose()
    }

    async fn create_project(&self, project: NewProject) -> Result<Project, StoreError> {
        let project = project.into_project(format!("p-{}", Uuid::new_v4()));
        sqlx::query(
            r#"
            INSERT INTO projects
                (id, name, project_type, status, color, assignee_ids,
                 start_date, end_date, monthly_plan, plan_source, release)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(&project.id)
        .bind(&project.name)
        .bind(project.project_type.as_str())
        .bind(project.status.as_str())
        .bind(&project.color)
        .bind(&project.assignee_ids)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(Json(&project.monthly_plan))
        .bind(project.plan_source.as_ref().map(Json))
        .bind(project.release.as_ref().map(Json))
        .execute(&self.pool)
        .await?;

        info!("Inserted project {}", project.id);
        Ok(project)
    }

    async fn update_project(&self, project: Project) -> Result<Project, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET name = $2, project_type = $3, status = $4, color = $5, assignee_ids = $6,
                start_date = $7, end_date = $8, monthly_plan = $9, plan_source = $10,
                release = $11
            WHERE id = $1
            "#,
        )
        .bind(&project.id)
        .bind(&project.name)
        .bind(project.project_type.as_str())
        .bind(project.status.as_str())
        .bind(&project.color)
        .bind(&project.assignee_ids)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(Json(&project.monthly_plan))
        .bind(project.plan_source.as_ref().map(Json))
        .bind(project.release.as_ref().map(Json))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "Project",
                id: project.id,
            });
        }
        Ok(project)
    }

    async fn list_worklogs(&self, query: &WorklogQuery) -> Result<Vec<Worklog>, StoreError> {
        let sql = format!(
            "SELECT {WORKLOG_COLUMNS} FROM worklogs \
             WHERE ($1::TEXT IS NULL OR user_id = $1) AND work_date BETWEEN $2 AND $3 \
             ORDER BY work_date ASC, id ASC"
        );
        sqlx::query_as::<_, WorklogRow>(&sql)
            .bind(query.user_id.as_deref())
            .bind(query.start)
            .bind(query.end)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Worklog::try_from)
            .collect()
    }

    async fn upsert_worklogs(&self, worklogs: Vec<Worklog>) -> Result<Vec<Worklog>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(worklogs.len());

        for mut worklog in worklogs {
            let id = if worklog.is_unsaved() {
                Uuid::new_v4()
            } else {
                Uuid::parse_str(&worklog.id).map_err(|_| StoreError::NotFound {
                    entity: "Worklog",
                    id: worklog.id.clone(),
                })?
            };
            let is_new = worklog.is_unsaved();

            let result = if is_new {
                sqlx::query(
                    r#"
                    INSERT INTO worklogs
                        (id, user_id, project_id, work_date, task, plan_h, actual_h, status, source)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    "#,
                )
            } else {
                sqlx::query(
                    r#"
                    UPDATE worklogs
                    SET user_id = $2, project_id = $3, work_date = $4, task = $5,
                        plan_h = $6, actual_h = $7, status = $8, source = $9
                    WHERE id = $1
                    "#,
                )
            }
            .bind(id)
            .bind(&worklog.user_id)
            .bind(&worklog.project_id)
            .bind(worklog.date)
            .bind(&worklog.task)
            .bind(worklog.plan_h)
            .bind(worklog.actual_h)
            .bind(worklog.status.as_str())
            .bind(worklog.source.as_str())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(StoreError::NotFound {
                    entity: "Worklog",
                    id: worklog.id,
                });
            }

            worklog.id = id.to_string();
            saved.push(worklog);
        }

        tx.commit().await?;
        Ok(saved)
    }

    async fn get_evaluation(
        &self,
        user_id: &str,
        month: &str,
    ) -> Result<Option<Evaluation>, StoreError> {
        let query =
            format!("SELECT {EVALUATION_COLUMNS} FROM evaluations WHERE user_id = $1 AND month = $2");
        sqlx::query_as::<_, EvaluationRow>(&query)
            .bind(user_id)
            .bind(month)
            .fetch_optional(&self.pool)
            .await?
            .map(Evaluation::try_from)
            .transpose()
    }

    async fn save_evaluation(&self, evaluation: Evaluation) -> Result<Evaluation, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO evaluations (id, user_id, month, status, metrics, criteria, final_comment)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE
            SET status = EXCLUDED.status,
                metrics = EXCLUDED.metrics,
                criteria = EXCLUDED.criteria,
                final_comment = EXCLUDED.final_comment
            "#,
        )
        .bind(&evaluation.id)
        .bind(&evaluation.user_id)
        .bind(&evaluation.month)
        .bind(evaluation.status.as_str())
        .bind(Json(&evaluation.metrics))
        .bind(Json(&evaluation.criteria))
        .bind(&evaluation.final_comment)
        .execute(&self.pool)
        .await?;

        Ok(evaluation)
    }

    async fn list_evaluations(
        &self,
        user_id: &str,
        year: i32,
    ) -> Result<Vec<Evaluation>, StoreError> {
        let query = format!(
            "SELECT {EVALUATION_COLUMNS} FROM evaluations \
             WHERE user_id = $1 AND month LIKE $2 ORDER BY month ASC"
        );
        sqlx::query_as::<_, EvaluationRow>(&query)
            .bind(user_id)
            .bind(format!("{year:04}-%"))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Evaluation::try_from)
            .collect()
    }
}
