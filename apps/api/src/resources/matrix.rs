//! Resource matrix builder: pivots people, projects and worklogs into a two-level row forest.
//!
//! Children carry the planned MM of one (person, project) pair per month, taken
//! from the project's monthly plan, and the actual MM booked against that pair
//! in the year's worklogs. A root's figures are the sums of its children, so a
//! root with no children is all zeros.

use std::collections::{HashMap, HashSet};

use chrono::Datelike;
use tracing::{debug, info};

use crate::metrics::hours_to_mm;
use crate::models::person::{Person, PersonRef};
use crate::models::project::{Project, Release};
use crate::models::worklog::Worklog;
use crate::month::{month_columns, month_index, year_bounds};
use crate::resources::rows::{
    GroupBy, HierarchyDefect, MatrixError, MatrixMeta, MatrixResponse, PlanMonths, ResourceRow,
    RowType, MONTHS,
};
use crate::store::{PlanningStore, WorklogQuery};

/// Everything the builder reads. Loaded once per request, never mutated.
#[derive(Debug, Clone, Default)]
pub struct MatrixSource {
    pub people: Vec<Person>,
    pub projects: Vec<Project>,
    /// Worklogs of the requested year. Rows outside it are ignored.
    pub worklogs: Vec<Worklog>,
}

impl MatrixSource {
    /// Fetches the roster, the project list and the year's worklogs.
    pub async fn load(store: &dyn PlanningStore, year: i32) -> Result<Self, MatrixError> {
        let (start, end) = year_bounds(year).ok_or(MatrixError::InvalidYear(year))?;
        let people = store.list_people().await?;
        let projects = store.list_projects().await?;
        let worklogs = store
            .list_worklogs(&WorklogQuery {
                user_id: None,
                start,
                end,
            })
            .await?;
        Ok(Self {
            people,
            projects,
            worklogs,
        })
    }
}

/// Loads the source data and builds the matrix for `(year, group)`.
pub async fn load_matrix(
    store: &dyn PlanningStore,
    year: i32,
    group: GroupBy,
) -> Result<MatrixResponse, MatrixError> {
    let source = MatrixSource::load(store, year).await?;
    let response = build_matrix(year, group, &source)?;
    info!(
        "Built {:?} matrix for {}: {} rows",
        group,
        year,
        response.rows.len()
    );
    Ok(response)
}

/// Builds the row forest for `year` grouped by `group`.
///
/// Roots keep roster (or project list) order and are each followed by their
/// children in assignment order. The result is validated before it is returned.
pub fn build_matrix(
    year: i32,
    group: GroupBy,
    source: &MatrixSource,
) -> Result<MatrixResponse, MatrixError> {
    let month_columns = month_columns(year).ok_or(MatrixError::InvalidYear(year))?;
    let actuals = ActualsIndex::from_worklogs(year, &source.worklogs);

    let rows = match group {
        GroupBy::Person => rows_by_person(&month_columns, source, &actuals),
        GroupBy::Project => rows_by_project(&month_columns, source, &actuals),
    };

    validate_forest(&rows)?;

    Ok(MatrixResponse {
        meta: MatrixMeta {
            year,
            group,
            month_columns,
        },
        rows,
    })
}

/// Checks the two-level forest invariants: unique row ids, and every
/// `parent_id` naming a root row of the same response.
pub fn validate_forest(rows: &[ResourceRow]) -> Result<(), HierarchyDefect> {
    let mut roots = HashSet::new();
    let mut seen = HashSet::new();
    for row in rows {
        if !seen.insert(row.row_id.as_str()) {
            return Err(HierarchyDefect::DuplicateRowId(row.row_id.clone()));
        }
        if row.is_root() {
            roots.insert(row.row_id.as_str());
        }
    }
    for row in rows {
        let Some(parent_id) = row.parent_id.as_deref() else {
            continue;
        };
        if roots.contains(parent_id) {
            continue;
        }
        return Err(if seen.contains(parent_id) {
            HierarchyDefect::NestedParent {
                row_id: row.row_id.clone(),
                parent_id: parent_id.to_string(),
            }
        } else {
            HierarchyDefect::UnknownParent {
                row_id: row.row_id.clone(),
                parent_id: parent_id.to_string(),
            }
        });
    }
    Ok(())
}

/// Row id of a child nested under `parent_id`.
pub fn child_row_id(parent_id: &str, child_id: &str) -> String {
    format!("{parent_id}/{child_id}")
}

/// Actual hours per (person, project) and month, from one year's worklogs.
struct ActualsIndex {
    hours: HashMap<(String, String), [f64; MONTHS]>,
}

impl ActualsIndex {
    fn from_worklogs(year: i32, worklogs: &[Worklog]) -> Self {
        let mut hours: HashMap<(String, String), [f64; MONTHS]> = HashMap::new();
        for worklog in worklogs.iter().filter(|w| w.date.year() == year) {
            let slot = hours
                .entry((worklog.user_id.clone(), worklog.project_id.clone()))
                .or_insert([0.0; MONTHS]);
            slot[month_index(worklog.date)] += worklog.actual_h;
        }
        Self { hours }
    }

    /// Actual MM of the pair over the whole year.
    fn actual_mm(&self, person_id: &str, project_id: &str) -> f64 {
        self.hours
            .get(&(person_id.to_string(), project_id.to_string()))
            .map(|months| hours_to_mm(months.iter().sum()))
            .unwrap_or(0.0)
    }
}

fn pair_plan_months(month_columns: &[String], project: &Project, person_id: &str) -> PlanMonths {
    let mut months = [0.0; MONTHS];
    for (slot, month) in months.iter_mut().zip(month_columns) {
        *slot = project.planned_mm(month, person_id);
    }
    months
}

/// Root row whose totals are the sums of `children`.
fn root_row(
    row_id: &str,
    row_type: RowType,
    name: &str,
    person: Option<PersonRef>,
    release: Option<Release>,
    children: &[ResourceRow],
) -> ResourceRow {
    let mut plan_months = [0.0; MONTHS];
    for child in children {
        for (total, value) in plan_months.iter_mut().zip(child.plan_months.iter()) {
            *total += value;
        }
    }
    let actual_mm: f64 = children.iter().filter_map(|c| c.actual_mm).sum();
    ResourceRow {
        row_id: row_id.to_string(),
        parent_id: None,
        row_type,
        name: name.to_string(),
        person,
        plan_mm: Some(plan_months.iter().sum()),
        actual_mm: Some(actual_mm),
        plan_months,
        release,
    }
}

fn rows_by_person(
    month_columns: &[String],
    source: &MatrixSource,
    actuals: &ActualsIndex,
) -> Vec<ResourceRow> {
    let mut rows = Vec::new();
    for person in &source.people {
        let children: Vec<ResourceRow> = source
            .projects
            .iter()
            .filter(|project| project.is_assigned(&person.id))
            .map(|project| {
                let plan_months = pair_plan_months(month_columns, project, &person.id);
                ResourceRow {
                    row_id: child_row_id(&person.id, &project.id),
                    parent_id: Some(person.id.clone()),
                    row_type: RowType::Project,
                    name: project.name.clone(),
                    person: None,
                    plan_mm: Some(plan_months.iter().sum()),
                    actual_mm: Some(actuals.actual_mm(&person.id, &project.id)),
                    plan_months,
                    release: project.release.clone(),
                }
            })
            .collect();

        rows.push(root_row(
            &person.id,
            RowType::Person,
            &person.name,
            Some(PersonRef::from(person)),
            None,
            &children,
        ));
        rows.extend(children);
    }
    rows
}

fn rows_by_project(
    month_columns: &[String],
    source: &MatrixSource,
    actuals: &ActualsIndex,
) -> Vec<ResourceRow> {
    let roster: HashMap<&str, &Person> = source
        .people
        .iter()
        .map(|p| (p.id.as_str(), p))
        .collect();

    let mut rows = Vec::new();
    for project in &source.projects {
        let mut children = Vec::with_capacity(project.assignee_ids.len());
        for assignee_id in &project.assignee_ids {
            let Some(person) = roster.get(assignee_id.as_str()) else {
                debug!(
                    "Project {} lists assignee {} who is not on the roster; skipping",
                    project.id, assignee_id
                );
                continue;
            };
            let plan_months = pair_plan_months(month_columns, project, &person.id);
            children.push(ResourceRow {
                row_id: child_row_id(&project.id, &person.id),
                parent_id: Some(project.id.clone()),
                row_type: RowType::PersonInProject,
                name: person.name.clone(),
                person: Some(PersonRef::from(*person)),
                plan_mm: Some(plan_months.iter().sum()),
                actual_mm: Some(actuals.actual_mm(&person.id, &project.id)),
                plan_months,
                release: None,
            });
        }

        rows.push(root_row(
            &project.id,
            RowType::Project,
            &project.name,
            None,
            project.release.clone(),
            &children,
        ));
        rows.extend(children);
    }
    rows
}
