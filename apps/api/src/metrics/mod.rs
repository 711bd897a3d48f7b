//! Effort arithmetic shared by the matrix, the dashboards and evaluations.
//!
//! Plans are kept in man-months (MM) and worklogs in hours; one MM is
//! `HOURS_PER_MM` hours.

pub mod dashboard;
pub mod handlers;
pub mod my_work;

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::models::evaluation::{EvaluationMetrics, ProjectEffort};
use crate::models::project::Project;
use crate::models::worklog::Worklog;
use crate::store::StoreError;

pub const HOURS_PER_MM: f64 = 160.0;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("month '{0}' is not a YYYY-MM month")]
    InvalidMonth(String),

    #[error("date {0} is outside the supported calendar")]
    InvalidDate(NaiveDate),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// How many projects an evaluation lists under `topProjects`.
const TOP_PROJECTS: usize = 3;

pub fn hours_to_mm(hours: f64) -> f64 {
    hours / HOURS_PER_MM
}

pub fn mm_to_hours(mm: f64) -> f64 {
    mm * HOURS_PER_MM
}

/// Plan achievement (PA) as a percentage of plan. Zero when nothing was planned.
pub fn plan_achievement(plan: f64, actual: f64) -> f64 {
    if plan > 0.0 {
        actual / plan * 100.0
    } else {
        0.0
    }
}

/// Share of `total` spent on direct work, in percent. Zero when `total` is zero.
pub fn direct_share(direct: f64, total: f64) -> f64 {
    if total > 0.0 {
        direct / total * 100.0
    } else {
        0.0
    }
}

/// A named value for bar charts.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

/// Planned MM of `user_id` in `month`, summed over every project.
pub fn planned_mm_for(projects: &[Project], month: &str, user_id: &str) -> f64 {
    projects.iter().map(|p| p.planned_mm(month, user_id)).sum()
}

/// Planned MM of the whole team in `month`.
pub fn planned_mm_total(projects: &[Project], month: &str) -> f64 {
    projects
        .iter()
        .filter_map(|p| p.monthly_plan.get(month))
        .flat_map(|people| people.values())
        .sum()
}

/// Non-zero planned MM per project for one person and month, largest first, at most `limit`.
pub fn plan_breakdown(
    projects: &[Project],
    month: &str,
    user_id: &str,
    limit: usize,
) -> Vec<NamedValue> {
    let mut breakdown: Vec<NamedValue> = projects
        .iter()
        .map(|p| NamedValue {
            name: p.name.clone(),
            value: p.planned_mm(month, user_id),
        })
        .filter(|v| v.value > 0.0)
        .collect();
    breakdown.sort_by(|a, b| b.value.total_cmp(&a.value));
    breakdown.truncate(limit);
    breakdown
}

/// Actual hours of a set of worklogs, split by project.
#[derive(Debug, Default)]
pub struct ActualHours {
    pub total: f64,
    pub direct: f64,
    pub by_project: HashMap<String, f64>,
}

impl ActualHours {
    /// Sums `worklogs`; projects missing from `projects` count toward the total only.
    pub fn tally<'a>(
        projects: &[Project],
        worklogs: impl IntoIterator<Item = &'a Worklog>,
    ) -> Self {
        let direct_ids: Vec<&str> = projects
            .iter()
            .filter(|p| p.is_direct())
            .map(|p| p.id.as_str())
            .collect();
        let mut hours = Self::default();
        for worklog in worklogs {
            hours.total += worklog.actual_h;
            if direct_ids.contains(&worklog.project_id.as_str()) {
                hours.direct += worklog.actual_h;
            }
            *hours
                .by_project
                .entry(worklog.project_id.clone())
                .or_default() += worklog.actual_h;
        }
        hours
    }

    pub fn mm(&self) -> f64 {
        hours_to_mm(self.total)
    }

    pub fn direct_share(&self) -> f64 {
        direct_share(self.direct, self.total)
    }
}

/// Evaluation figures for one person and month.
///
/// `worklogs` must already be limited to that person and month.
pub fn evaluation_metrics(
    projects: &[Project],
    month: &str,
    user_id: &str,
    worklogs: &[Worklog],
) -> EvaluationMetrics {
    let plan_mm = planned_mm_for(projects, month, user_id);
    let actual = ActualHours::tally(projects, worklogs);
    let actual_mm = actual.mm();

    let mut top_projects: Vec<ProjectEffort> = projects
        .iter()
        .filter_map(|p| {
            let hours = actual.by_project.get(&p.id).copied().unwrap_or(0.0);
            (hours > 0.0).then(|| ProjectEffort {
                name: p.name.clone(),
                mm: hours_to_mm(hours),
            })
        })
        .collect();
    top_projects.sort_by(|a, b| b.mm.total_cmp(&a.mm));
    top_projects.truncate(TOP_PROJECTS);

    EvaluationMetrics {
        plan_mm,
        actual_mm,
        delta_mm: actual_mm - plan_mm,
        pa: plan_achievement(plan_mm, actual_mm),
        direct_share: actual.direct_share(),
        top_projects,
    }
}
