use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::month::parse_month;

/// Billable project work vs. non-project (direct) work.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProjectType {
    Project,
    Direct,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Project => "Project",
            ProjectType::Direct => "Direct",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Project" => Some(ProjectType::Project),
            "Direct" => Some(ProjectType::Direct),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProjectStatus {
    Active,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "Active",
            ProjectStatus::Archived => "Archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Active" => Some(ProjectStatus::Active),
            "Archived" => Some(ProjectStatus::Archived),
            _ => None,
        }
    }
}

/// `YYYY-MM` → person id → planned MM. An absent entry means zero.
pub type MonthlyPlan = BTreeMap<String, BTreeMap<String, f64>>;

/// Document the monthly plan was taken from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanSource {
    pub doc_title: String,
    pub doc_version: String,
}

/// Release tracking info. Carried through to display rows untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub name: String,
    pub due: NaiveDate,
    pub total: u32,
    pub closed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub late_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    pub status: ProjectStatus,
    pub color: String,
    pub assignee_ids: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub monthly_plan: MonthlyPlan,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_source: Option<PlanSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<Release>,
}

impl Project {
    /// Planned MM for one person in one `YYYY-MM` month; zero when unplanned.
    pub fn planned_mm(&self, month: &str, person_id: &str) -> f64 {
        self.monthly_plan
            .get(month)
            .and_then(|people| people.get(person_id))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn is_assigned(&self, person_id: &str) -> bool {
        self.assignee_ids.iter().any(|id| id == person_id)
    }

    pub fn is_direct(&self) -> bool {
        self.project_type == ProjectType::Direct
    }

    pub fn is_active(&self) -> bool {
        self.status == ProjectStatus::Active
    }
}

/// Body of a project create request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    pub status: ProjectStatus,
    pub color: String,
    #[serde(default)]
    pub assignee_ids: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub monthly_plan: MonthlyPlan,
    #[serde(default)]
    pub plan_source: Option<PlanSource>,
    #[serde(default)]
    pub release: Option<Release>,
}

impl NewProject {
    pub fn into_project(self, id: String) -> Project {
        Project {
            id,
            name: self.name,
            project_type: self.project_type,
            status: self.status,
            color: self.color,
            assignee_ids: self.assignee_ids,
            start_date: self.start_date,
            end_date: self.end_date,
            monthly_plan: self.monthly_plan,
            plan_source: self.plan_source,
            release: self.release,
        }
    }
}

/// Checks the fields every stored project must satisfy.
pub fn validate_project_fields(
    name: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    plan: &MonthlyPlan,
) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("name cannot be empty".to_string());
    }
    if end_date < start_date {
        return Err(format!("endDate {end_date} is before startDate {start_date}"));
    }
    validate_monthly_plan(plan)
}

/// Month keys must be `YYYY-MM`; MM values must be finite and non-negative.
pub fn validate_monthly_plan(plan: &MonthlyPlan) -> Result<(), String> {
    for (month, people) in plan {
        if parse_month(month).is_none() {
            return Err(format!("monthlyPlan key '{month}' is not a YYYY-MM month"));
        }
        for (person_id, mm) in people {
            if !mm.is_finite() || *mm < 0.0 {
                return Err(format!(
                    "monthlyPlan[{month}][{person_id}] must be a non-negative number, got {mm}"
                ));
            }
        }
    }
    Ok(())
}
