//! Display-row types of the resource matrix and the errors the matrix can raise.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::person::PersonRef;
use crate::models::project::Release;
use crate::store::StoreError;

/// Number of month columns in a matrix response.
pub const MONTHS: usize = 12;

/// Per-month planned MM, index-aligned with `MatrixMeta::month_columns`.
pub type PlanMonths = [f64; MONTHS];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Person,
    Project,
}

/// Rendering style of a row. Aggregation never looks at it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RowType {
    Summary,
    Project,
    Person,
    PersonInProject,
    Direct,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRow {
    pub row_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub row_type: RowType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<PersonRef>,
    #[serde(rename = "planMM", default, skip_serializing_if = "Option::is_none")]
    pub plan_mm: Option<f64>,
    #[serde(rename = "actualMM", default, skip_serializing_if = "Option::is_none")]
    pub actual_mm: Option<f64>,
    pub plan_months: PlanMonths,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<Release>,
}

impl ResourceRow {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatrixMeta {
    pub year: i32,
    pub group: GroupBy,
    pub month_columns: Vec<String>,
}

/// A fully materialised matrix: roots in reference order, each followed by its children.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatrixResponse {
    pub meta: MatrixMeta,
    pub rows: Vec<ResourceRow>,
}

/// What is wrong with a row forest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyDefect {
    #[error("duplicate rowId '{0}'")]
    DuplicateRowId(String),

    #[error("row '{row_id}' references unknown parent '{parent_id}'")]
    UnknownParent { row_id: String, parent_id: String },

    #[error("row '{row_id}' is nested under non-root '{parent_id}'")]
    NestedParent { row_id: String, parent_id: String },

    #[error("parentId cycle through row '{0}'")]
    Cycle(String),
}

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("Planning data unavailable: {0}")]
    DataUnavailable(#[from] StoreError),

    #[error("Year {0} cannot be shown as YYYY month columns")]
    InvalidYear(i32),

    #[error("Malformed hierarchy: {0}")]
    MalformedHierarchy(#[from] HierarchyDefect),
}
