use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Prefix the timesheet editor uses for rows that have not been saved yet.
pub const UNSAVED_ID_PREFIX: &str = "new-";

/// Hours a single day can hold.
pub const MAX_HOURS_PER_DAY: f64 = 24.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WorklogStatus {
    Draft,
    Confirmed,
}

impl WorklogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorklogStatus::Draft => "Draft",
            WorklogStatus::Confirmed => "Confirmed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Draft" => Some(WorklogStatus::Draft),
            "Confirmed" => Some(WorklogStatus::Confirmed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WorklogSource {
    Manual,
    Jira,
    Calendar,
}

impl WorklogSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorklogSource::Manual => "manual",
            WorklogSource::Jira => "jira",
            WorklogSource::Calendar => "calendar",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "manual" => Some(WorklogSource::Manual),
            "jira" => Some(WorklogSource::Jira),
            "calendar" => Some(WorklogSource::Calendar),
            _ => None,
        }
    }
}

/// One timesheet line: planned and actual hours for a person, project and day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Worklog {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub project_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub task: String,
    pub plan_h: f64,
    pub actual_h: f64,
    pub status: WorklogStatus,
    pub source: WorklogSource,
}

impl Worklog {
    /// True when the row has never been persisted and needs a fresh id.
    pub fn is_unsaved(&self) -> bool {
        self.id.is_empty() || self.id.starts_with(UNSAVED_ID_PREFIX)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.user_id.is_empty() || self.project_id.is_empty() {
            return Err("worklog requires userId and projectId".to_string());
        }
        for (field, hours) in [("planH", self.plan_h), ("actualH", self.actual_h)] {
            if !hours.is_finite() || !(0.0..=MAX_HOURS_PER_DAY).contains(&hours) {
                return Err(format!(
                    "{field} must be between 0 and {MAX_HOURS_PER_DAY}, got {hours}"
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worklog(id: &str, actual_h: f64) -> Worklog {
        Worklog {
            id: id.to_string(),
            user_id: "u-1".to_string(),
            project_id: "p-1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            task: "planning".to_string(),
            plan_h: 4.0,
            actual_h,
            status: WorklogStatus::Draft,
            source: WorklogSource::Manual,
        }
    }

    #[test]
    fn test_unsaved_detection() {
        assert!(worklog("new-1", 1.0).is_unsaved());
        assert!(worklog("", 1.0).is_unsaved());
        assert!(!worklog("6f1c", 1.0).is_unsaved());
    }

    #[test]
    fn test_validate_rejects_out_of_range_hours() {
        assert!(worklog("w", 4.0).validate().is_ok());
        assert!(worklog("w", -1.0).validate().is_err());
        assert!(worklog("w", 25.0).validate().is_err());
        assert!(worklog("w", f64::NAN).validate().is_err());
    }

    #[test]
    fn test_worklog_wire_names() {
        let json = serde_json::to_value(worklog("w-1", 3.5)).unwrap();
        assert_eq!(json["planH"], 4.0);
        assert_eq!(json["actualH"], 3.5);
        assert_eq!(json["source"], "manual");
        assert_eq!(json["status"], "Draft");
    }
}
