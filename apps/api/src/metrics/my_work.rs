//! Personal monthly and weekly effort summary.

use chrono::NaiveDate;
use serde::Serialize;

use crate::metrics::{
    mm_to_hours, plan_achievement, plan_breakdown, planned_mm_for, ActualHours, MetricsError,
    NamedValue,
};
use crate::models::project::Project;
use crate::models::worklog::Worklog;
use crate::month::{month_bounds, month_key, parse_month, week_bounds};
use crate::store::{PlanningStore, WorklogQuery};

const BREAKDOWN_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MyWorkSummary {
    #[serde(rename = "monthlyPlanMM")]
    pub monthly_plan_mm: f64,
    #[serde(rename = "monthlyActualMM")]
    pub monthly_actual_mm: f64,
    /// Actual minus plan, in hours. Positive means over plan.
    pub monthly_delta_h: f64,
    #[serde(rename = "monthlyPA")]
    pub monthly_pa: f64,
    pub monthly_direct_share: f64,
    pub project_breakdown: Vec<NamedValue>,
    pub weekly_plan_h: f64,
    pub weekly_actual_h: f64,
    pub weekly_remaining_h: f64,
}

/// Builds the summary of `user_id` for the month starting at `month_start`
/// and the Monday-to-Sunday week containing `week_of`.
///
/// `worklogs` must cover both the month and that week for the user.
pub fn summarize_my_work(
    projects: &[Project],
    worklogs: &[Worklog],
    user_id: &str,
    month_start: NaiveDate,
    week_of: NaiveDate,
) -> MyWorkSummary {
    let month = month_key(month_start);
    let (start, end) = month_bounds(month_start);
    let week_range = week_bounds(week_of);
    let mine = |w: &&Worklog| w.user_id == user_id;

    let plan_mm = planned_mm_for(projects, &month, user_id);
    let actual = ActualHours::tally(
        projects,
        worklogs
            .iter()
            .filter(mine)
            .filter(|w| w.date >= start && w.date <= end),
    );
    let actual_mm = actual.mm();

    let week: Vec<&Worklog> = worklogs
        .iter()
        .filter(mine)
        .filter(|w| week_range.is_some_and(|(from, to)| w.date >= from && w.date <= to))
        .collect();
    let weekly_plan_h: f64 = week.iter().map(|w| w.plan_h).sum();
    let weekly_actual_h: f64 = week.iter().map(|w| w.actual_h).sum();

    MyWorkSummary {
        monthly_plan_mm: plan_mm,
        monthly_actual_mm: actual_mm,
        monthly_delta_h: mm_to_hours(actual_mm - plan_mm),
        monthly_pa: plan_achievement(plan_mm, actual_mm),
        monthly_direct_share: actual.direct_share(),
        project_breakdown: plan_breakdown(projects, &month, user_id, BREAKDOWN_LIMIT),
        weekly_plan_h,
        weekly_actual_h,
        weekly_remaining_h: (weekly_plan_h - weekly_actual_h).max(0.0),
    }
}

/// Loads what the summary needs from the store and builds it.
pub async fn load_my_work_summary(
    store: &dyn PlanningStore,
    user_id: &str,
    month: &str,
    week_of: NaiveDate,
) -> Result<MyWorkSummary, MetricsError> {
    let month_start =
        parse_month(month).ok_or_else(|| MetricsError::InvalidMonth(month.to_string()))?;
    let (start, end) = month_bounds(month_start);
    let (week_start, week_end) =
        week_bounds(week_of).ok_or(MetricsError::InvalidDate(week_of))?;

    let projects = store.list_projects().await?;
    let worklogs = store
        .list_worklogs(&WorklogQuery {
            user_id: Some(user_id.to_string()),
            start: start.min(week_start),
            end: end.max(week_end),
        })
        .await?;

    Ok(summarize_my_work(
        &projects,
        &worklogs,
        user_id,
        month_start,
        week_of,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::{date, worklog};
    use crate::store::fixtures::seed_projects;
    use crate::store::MemoryPlanningStore;

    #[test]
    fn test_summary_combines_plan_and_worklogs() {
        let projects = seed_projects();
        let worklogs = vec![
            // week of 2025-02-10
            worklog("u-4", "p-1", date(2025, 2, 10), 8.0, 6.0),
            worklog("u-4", "p-3", date(2025, 2, 11), 8.0, 10.0),
            worklog("u-4", "p-3", date(2025, 2, 12), 8.0, 4.0),
            // same month, other week
            worklog("u-4", "p-1", date(2025, 2, 20), 0.0, 124.0),
            // someone else
            worklog("u-1", "p-1", date(2025, 2, 10), 8.0, 8.0),
        ];
        let summary = summarize_my_work(
            &projects,
            &worklogs,
            "u-4",
            date(2025, 2, 1),
            date(2025, 2, 13),
        );

        assert!((summary.monthly_plan_mm - 0.9).abs() < 1e-9);
        assert!((summary.monthly_actual_mm - 0.9).abs() < 1e-9);
        assert!(summary.monthly_delta_h.abs() < 1e-9);
        assert!((summary.monthly_pa - 100.0).abs() < 1e-9);
        assert!((summary.monthly_direct_share - 14.0 / 144.0 * 100.0).abs() < 1e-9);
        assert_eq!(summary.weekly_plan_h, 24.0);
        assert_eq!(summary.weekly_actual_h, 20.0);
        assert_eq!(summary.weekly_remaining_h, 4.0);
        assert_eq!(summary.project_breakdown.len(), 2);
    }

    #[test]
    fn test_remaining_hours_never_go_negative() {
        let worklogs = vec![worklog("u-1", "p-1", date(2025, 3, 3), 2.0, 9.0)];
        let summary = summarize_my_work(
            &seed_projects(),
            &worklogs,
            "u-1",
            date(2025, 3, 1),
            date(2025, 3, 3),
        );
        assert_eq!(summary.weekly_remaining_h, 0.0);
    }

    #[test]
    fn test_week_crossing_month_boundary_is_counted() {
        // the week of 2025-03-31 runs until 2025-04-06
        let worklogs = vec![
            worklog("u-1", "p-2", date(2025, 3, 31), 8.0, 8.0),
            worklog("u-1", "p-2", date(2025, 4, 2), 8.0, 0.0),
        ];
        let summary = summarize_my_work(
            &seed_projects(),
            &worklogs,
            "u-1",
            date(2025, 3, 1),
            date(2025, 3, 31),
        );
        assert_eq!(summary.weekly_plan_h, 16.0);
        assert!((summary.monthly_actual_mm - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_summary_serializes_with_dashboard_field_names() {
        let summary =
            summarize_my_work(&seed_projects(), &[], "u-1", date(2025, 1, 1), date(2025, 1, 6));
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["monthlyPlanMM"], 0.5);
        assert_eq!(json["monthlyPA"], 0.0);
        assert!(json.get("weeklyRemainingH").is_some());
    }

    #[tokio::test]
    async fn test_load_summary_rejects_bad_month() {
        let store = MemoryPlanningStore::seeded();
        let result = load_my_work_summary(&store, "u-1", "2025/01", date(2025, 1, 6)).await;
        assert!(matches!(result, Err(MetricsError::InvalidMonth(_))));
    }

    #[tokio::test]
    async fn test_load_summary_rejects_week_past_the_calendar() {
        let store = MemoryPlanningStore::seeded();
        let far: NaiveDate = "+262142-12-31".parse().unwrap();
        let result = load_my_work_summary(&store, "u-1", "2025-01", far).await;
        assert!(matches!(result, Err(MetricsError::InvalidDate(d)) if d == far));
    }

    #[tokio::test]
    async fn test_load_summary_reads_saved_worklogs() {
        let store = MemoryPlanningStore::seeded();
        let mut unsaved = worklog("u-1", "p-1", date(2025, 1, 7), 8.0, 16.0);
        unsaved.id = "new-0".to_string();
        store.upsert_worklogs(vec![unsaved]).await.unwrap();
        let summary = load_my_work_summary(&store, "u-1", "2025-01", date(2025, 1, 7))
            .await
            .unwrap();
        assert!((summary.monthly_actual_mm - 0.1).abs() < 1e-9);
        assert_eq!(summary.weekly_actual_h, 16.0);
    }
}
