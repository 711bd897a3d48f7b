//! Personal and team dashboard data for one month.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::metrics::{
    hours_to_mm, plan_achievement, plan_breakdown, planned_mm_for, planned_mm_total,
    MetricsError, NamedValue,
};
use crate::models::person::Person;
use crate::models::project::Project;
use crate::models::worklog::Worklog;
use crate::month::{month_bounds, month_key, parse_month, week_bounds};
use crate::store::{PlanningStore, WorklogQuery};

/// Hours a person is expected to work in one day.
pub const DAILY_CAPACITY_H: f64 = 8.0;

/// Every n-th day of the month is sampled for the burn-up series.
const BURNUP_STEP: usize = 3;
const BREAKDOWN_LIMIT: usize = 5;
const DEADLINE_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DashboardScope {
    #[default]
    Personal,
    Team,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BurnupPoint {
    /// `MM-DD`
    pub name: String,
    #[serde(rename = "cumPlanMM")]
    pub cum_plan_mm: f64,
    #[serde(rename = "cumActualMM")]
    pub cum_actual_mm: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyOverload {
    pub user_id: String,
    pub user_name: String,
    /// `MM-DD`
    pub date: String,
    pub day_of_week: String,
    pub actual_h: f64,
    pub capacity_h: f64,
    pub overload_pct: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Deadline {
    pub id: String,
    pub name: String,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub user_id: String,
    pub user_name: String,
    #[serde(rename = "planMM")]
    pub plan_mm: f64,
    #[serde(rename = "actualMM")]
    pub actual_mm: f64,
    pub pa: f64,
}

/// Figures both scopes show.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    #[serde(rename = "monthlyPlanMM")]
    pub monthly_plan_mm: f64,
    #[serde(rename = "monthlyActualMM")]
    pub monthly_actual_mm: f64,
    #[serde(rename = "monthlyPA")]
    pub monthly_pa: f64,
    pub burnup_data: Vec<BurnupPoint>,
    pub weekly_overload: Vec<WeeklyOverload>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum DashboardData {
    #[serde(rename_all = "camelCase")]
    Personal {
        #[serde(flatten)]
        overview: DashboardOverview,
        project_breakdown: Vec<NamedValue>,
        upcoming_deadlines: Vec<Deadline>,
    },
    #[serde(rename_all = "camelCase")]
    Team {
        #[serde(flatten)]
        overview: DashboardOverview,
        team_summary: Vec<MemberSummary>,
    },
}

impl DashboardData {
    pub fn overview(&self) -> &DashboardOverview {
        match self {
            DashboardData::Personal { overview, .. } | DashboardData::Team { overview, .. } => {
                overview
            }
        }
    }
}

/// Inputs for one dashboard. Worklogs must cover the month and the week of
/// `today`; for the personal scope they may be limited to that user.
pub struct DashboardInput<'a> {
    pub scope: DashboardScope,
    pub user_id: &'a str,
    pub month_start: NaiveDate,
    pub today: NaiveDate,
    pub people: &'a [Person],
    pub projects: &'a [Project],
    pub worklogs: &'a [Worklog],
}

pub fn build_dashboard(input: &DashboardInput<'_>) -> DashboardData {
    let month = month_key(input.month_start);
    let (start, end) = month_bounds(input.month_start);

    let in_scope = |w: &&Worklog| match input.scope {
        DashboardScope::Personal => w.user_id == input.user_id,
        DashboardScope::Team => true,
    };
    let month_logs: Vec<&Worklog> = input
        .worklogs
        .iter()
        .filter(in_scope)
        .filter(|w| w.date >= start && w.date <= end)
        .collect();

    let plan_mm = match input.scope {
        DashboardScope::Personal => planned_mm_for(input.projects, &month, input.user_id),
        DashboardScope::Team => planned_mm_total(input.projects, &month),
    };
    let actual_mm = hours_to_mm(month_logs.iter().map(|w| w.actual_h).sum());

    let scoped_logs: Vec<Worklog> = input.worklogs.iter().filter(in_scope).cloned().collect();
    let overview = DashboardOverview {
        monthly_plan_mm: plan_mm,
        monthly_actual_mm: actual_mm,
        monthly_pa: plan_achievement(plan_mm, actual_mm),
        burnup_data: burnup_series(input.month_start, plan_mm, &month_logs),
        weekly_overload: weekly_overload(input.people, &scoped_logs, input.today),
    };

    match input.scope {
        DashboardScope::Personal => DashboardData::Personal {
            overview,
            project_breakdown: plan_breakdown(
                input.projects,
                &month,
                input.user_id,
                BREAKDOWN_LIMIT,
            ),
            upcoming_deadlines: upcoming_deadlines(input.projects, input.user_id, input.today),
        },
        DashboardScope::Team => DashboardData::Team {
            overview,
            team_summary: team_summary(input.people, input.projects, &month, &month_logs),
        },
    }
}

/// Cumulative plan and actual MM sampled every `BURNUP_STEP` days from the 1st.
///
/// Plan accrues linearly across the sampled points and reaches `plan_mm` at the
/// last one. Actual is the running total of worklog hours up to each sampled day.
pub fn burnup_series(
    month_start: NaiveDate,
    plan_mm: f64,
    worklogs: &[&Worklog],
) -> Vec<BurnupPoint> {
    let (start, end) = month_bounds(month_start);
    let days = (end - start).num_days() as usize + 1;
    let samples: Vec<NaiveDate> = (0..days)
        .step_by(BURNUP_STEP)
        .map(|offset| start + Duration::days(offset as i64))
        .collect();

    let count = samples.len() as f64;
    samples
        .iter()
        .enumerate()
        .map(|(i, day)| {
            let actual_h: f64 = worklogs
                .iter()
                .filter(|w| w.date >= start && w.date <= *day)
                .map(|w| w.actual_h)
                .sum();
            BurnupPoint {
                name: day.format("%m-%d").to_string(),
                cum_plan_mm: (i + 1) as f64 / count * plan_mm,
                cum_actual_mm: hours_to_mm(actual_h),
            }
        })
        .collect()
}

/// Days in the week of `today` on which someone logged more than `DAILY_CAPACITY_H`.
///
/// Ordered by date, then roster order.
pub fn weekly_overload(
    people: &[Person],
    worklogs: &[Worklog],
    today: NaiveDate,
) -> Vec<WeeklyOverload> {
    let Some((week_start, week_end)) = week_bounds(today) else {
        return Vec::new();
    };
    let mut daily: BTreeMap<(NaiveDate, usize), f64> = BTreeMap::new();
    for worklog in worklogs
        .iter()
        .filter(|w| w.date >= week_start && w.date <= week_end)
    {
        let Some(position) = people.iter().position(|p| p.id == worklog.user_id) else {
            continue;
        };
        *daily.entry((worklog.date, position)).or_default() += worklog.actual_h;
    }

    daily
        .into_iter()
        .filter(|(_, hours)| *hours > DAILY_CAPACITY_H)
        .map(|((date, position), actual_h)| {
            let person = &people[position];
            WeeklyOverload {
                user_id: person.id.clone(),
                user_name: person.name.clone(),
                date: date.format("%m-%d").to_string(),
                day_of_week: korean_weekday(date.weekday()).to_string(),
                actual_h,
                capacity_h: DAILY_CAPACITY_H,
                overload_pct: actual_h / DAILY_CAPACITY_H * 100.0,
            }
        })
        .collect()
}

/// Active projects assigned to `user_id` that end today or later, nearest first.
pub fn upcoming_deadlines(projects: &[Project], user_id: &str, today: NaiveDate) -> Vec<Deadline> {
    let mut deadlines: Vec<Deadline> = projects
        .iter()
        .filter(|p| p.is_active() && p.is_assigned(user_id) && p.end_date >= today)
        .map(|p| Deadline {
            id: p.id.clone(),
            name: p.name.clone(),
            due_date: p.end_date,
        })
        .collect();
    deadlines.sort_by_key(|d| d.due_date);
    deadlines.truncate(DEADLINE_LIMIT);
    deadlines
}

fn team_summary(
    people: &[Person],
    projects: &[Project],
    month: &str,
    month_logs: &[&Worklog],
) -> Vec<MemberSummary> {
    people
        .iter()
        .map(|person| {
            let plan_mm = planned_mm_for(projects, month, &person.id);
            let actual_mm = hours_to_mm(
                month_logs
                    .iter()
                    .filter(|w| w.user_id == person.id)
                    .map(|w| w.actual_h)
                    .sum(),
            );
            MemberSummary {
                user_id: person.id.clone(),
                user_name: person.name.clone(),
                plan_mm,
                actual_mm,
                pa: plan_achievement(plan_mm, actual_mm),
            }
        })
        .collect()
}

fn korean_weekday(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "월",
        Weekday::Tue => "화",
        Weekday::Wed => "수",
        Weekday::Thu => "목",
        Weekday::Fri => "금",
        Weekday::Sat => "토",
        Weekday::Sun => "일",
    }
}

/// Loads the roster, projects and worklogs the dashboard needs and builds it.
pub async fn load_dashboard(
    store: &dyn PlanningStore,
    scope: DashboardScope,
    user_id: &str,
    month: &str,
    today: NaiveDate,
) -> Result<DashboardData, MetricsError> {
    let month_start =
        parse_month(month).ok_or_else(|| MetricsError::InvalidMonth(month.to_string()))?;
    let (start, end) = month_bounds(month_start);
    let (week_start, week_end) = week_bounds(today).ok_or(MetricsError::InvalidDate(today))?;

    let people = store.list_people().await?;
    let projects = store.list_projects().await?;
    let worklogs = store
        .list_worklogs(&WorklogQuery {
            user_id: match scope {
                DashboardScope::Personal => Some(user_id.to_string()),
                DashboardScope::Team => None,
            },
            start: start.min(week_start),
            end: end.max(week_end),
        })
        .await?;

    Ok(build_dashboard(&DashboardInput {
        scope,
        user_id,
        month_start,
        today,
        people: &people,
        projects: &projects,
        worklogs: &worklogs,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::{date, worklog};
    use crate::store::fixtures::{seed_people, seed_projects};
    use crate::store::MemoryPlanningStore;

    fn input<'a>(
        scope: DashboardScope,
        people: &'a [Person],
        projects: &'a [Project],
        worklogs: &'a [Worklog],
    ) -> DashboardInput<'a> {
        DashboardInput {
            scope,
            user_id: "u-1",
            month_start: date(2025, 1, 1),
            today: date(2025, 1, 15),
            people,
            projects,
            worklogs,
        }
    }

    #[test]
    fn test_burnup_samples_every_third_day_and_is_monotone() {
        let logs = vec![
            worklog("u-1", "p-1", date(2025, 1, 2), 8.0, 8.0),
            worklog("u-1", "p-1", date(2025, 1, 10), 8.0, 16.0),
            worklog("u-1", "p-1", date(2025, 1, 31), 8.0, 8.0),
        ];
        let refs: Vec<&Worklog> = logs.iter().collect();
        let series = burnup_series(date(2025, 1, 1), 0.5, &refs);

        // days 1, 4, ..., 31
        assert_eq!(series.len(), 11);
        assert_eq!(series[0].name, "01-01");
        assert_eq!(series[1].name, "01-04");
        assert_eq!(series[10].name, "01-31");
        assert!((series[10].cum_plan_mm - 0.5).abs() < 1e-9);
        assert!((series[10].cum_actual_mm - 0.2).abs() < 1e-9);
        assert!(series.windows(2).all(|w| {
            w[0].cum_plan_mm <= w[1].cum_plan_mm && w[0].cum_actual_mm <= w[1].cum_actual_mm
        }));
    }

    #[test]
    fn test_overload_flags_days_above_capacity() {
        let people = seed_people();
        let logs = vec![
            // Tuesday, split across two projects
            worklog("u-1", "p-1", date(2025, 1, 14), 8.0, 6.0),
            worklog("u-1", "p-2", date(2025, 1, 14), 0.0, 3.5),
            // exactly at capacity
            worklog("u-5", "p-2", date(2025, 1, 15), 8.0, 8.0),
            // previous week
            worklog("u-5", "p-2", date(2025, 1, 10), 8.0, 12.0),
        ];
        let overload = weekly_overload(&people, &logs, date(2025, 1, 15));

        assert_eq!(overload.len(), 1);
        let day = &overload[0];
        assert_eq!(day.user_id, "u-1");
        assert_eq!(day.date, "01-14");
        assert_eq!(day.day_of_week, "화");
        assert_eq!(day.actual_h, 9.5);
        assert!((day.overload_pct - 118.75).abs() < 1e-9);
    }

    #[test]
    fn test_deadlines_are_active_assigned_and_nearest_first() {
        let projects = seed_projects();
        let deadlines = upcoming_deadlines(&projects, "u-1", date(2025, 6, 1));
        let ids: Vec<_> = deadlines.iter().map(|d| d.id.as_str()).collect();
        // Bravo ends in September, Alpha in December
        assert_eq!(ids, vec!["p-2", "p-1"]);

        assert!(upcoming_deadlines(&projects, "u-1", date(2026, 1, 1)).is_empty());
        // p-4 is archived
        assert!(upcoming_deadlines(&projects, "u-5", date(2024, 6, 1))
            .iter()
            .all(|d| d.id != "p-4"));
    }

    #[test]
    fn test_personal_dashboard_only_counts_own_worklogs() {
        let people = seed_people();
        let projects = seed_projects();
        let logs = vec![
            worklog("u-1", "p-1", date(2025, 1, 6), 8.0, 40.0),
            worklog("u-2", "p-1", date(2025, 1, 6), 8.0, 40.0),
        ];
        let data = build_dashboard(&input(DashboardScope::Personal, &people, &projects, &logs));

        let overview = data.overview();
        assert_eq!(overview.monthly_plan_mm, 0.5);
        assert!((overview.monthly_actual_mm - 0.25).abs() < 1e-9);
        assert!((overview.monthly_pa - 50.0).abs() < 1e-9);
        let DashboardData::Personal {
            project_breakdown, ..
        } = &data
        else {
            panic!("expected personal dashboard");
        };
        assert_eq!(project_breakdown.len(), 1);
    }

    #[test]
    fn test_team_dashboard_summarises_every_member() {
        let people = seed_people();
        let projects = seed_projects();
        let logs = vec![
            worklog("u-1", "p-1", date(2025, 1, 6), 8.0, 40.0),
            worklog("u-2", "p-1", date(2025, 1, 6), 8.0, 80.0),
        ];
        let data = build_dashboard(&input(DashboardScope::Team, &people, &projects, &logs));

        assert!((data.overview().monthly_plan_mm - 2.1).abs() < 1e-9);
        assert!((data.overview().monthly_actual_mm - 0.75).abs() < 1e-9);
        let DashboardData::Team { team_summary, .. } = &data else {
            panic!("expected team dashboard");
        };
        assert_eq!(team_summary.len(), people.len());
        assert_eq!(team_summary[1].user_id, "u-2");
        assert!((team_summary[1].pa - 62.5).abs() < 1e-9);
        assert_eq!(team_summary[6].pa, 0.0);
    }

    #[test]
    fn test_dashboard_serializes_scope_tag_and_flattened_overview() {
        let people = seed_people();
        let projects = seed_projects();
        let data = build_dashboard(&input(DashboardScope::Team, &people, &projects, &[]));
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["scope"], "team");
        assert!(json["monthlyPlanMM"].is_number());
        assert!(json["burnupData"].is_array());
        assert!(json["teamSummary"].is_array());
    }

    #[tokio::test]
    async fn test_load_dashboard_from_seeded_store() {
        let store = MemoryPlanningStore::seeded();
        let data = load_dashboard(
            &store,
            DashboardScope::Personal,
            "u-4",
            "2025-02",
            date(2025, 2, 3),
        )
        .await
        .unwrap();
        assert!((data.overview().monthly_plan_mm - 0.9).abs() < 1e-9);
        assert_eq!(data.overview().burnup_data.len(), 10);
    }
}
