//! Seed roster and project list used by the in-memory store.

use chrono::NaiveDate;

use crate::models::person::Person;
use crate::models::project::{
    MonthlyPlan, PlanSource, Project, ProjectStatus, ProjectType, Release,
};

fn person(id: &str, name: &str, role: &str) -> Person {
    Person {
        id: id.to_string(),
        name: name.to_string(),
        avatar: format!("https://i.pravatar.cc/40?u={id}"),
        role: role.to_string(),
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn plan(entries: &[(&str, &str, f64)]) -> MonthlyPlan {
    let mut plan = MonthlyPlan::new();
    for (month, person_id, mm) in entries {
        plan.entry(month.to_string())
            .or_default()
            .insert(person_id.to_string(), *mm);
    }
    plan
}

pub fn seed_people() -> Vec<Person> {
    vec![
        person("u-1", "Ko Eunyoung", "Team Lead"),
        person("u-2", "Kim Eunji", "Manager"),
        person("u-3", "Kim Jeongho", "Assistant Manager"),
        person("u-4", "Lee Minju", "Staff"),
        person("u-5", "Ryu Dongha", "Staff"),
        person("u-6", "Shin Eunyoung", "Manager"),
        person("u-7", "Jung Soyul", "Staff"),
    ]
}

pub fn seed_projects() -> Vec<Project> {
    vec![
        Project {
            id: "p-1".to_string(),
            name: "Project Alpha".to_string(),
            project_type: ProjectType::Project,
            status: ProjectStatus::Active,
            color: "#3B82F6".to_string(),
            assignee_ids: vec!["u-1".into(), "u-2".into(), "u-4".into()],
            start_date: date(2025, 1, 1),
            end_date: date(2025, 12, 31),
            monthly_plan: plan(&[
                ("2025-01", "u-1", 0.5),
                ("2025-01", "u-2", 0.8),
                ("2025-02", "u-1", 0.6),
                ("2025-02", "u-2", 0.7),
                ("2025-02", "u-4", 0.2),
            ]),
            plan_source: Some(PlanSource {
                doc_title: "Project Alpha Plan".to_string(),
                doc_version: "v1.2".to_string(),
            }),
            release: Some(Release {
                name: "Project Alpha v1.2".to_string(),
                due: date(2025, 8, 15),
                total: 20,
                closed: 15,
                late_days: Some(5),
            }),
        },
        Project {
            id: "p-2".to_string(),
            name: "Project Bravo".to_string(),
            project_type: ProjectType::Project,
            status: ProjectStatus::Active,
            color: "#10B981".to_string(),
            assignee_ids: vec!["u-1".into(), "u-3".into(), "u-5".into()],
            start_date: date(2025, 3, 1),
            end_date: date(2025, 9, 30),
            monthly_plan: plan(&[
                ("2025-03", "u-1", 0.4),
                ("2025-03", "u-3", 1.0),
                ("2025-03", "u-5", 0.5),
            ]),
            plan_source: Some(PlanSource {
                doc_title: "Project Bravo Proposal".to_string(),
                doc_version: "v1.0".to_string(),
            }),
            release: None,
        },
        Project {
            id: "p-3".to_string(),
            name: "Design System".to_string(),
            project_type: ProjectType::Direct,
            status: ProjectStatus::Active,
            color: "#8B5CF6".to_string(),
            assignee_ids: vec!["u-4".into()],
            start_date: date(2025, 1, 1),
            end_date: date(2025, 12, 31),
            monthly_plan: plan(&[("2025-01", "u-4", 0.8), ("2025-02", "u-4", 0.7)]),
            plan_source: None,
            release: None,
        },
        Project {
            id: "p-4".to_string(),
            name: "Legacy Maintenance".to_string(),
            project_type: ProjectType::Direct,
            status: ProjectStatus::Archived,
            color: "#6B7280".to_string(),
            assignee_ids: vec!["u-2".into(), "u-5".into()],
            start_date: date(2024, 1, 1),
            end_date: date(2024, 12, 31),
            monthly_plan: MonthlyPlan::new(),
            plan_source: None,
            release: None,
        },
    ]
}
