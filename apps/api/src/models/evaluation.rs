use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Highest score a criterion can receive.
pub const MAX_SCORE: f64 = 5.0;

/// Score given to every criterion of a freshly drafted evaluation.
pub const NEUTRAL_SCORE: f64 = 3.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum EvaluationCriterion {
    WorkPerformance,
    TaskCompletion,
    Collaboration,
    ProblemSolving,
    Development,
    WorkAttitude,
    CultureFit,
}

impl EvaluationCriterion {
    pub const ALL: [EvaluationCriterion; 7] = [
        EvaluationCriterion::WorkPerformance,
        EvaluationCriterion::TaskCompletion,
        EvaluationCriterion::Collaboration,
        EvaluationCriterion::ProblemSolving,
        EvaluationCriterion::Development,
        EvaluationCriterion::WorkAttitude,
        EvaluationCriterion::CultureFit,
    ];

    /// Wire key, matching the serde representation.
    pub fn key(&self) -> &'static str {
        match self {
            EvaluationCriterion::WorkPerformance => "workPerformance",
            EvaluationCriterion::TaskCompletion => "taskCompletion",
            EvaluationCriterion::Collaboration => "collaboration",
            EvaluationCriterion::ProblemSolving => "problemSolving",
            EvaluationCriterion::Development => "development",
            EvaluationCriterion::WorkAttitude => "workAttitude",
            EvaluationCriterion::CultureFit => "cultureFit",
        }
    }

    /// Display label used on evaluation forms and in generation prompts.
    pub fn label(&self) -> &'static str {
        match self {
            EvaluationCriterion::WorkPerformance => "업무 성과",
            EvaluationCriterion::TaskCompletion => "과업 완성도",
            EvaluationCriterion::Collaboration => "협업 및 커뮤니케이션",
            EvaluationCriterion::ProblemSolving => "문제 해결 능력",
            EvaluationCriterion::Development => "개발 역량 및 성장",
            EvaluationCriterion::WorkAttitude => "업무 태도",
            EvaluationCriterion::CultureFit => "조직 문화 기여",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EvaluationStatus {
    Draft,
    Confirmed,
}

impl EvaluationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationStatus::Draft => "Draft",
            EvaluationStatus::Confirmed => "Confirmed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Draft" => Some(EvaluationStatus::Draft),
            "Confirmed" => Some(EvaluationStatus::Confirmed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CriterionScore {
    pub score: f64,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectEffort {
    pub name: String,
    pub mm: f64,
}

/// Effort figures attached to a monthly evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationMetrics {
    #[serde(rename = "planMM")]
    pub plan_mm: f64,
    #[serde(rename = "actualMM")]
    pub actual_mm: f64,
    #[serde(rename = "deltaMM")]
    pub delta_mm: f64,
    pub pa: f64,
    pub direct_share: f64,
    pub top_projects: Vec<ProjectEffort>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub id: String,
    pub user_id: String,
    /// `YYYY-MM`
    pub month: String,
    pub status: EvaluationStatus,
    pub metrics: EvaluationMetrics,
    pub criteria: BTreeMap<EvaluationCriterion, CriterionScore>,
    #[serde(default)]
    pub final_comment: String,
}

impl Evaluation {
    /// Deterministic id for a person's evaluation of one month.
    pub fn id_for(user_id: &str, month: &str) -> String {
        format!("eval-{user_id}-{month}")
    }

    /// Mean score over the criteria present; zero when none are scored.
    pub fn average_score(&self) -> f64 {
        if self.criteria.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.criteria.values().map(|c| c.score).sum();
        sum / self.criteria.len() as f64
    }

    pub fn validate(&self) -> Result<(), String> {
        if crate::month::parse_month(&self.month).is_none() {
            return Err(format!("month '{}' is not a YYYY-MM month", self.month));
        }
        for criterion in EvaluationCriterion::ALL {
            let Some(entry) = self.criteria.get(&criterion) else {
                return Err(format!("criterion '{}' is missing", criterion.key()));
            };
            if !entry.score.is_finite() || !(0.0..=MAX_SCORE).contains(&entry.score) {
                return Err(format!(
                    "criterion '{}' score must be between 0 and {MAX_SCORE}",
                    criterion.key()
                ));
            }
        }
        Ok(())
    }
}

/// Criteria map with every criterion at `score` and no comment.
pub fn uniform_criteria(score: f64) -> BTreeMap<EvaluationCriterion, CriterionScore> {
    EvaluationCriterion::ALL
        .into_iter()
        .map(|c| {
            (
                c,
                CriterionScore {
                    score,
                    comment: String::new(),
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluation() -> Evaluation {
        Evaluation {
            id: Evaluation::id_for("u-1", "2025-03"),
            user_id: "u-1".to_string(),
            month: "2025-03".to_string(),
            status: EvaluationStatus::Draft,
            metrics: EvaluationMetrics::default(),
            criteria: uniform_criteria(NEUTRAL_SCORE),
            final_comment: String::new(),
        }
    }

    #[test]
    fn test_criteria_serialize_with_camel_case_keys() {
        let json = serde_json::to_value(evaluation()).unwrap();
        assert_eq!(json["criteria"]["workPerformance"]["score"], 3.0);
        assert_eq!(json["criteria"]["cultureFit"]["comment"], "");
        assert_eq!(json["metrics"]["planMM"], 0.0);
        assert_eq!(json["finalComment"], "");
    }

    #[test]
    fn test_criterion_key_matches_serde() {
        for c in EvaluationCriterion::ALL {
            let json = serde_json::to_string(&c).unwrap();
            assert_eq!(json, format!("\"{}\"", c.key()));
        }
    }

    #[test]
    fn test_average_score() {
        let mut eval = evaluation();
        eval.criteria
            .get_mut(&EvaluationCriterion::CultureFit)
            .unwrap()
            .score = 5.0;
        // six at 3.0 and one at 5.0
        assert!((eval.average_score() - 23.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_validate_requires_every_criterion() {
        let mut eval = evaluation();
        assert!(eval.validate().is_ok());
        eval.criteria.remove(&EvaluationCriterion::Development);
        assert!(eval.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_score_above_max() {
        let mut eval = evaluation();
        eval.criteria
            .get_mut(&EvaluationCriterion::Collaboration)
            .unwrap()
            .score = 5.5;
        assert!(eval.validate().is_err());
    }
}
