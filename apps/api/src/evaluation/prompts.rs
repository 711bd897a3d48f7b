// Prompt constants for evaluation drafting.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for monthly evaluation comments. Append `JSON_ONLY_SYSTEM`.
pub const MONTHLY_REPORT_SYSTEM: &str = "You are an HR performance analyst. \
    Write a monthly performance report for a team member from a set of scored \
    evaluation criteria. Write a comment for EVERY criterion and one overall summary.";

/// Monthly report prompt template.
/// Replace: {user_name}, {month}, {criteria_scores}, {criteria_schema}, {language_instruction}
pub const MONTHLY_REPORT_PROMPT_TEMPLATE: &str = r#"Write professional, constructive performance evaluation comments for '{user_name}' for the month of {month}.

Base every comment on the scores below.

EVALUATION SCORES:
{criteria_scores}

RULES:
- Each criterion comment must reflect its score. High scores get specific praise, low scores get constructive feedback.
- The final comment summarises the individual points into one overview of strengths and areas for development.
- Every criterion key below MUST be present with a non-empty comment.
- {language_instruction}

Return a JSON object with this EXACT schema (no extra fields):
{
  "criteriaComments": {
{criteria_schema}
  },
  "finalComment": "overall summary"
}"#;

/// System prompt for the annual report. Free text, not JSON.
pub const ANNUAL_REPORT_SYSTEM: &str = "You are a senior HR manager summarising a team \
    member's annual performance. Be comprehensive and strategic, and focus on long-term \
    growth and contribution.";

/// Annual report prompt template.
/// Replace: {user_name}, {year}, {monthly_summaries}, {language_instruction}
pub const ANNUAL_REPORT_PROMPT_TEMPLATE: &str = r#"Write a comprehensive annual performance report for '{user_name}' for the year {year}.

Analyse performance trends, identify recurring strengths and weaknesses, and give a strategic outlook for the coming year.

MONTHLY EVALUATION DATA:
{monthly_summaries}

REPORT STRUCTURE:
1. Annual Performance Summary: overall achievements and contributions of the year.
2. Performance Trends & Patterns: is performance consistent, which areas improved over time, which challenges recur.
3. Key Accomplishments & Strengths: the most significant strengths shown across the year.
4. Strategic Development Goals for Next Year: two or three high-level goals based on the patterns above.

{language_instruction}"#;

/// Monthly entry of the annual prompt.
/// Replace: {month}, {average_score}, {final_comment}
pub const ANNUAL_MONTH_ENTRY_TEMPLATE: &str = r#"### {month}
- Average Score: {average_score}/5.0
- Manager's Comment: "{final_comment}""#;

/// Returned instead of an annual report when the year has no evaluations.
pub const NO_ANNUAL_DATA_MESSAGE: &str =
    "선택된 연도에 대한 평가 데이터가 없어 연간 리포트를 생성할 수 없습니다.";
