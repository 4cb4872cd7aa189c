use serde::{Deserialize, Serialize};
use validator::Validate;

/// Structured verdict for one analyzed image.
///
/// This is both the shape the model is instructed to emit and the response
/// body of `POST /api/analyze-issue/`. A `severity_score` outside 1..=10
/// rejects the whole result; nothing is clamped.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IssueAnalysisResult {
    /// True if the image shows a reportable civic problem (pothole, water
    /// leak, garbage, broken street light, etc.).
    pub is_civic_issue: bool,

    /// Issue category, e.g. "Roads", "Water & Sanitation", "Waste
    /// Management", "Other", or "Not Applicable" for non-issues.
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub category: String,

    /// Severity on a 1-10 scale (1 = minor, 10 = critical).
    #[validate(range(min = 1, max = 10, message = "severity_score must be between 1 and 10"))]
    pub severity_score: i32,

    /// Short, punchy title, e.g. "Severe Pothole on Main Road".
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,

    /// 1-2 sentence description of the visible problem.
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
}
