//! The translation layer between an image upload and a model verdict:
//! fixed instruction, fence stripping, JSON decoding, schema validation.

use crate::dtos::IssueAnalysisResult;
use crate::error::AppError;
use anyhow::anyhow;
use validator::Validate;

/// Fixed instruction sent with every image. This is the entire definition
/// of "what counts as a civic issue".
pub const ANALYSIS_INSTRUCTION: &str = r#"
You are a senior city infrastructure inspector AI.

Your job is to analyze the uploaded image and determine whether it shows
a civic or infrastructure issue that needs to be reported to the local
municipal authority.

**Valid civic issues include** (but are not limited to):
- Potholes, cracked roads, damaged sidewalks
- Water leaks, broken pipes, sewage overflow
- Overflowing garbage bins, illegal dumping
- Broken or non-functional street lights
- Damaged public property (benches, signs, railings)
- Fallen trees blocking roads

**If the image does NOT show a civic issue** (e.g., a selfie, a pet photo,
food, a random object, a landscape with no problem), set `is_civic_issue`
to `false`, category to "Not Applicable", severity_score to 1, and provide
a brief explanation in the title and description.

You MUST respond with ONLY a valid JSON object matching this exact schema
(no markdown, no explanation, no extra text):

{
  "is_civic_issue": true or false,
  "category": "string",
  "severity_score": integer (1-10),
  "title": "string",
  "description": "string"
}
"#;

/// How much of a malformed model response is echoed back in errors.
const RAW_PREVIEW_LIMIT: usize = 500;

/// Strip a markdown code fence wrapping `raw`, if present.
///
/// The opening fence line is removed entirely (it may carry a language
/// tag); a trailing fence marker is removed when the text ends with one.
/// Text without fences passes through unchanged.
pub fn strip_markdown_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if text.starts_with("```") {
        text = match text.find('\n') {
            Some(newline) => &text[newline + 1..],
            None => &text[3..],
        };
    }

    let trimmed = text.trim_end();
    if let Some(stripped) = trimmed.strip_suffix("```") {
        text = stripped;
    }

    text.trim()
}

/// Decode and validate a raw model response into an [`IssueAnalysisResult`].
///
/// Non-JSON text is a `ParseError` carrying a bounded prefix of the raw
/// response; well-formed JSON that does not match the schema (missing
/// fields, wrong types, out-of-range severity) is a `ValidationError`.
pub fn parse_analysis(raw: &str) -> Result<IssueAnalysisResult, AppError> {
    let text = strip_markdown_fences(raw);

    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| {
        AppError::ParseError(anyhow!(
            "{}. Raw response: {}",
            e,
            raw_preview(raw)
        ))
    })?;

    let result: IssueAnalysisResult = serde_json::from_value(value)
        .map_err(|e| AppError::ValidationError(anyhow!("{}", e)))?;

    result.validate()?;

    Ok(result)
}

/// Bounded prefix of `raw` for error messages, cut at a char boundary.
fn raw_preview(raw: &str) -> &str {
    if raw.len() <= RAW_PREVIEW_LIMIT {
        return raw;
    }
    let mut end = RAW_PREVIEW_LIMIT;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    &raw[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_JSON: &str = r#"{"is_civic_issue":true,"category":"Roads","severity_score":8,"title":"Large pothole","description":"A deep pothole spans the right lane."}"#;

    #[test]
    fn unfenced_text_passes_through() {
        assert_eq!(strip_markdown_fences(VALID_JSON), VALID_JSON);
    }

    #[test]
    fn strips_tagged_fence() {
        let fenced = format!("```json\n{}\n```", VALID_JSON);
        assert_eq!(strip_markdown_fences(&fenced), VALID_JSON);
    }

    #[test]
    fn strips_bare_fence() {
        let fenced = format!("```\n{}\n```", VALID_JSON);
        assert_eq!(strip_markdown_fences(&fenced), VALID_JSON);
    }

    #[test]
    fn strips_fence_without_newline() {
        assert_eq!(strip_markdown_fences("```{}```"), "{}");
    }

    #[test]
    fn tolerates_trailing_whitespace_after_fence() {
        let fenced = format!("```json\n{}\n```  \n", VALID_JSON);
        assert_eq!(strip_markdown_fences(&fenced), VALID_JSON);
    }

    #[test]
    fn parses_valid_result() {
        let result = parse_analysis(VALID_JSON).expect("should parse");
        assert!(result.is_civic_issue);
        assert_eq!(result.category, "Roads");
        assert_eq!(result.severity_score, 8);
    }

    #[test]
    fn parses_fenced_result_same_as_unfenced() {
        let fenced = format!("```json\n{}\n```", VALID_JSON);
        let a = parse_analysis(VALID_JSON).expect("unfenced should parse");
        let b = parse_analysis(&fenced).expect("fenced should parse");
        assert_eq!(a.severity_score, b.severity_score);
        assert_eq!(a.title, b.title);
    }

    #[test]
    fn accepts_severity_bounds() {
        for severity in [1, 10] {
            let raw = format!(
                r#"{{"is_civic_issue":false,"category":"Not Applicable","severity_score":{},"title":"No issue","description":"A photo of a cat."}}"#,
                severity
            );
            assert!(parse_analysis(&raw).is_ok(), "severity {} should pass", severity);
        }
    }

    #[test]
    fn rejects_severity_out_of_range() {
        for severity in [0, 11] {
            let raw = format!(
                r#"{{"is_civic_issue":true,"category":"Roads","severity_score":{},"title":"t","description":"d"}}"#,
                severity
            );
            let err = parse_analysis(&raw).expect_err("out-of-range severity must fail");
            assert!(matches!(err, AppError::ValidationError(_)), "got {:?}", err);
        }
    }

    #[test]
    fn rejects_missing_field_as_validation_error() {
        let raw = r#"{"is_civic_issue":true,"category":"Roads","severity_score":5,"title":"t"}"#;
        let err = parse_analysis(raw).expect_err("missing description must fail");
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn rejects_empty_category() {
        let raw = r#"{"is_civic_issue":true,"category":"","severity_score":5,"title":"t","description":"d"}"#;
        let err = parse_analysis(raw).expect_err("empty category must fail");
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn malformed_json_error_carries_raw_prefix() {
        let raw = "The image shows a pothole, here is my analysis:";
        let err = parse_analysis(raw).expect_err("prose must fail");
        assert!(matches!(err, AppError::ParseError(_)));
        assert!(err.to_string().contains("The image shows a pothole"));
    }

    #[test]
    fn raw_preview_is_bounded_and_on_char_boundary() {
        let long = format!("{}é", "x".repeat(RAW_PREVIEW_LIMIT - 1));
        let preview = raw_preview(&long);
        assert!(preview.len() <= RAW_PREVIEW_LIMIT);
        assert!(long.starts_with(preview));
    }
}
