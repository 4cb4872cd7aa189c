use crate::error::AppError;
use crate::services::analysis::{parse_analysis, ANALYSIS_INSTRUCTION};
use crate::services::providers::{GenerationParams, ImagePart};
use crate::startup::AppState;
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};

/// Media types the endpoint accepts.
const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/heic",
    "image/heif",
];

/// Maximum accepted upload size, inclusive.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Sampling temperature for analysis calls. Low to keep verdicts stable
/// across retries of the same image.
const ANALYSIS_TEMPERATURE: f32 = 0.2;

/// Accept an uploaded image, send it to the model for analysis, and return
/// a validated `IssueAnalysisResult`.
///
/// Validation is sequential and the first failure wins: media type, read,
/// non-empty, size cap. A single model call follows; there is no retry.
pub async fn analyze_issue(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| {
            AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
        })?
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("No file uploaded")))?;

    let mime_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    if !ALLOWED_IMAGE_TYPES.contains(&mime_type.as_str()) {
        return Err(AppError::UnsupportedMediaType(format!(
            "Unsupported file type: {}. Allowed types: {}",
            mime_type,
            ALLOWED_IMAGE_TYPES.join(", ")
        )));
    }

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Failed to read uploaded file: {}", e)))?
        .to_vec();

    if data.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Uploaded file is empty"
        )));
    }

    if data.len() > MAX_IMAGE_BYTES {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "File too large. Maximum allowed size is 10 MB"
        )));
    }

    tracing::info!(
        mime_type = %mime_type,
        size = data.len(),
        "Analyzing uploaded image"
    );

    let image = ImagePart {
        mime_type,
        data,
    };
    let params = GenerationParams {
        temperature: Some(ANALYSIS_TEMPERATURE),
        structured_json: true,
        ..Default::default()
    };

    let response = state
        .vision_provider
        .generate(ANALYSIS_INSTRUCTION, &image, &params)
        .await
        .map_err(|e| AppError::UpstreamError(anyhow::anyhow!("{}", e)))?;

    tracing::debug!(
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        "Model call completed"
    );

    let raw = response
        .text
        .ok_or_else(|| AppError::UpstreamError(anyhow::anyhow!("Model returned no text content")))?;

    let result = parse_analysis(&raw)?;

    Ok(Json(result))
}
