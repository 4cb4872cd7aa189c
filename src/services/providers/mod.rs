//! AI provider abstractions and implementations.
//!
//! This module provides a trait-based abstraction for multimodal providers,
//! allowing easy swapping between backends (Gemini, mock).

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// An image attached to a generation request.
#[derive(Debug, Clone)]
pub struct ImagePart {
    /// Declared media type, e.g. "image/jpeg".
    pub mime_type: String,

    /// Raw image bytes.
    pub data: Vec<u8>,
}

/// Generation parameters for AI requests.
#[derive(Debug, Clone, Default)]
pub struct GenerationParams {
    /// Temperature (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Maximum output tokens.
    pub max_output_tokens: Option<i32>,

    /// Ask the model for machine-readable JSON instead of prose.
    pub structured_json: bool,
}

/// Result of a provider call.
pub struct ProviderResponse {
    /// Generated text, absent when the model produced no text part.
    pub text: Option<String>,

    /// Input tokens consumed.
    pub input_tokens: i32,

    /// Output tokens generated.
    pub output_tokens: i32,

    /// Finish reason.
    pub finish_reason: FinishReason,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
    Error,
}

/// Trait for image-understanding providers (e.g., Gemini).
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Generate a text response from an instruction and an image.
    async fn generate(
        &self,
        instruction: &str,
        image: &ImagePart,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
