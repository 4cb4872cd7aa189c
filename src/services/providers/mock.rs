//! Mock provider implementation for testing.

use super::{
    FinishReason, GenerationParams, ImagePart, ProviderError, ProviderResponse, VisionProvider,
};
use async_trait::async_trait;

/// Mock vision provider for testing.
///
/// Replies with a canned text, or fails every call with a canned API error.
pub struct MockVisionProvider {
    reply: Result<String, String>,
}

impl MockVisionProvider {
    /// A provider that answers every request with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
        }
    }

    /// A provider that fails every request with an API error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
        }
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    async fn generate(
        &self,
        instruction: &str,
        _image: &ImagePart,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        match &self.reply {
            Ok(text) => Ok(ProviderResponse {
                text: Some(text.clone()),
                input_tokens: instruction.len() as i32 / 4,
                output_tokens: text.len() as i32 / 4,
                finish_reason: FinishReason::Complete,
            }),
            Err(message) => Err(ProviderError::ApiError(message.clone())),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        match &self.reply {
            Ok(_) => Ok(()),
            Err(message) => Err(ProviderError::ApiError(message.clone())),
        }
    }
}
