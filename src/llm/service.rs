//! The structured generation capability the interpreter depends on
//!
//! Anything that can turn a system instruction, a prompt and a response
//! schema into text can back the interpreter: the HTTP [`LlmClient`], or a
//! scripted stand-in in tests.
//!
//! [`LlmClient`]: crate::llm::client::LlmClient

use crate::core::error::Result;
use crate::llm::schema::ResponseSchema;
use async_trait::async_trait;

/// One schema-constrained generation call
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub schema: ResponseSchema,
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Run one generation. `Ok` carries the raw response text, `Err` the
    /// cause of a transport or service failure.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

#[async_trait]
impl<S: GenerationService + ?Sized> GenerationService for std::sync::Arc<S> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        (**self).generate(request).await
    }
}
