//! Provider clients built from validated credentials.

use rig::providers::{anthropic, openai};

use crate::domain::{DomainError, Result};
use crate::infrastructure::config::Credentials;

/// Shared by embeddings, transcription and the OpenAI LLM.
pub fn openai_client(credentials: &Credentials) -> Result<openai::Client> {
    let mut builder = openai::Client::builder().api_key(&credentials.openai_api_key);
    if let Some(base_url) = &credentials.openai_base_url {
        builder = builder.base_url(base_url);
    }
    builder
        .build()
        .map_err(|e| DomainError::configuration(format!("invalid OpenAI client: {e}")))
}

pub fn anthropic_client(credentials: &Credentials) -> Result<anthropic::Client> {
    let api_key = credentials
        .anthropic_api_key
        .as_deref()
        .ok_or_else(|| DomainError::configuration("Missing ANTHROPIC_API_KEY"))?;
    anthropic::Client::new(api_key)
        .map_err(|e| DomainError::configuration(format!("invalid Anthropic client: {e}")))
}
