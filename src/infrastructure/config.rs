use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::domain::{DomainError, Result};

pub const CONFIG_DIR_ENV: &str = "RAG_CONFIG_DIR";
const DEFAULT_CONFIG_DIR: &str = "config";

/// Everything the server needs at startup: runtime settings plus prompt texts.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub config: Config,
    pub prompts: PromptsConfig,
}

impl AppConfig {
    /// Loads `config.yaml` and `prompts.yaml` from `RAG_CONFIG_DIR` (default
    /// `./config`), applies environment overrides and validates the result.
    pub fn load() -> Result<Self> {
        let dir = std::env::var(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR));
        Self::load_from_dir(&dir)
    }

    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let mut config: Config = read_yaml_or_default(&dir.join("config.yaml"))?;
        let prompts: PromptsConfig = read_yaml_or_default(&dir.join("prompts.yaml"))?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(Self { config, prompts })
    }
}

fn read_yaml_or_default<T>(path: &Path) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Default,
{
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(T::default());
    }

    let raw = std::fs::read_to_string(path).map_err(|e| {
        DomainError::configuration(format!("failed to read {}: {e}", path.display()))
    })?;
    serde_yaml::from_str(&raw).map_err(|e| {
        DomainError::configuration(format!("failed to parse {}: {e}", path.display()))
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub transcription: TranscriptionConfig,
    pub vector_store: VectorStoreConfig,
    pub chunking: ChunkingConfig,
    pub rag: RagConfig,
    pub preprocessing: PreprocessingConfig,
    pub cors: CorsConfig,
}

impl Config {
    fn apply_env_overrides(&mut self) -> Result<()> {
        override_from_env("SERVER_HOST", &mut self.server.host)?;
        override_from_env("SERVER_PORT", &mut self.server.port)?;
        override_from_env("QDRANT_URL", &mut self.vector_store.url)?;
        override_from_env("QDRANT_COLLECTION", &mut self.vector_store.collection)?;
        override_from_env("LLM_PROVIDER", &mut self.llm.provider)?;
        override_from_env("LLM_MODEL", &mut self.llm.model)?;
        override_from_env("EMBEDDING_MODEL", &mut self.embedding.model)?;
        override_from_env("EMBEDDING_DIMENSION", &mut self.embedding.dimension)?;
        override_from_env("RAG_TOP_K", &mut self.rag.top_k)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(DomainError::configuration(
                "chunking.chunk_size must be greater than 0",
            ));
        }
        if self.chunking.overlap >= self.chunking.chunk_size {
            return Err(DomainError::configuration(format!(
                "chunking.overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.overlap, self.chunking.chunk_size
            )));
        }
        if self.rag.top_k == 0 {
            return Err(DomainError::configuration("rag.top_k must be greater than 0"));
        }
        if self.embedding.dimension == 0 {
            return Err(DomainError::configuration(
                "embedding.dimension must be greater than 0",
            ));
        }
        if self.vector_store.upsert_batch_size == 0 {
            return Err(DomainError::configuration(
                "vector_store.upsert_batch_size must be greater than 0",
            ));
        }
        if self.embedding.batch_size == 0 {
            return Err(DomainError::configuration(
                "embedding.batch_size must be greater than 0",
            ));
        }
        Ok(())
    }
}

fn override_from_env<T>(key: &str, target: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Ok(value) = std::env::var(key) {
        *target = value
            .parse()
            .map_err(|e| DomainError::configuration(format!("invalid {key}: {e}")))?;
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 50020,
            static_dir: PathBuf::from("static"),
            max_body_bytes: 50 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    OpenAi,
    Anthropic,
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(format!("unknown llm provider `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub max_tokens: u64,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAi,
            model: "gpt-4o-mini".to_string(),
            max_tokens: 300,
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimension: 384,
            batch_size: 64,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub model: String,
    pub file_suffix: String,
    /// Where uploaded audio is spooled; the system temp dir when unset.
    pub temp_dir: Option<PathBuf>,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini-transcribe".to_string(),
            file_suffix: ".webm".to_string(),
            temp_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorStoreProvider {
    Qdrant,
    InMemory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub provider: VectorStoreProvider,
    pub url: String,
    pub collection: String,
    /// Records per upsert request; keeps large uploads under the store's
    /// request size limit.
    pub upsert_batch_size: usize,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            provider: VectorStoreProvider::Qdrant,
            url: String::new(),
            collection: "knowledge_base".to_string(),
            upsert_batch_size: 256,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub top_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    pub remove_stopwords: bool,
    pub lowercase: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Texts used by the answer generator. `{question}` and `{context}` are
/// substituted at render time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub rag: RagPrompts,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub grounding: String,
    pub no_results: String,
    pub retrieval_failed: String,
    pub fallback: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            grounding: "You are a helpful assistant. Use only the context below to answer the \
                        user's question. If the answer is not present, respond with: \
                        'I don't know.'\n\nContext:\n{context}\n\nQuestion: {question}\n\
                        Answer concisely:"
                .to_string(),
            no_results: "Sorry, I couldn't find relevant info for: {question}".to_string(),
            retrieval_failed: "Failed to retrieve context for: {question}".to_string(),
            fallback: "Your question: {question}\n\nRelevant context:\n{context}".to_string(),
        }
    }
}

/// API keys and endpoints read from the environment. Startup aborts when a
/// key required by the active configuration is missing.
#[derive(Clone)]
pub struct Credentials {
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub qdrant_api_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &"<redacted>")
            .field("openai_base_url", &self.openai_base_url)
            .field(
                "anthropic_api_key",
                &self.anthropic_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field(
                "qdrant_api_key",
                &self.qdrant_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl Credentials {
    pub fn from_env(config: &Config) -> Result<Self> {
        Self::from_lookup(config, |key| std::env::var(key).ok())
    }

    pub fn from_lookup(config: &Config, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| DomainError::configuration(format!("Missing {key}")))
        };

        let openai_api_key = require("OPENAI_API_KEY")?;

        let anthropic_api_key = match config.llm.provider {
            LlmProvider::Anthropic => Some(require("ANTHROPIC_API_KEY")?),
            LlmProvider::OpenAi => None,
        };

        if config.vector_store.provider == VectorStoreProvider::Qdrant
            && config.vector_store.url.trim().is_empty()
        {
            return Err(DomainError::configuration("Missing QDRANT_URL"));
        }

        Ok(Self {
            openai_api_key,
            openai_base_url: get("OPENAI_BASE_URL"),
            anthropic_api_key,
            qdrant_api_key: get("QDRANT_API_KEY"),
        })
    }
}
