pub mod openai;
pub mod template;

use std::sync::Arc;
use std::time::Duration;

use strum::{AsRefStr, EnumString};
use thiserror::Error;
use tracing::info;

use crate::config::env_parse;
use crate::context::GenerationPayload;
use crate::worker::{BoundedExecutor, ExecError};

pub use openai::OpenAiChatGenerator;
pub use template::TemplateGenerator;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Request(String),
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
    #[error("invalid generation response: {0}")]
    InvalidResponse(String),
    #[error("generation configuration error: {0}")]
    Config(String),
}

/// Turns a generation payload into prose. Implementations may block.
pub trait Generator: Send + Sync {
    fn name(&self) -> &'static str;

    fn generate(&self, payload: &GenerationPayload) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GeneratorKind {
    Template,
    #[strum(serialize = "openai")]
    OpenAi,
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub kind: GeneratorKind,
    pub workers: usize,
    pub timeout: Duration,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            kind: GeneratorKind::Template,
            workers: 2,
            timeout: Duration::from_secs(30),
            api_key: None,
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            max_tokens: 512,
            temperature: 0.7,
        }
    }
}

impl GenerationConfig {
    /// Read `HR_GENERATOR`, `HR_GENERATION_*` and `OPENAI_*` variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            kind: env_parse("HR_GENERATOR").unwrap_or(defaults.kind),
            workers: env_parse("HR_GENERATION_WORKERS")
                .filter(|w| *w > 0)
                .unwrap_or(defaults.workers),
            timeout: env_parse("HR_GENERATION_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            base_url: std::env::var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            model: std::env::var("HR_GENERATION_MODEL").unwrap_or(defaults.model),
            max_tokens: env_parse("HR_GENERATION_MAX_TOKENS").unwrap_or(defaults.max_tokens),
            temperature: env_parse("HR_GENERATION_TEMPERATURE").unwrap_or(defaults.temperature),
        }
    }
}

pub fn create_generator(config: &GenerationConfig) -> Result<Arc<dyn Generator>, GenerationError> {
    let generator: Arc<dyn Generator> = match config.kind {
        GeneratorKind::Template => Arc::new(TemplateGenerator),
        GeneratorKind::OpenAi => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                GenerationError::Config("OPENAI_API_KEY is required for HR_GENERATOR=openai".into())
            })?;
            Arc::new(OpenAiChatGenerator::new(api_key, config)?)
        }
    };
    info!(generator = generator.name(), "generator ready");
    Ok(generator)
}

fn exec_error(err: ExecError) -> GenerationError {
    match err {
        ExecError::Timeout(after) => GenerationError::Timeout(after),
        other => GenerationError::Request(other.to_string()),
    }
}

/// Bounded, time-limited access to a [`Generator`].
#[derive(Clone)]
pub struct GenerationGate {
    generator: Arc<dyn Generator>,
    executor: BoundedExecutor,
}

impl GenerationGate {
    pub fn new(generator: Arc<dyn Generator>, workers: usize, timeout: Duration) -> Self {
        Self {
            generator,
            executor: BoundedExecutor::new(workers, timeout),
        }
    }

    pub fn generator(&self) -> &Arc<dyn Generator> {
        &self.generator
    }

    pub async fn generate(&self, payload: GenerationPayload) -> Result<String, GenerationError> {
        let generator = Arc::clone(&self.generator);
        self.executor
            .run(move || generator.generate(&payload))
            .await
            .map_err(exec_error)?
    }
}
