use std::time::Duration;

use strum::{AsRefStr, EnumString};

use crate::config::env_parse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EmbedderKind {
    Hash,
    #[strum(serialize = "openai")]
    OpenAi,
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub kind: EmbedderKind,
    /// Vector length. Powers of two work best for the hash encoder (256, 512, 1024).
    pub dimension: usize,
    /// Concurrent embedding calls allowed through the pool.
    pub workers: usize,
    /// Per-request budget for a query embedding.
    pub timeout: Duration,
    /// Budget for embedding the whole directory on load/reload.
    pub reload_timeout: Duration,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            kind: EmbedderKind::Hash,
            dimension: 256,
            workers: 4,
            timeout: Duration::from_millis(2_000),
            reload_timeout: Duration::from_secs(120),
            api_key: None,
            base_url: "https://api.openai.com/v1".into(),
            model: "text-embedding-3-small".into(),
        }
    }
}

impl EmbeddingConfig {
    /// Read `HR_EMBEDDER`, `HR_EMBEDDING_*` and `OPENAI_*` variables; unset or unparsable
    /// values keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            kind: env_parse("HR_EMBEDDER").unwrap_or(defaults.kind),
            dimension: env_parse("HR_EMBEDDING_DIMENSION")
                .filter(|d| *d > 0)
                .unwrap_or(defaults.dimension),
            workers: env_parse("HR_EMBEDDING_WORKERS")
                .filter(|w| *w > 0)
                .unwrap_or(defaults.workers),
            timeout: env_parse("HR_EMBEDDING_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
            reload_timeout: env_parse("HR_EMBEDDING_RELOAD_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.reload_timeout),
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            base_url: std::env::var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            model: std::env::var("HR_EMBEDDING_MODEL").unwrap_or(defaults.model),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_embedder_kind() {
        assert_eq!("hash".parse::<EmbedderKind>().ok(), Some(EmbedderKind::Hash));
        assert_eq!("OpenAI".parse::<EmbedderKind>().ok(), Some(EmbedderKind::OpenAi));
        assert!("candle".parse::<EmbedderKind>().is_err());
    }
}
