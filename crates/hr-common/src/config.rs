use std::str::FromStr;

use crate::embedding::EmbeddingConfig;
use crate::generation::GenerationConfig;
use crate::query::StripPolicy;

/// Parse an environment variable, treating unset and unparsable values alike.
pub(crate) fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|raw| raw.trim().parse().ok())
}

/// Retrieval engine settings. Defaults run fully offline: hash embeddings and the
/// template generator.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
    pub strip_policy: StripPolicy,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            embedding: EmbeddingConfig::from_env(),
            generation: GenerationConfig::from_env(),
            strip_policy: env_parse("HR_STRIP_POLICY").unwrap_or_default(),
        }
    }
}
