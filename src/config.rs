//! Engine defaults for the AI completion task.

/// Fallback model parameters applied when a node leaves them unset.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub default_model: String,
    pub default_max_tokens: u32,
    pub default_temperature: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_model: "gpt-4o-mini".to_string(),
            default_max_tokens: 1024,
            default_temperature: 0.7,
        }
    }
}

impl EngineConfig {
    /// Read defaults from the environment, falling back to the built-ins
    /// for anything unset or unparsable.
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            default_model: std::env::var("AIFLOW_DEFAULT_MODEL").unwrap_or(base.default_model),
            default_max_tokens: std::env::var("AIFLOW_DEFAULT_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.default_max_tokens),
            default_temperature: std::env::var("AIFLOW_DEFAULT_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.default_temperature),
        }
    }
}
