//! Configuration loading, validation, and management for OpenClaw.
//!
//! Loads configuration from `~/.openclaw/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use openclaw_core::agent::{AgentConfig, Persona, UserProfile};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.openclaw/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language-model backend
    #[serde(default)]
    pub model: ModelConfig,

    /// Long-term memory
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Short-term context window
    #[serde(default)]
    pub context: ContextConfig,

    /// Web search tool
    #[serde(default)]
    pub search: SearchConfig,

    /// To-do list tools
    #[serde(default)]
    pub todo: TodoConfig,

    /// Per-call timeouts for external backends
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Reasoning loop behavior
    #[serde(default)]
    pub agent: AgentLoopConfig,

    /// Initial agent persona
    #[serde(default)]
    pub persona: Persona,

    /// Initial user profile
    #[serde(default)]
    pub user: UserProfile,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_model_name")]
    pub name: String,

    /// Temperature for structured reasoning calls
    #[serde(default = "default_json_temperature")]
    pub json_temperature: f32,

    /// Temperature for plain synthesis calls
    #[serde(default = "default_plain_temperature")]
    pub plain_temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_provider() -> String {
    "ollama".into()
}
fn default_api_url() -> String {
    "http://localhost:11434/v1".into()
}
fn default_model_name() -> String {
    "gemma:2b".into()
}
fn default_json_temperature() -> f32 {
    0.2
}
fn default_plain_temperature() -> f32 {
    0.4
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_url: default_api_url(),
            api_key: None,
            name: default_model_name(),
            json_temperature: default_json_temperature(),
            plain_temperature: default_plain_temperature(),
            max_tokens: None,
        }
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("name", &self.name)
            .field("json_temperature", &self.json_temperature)
            .field("plain_temperature", &self.plain_temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// "file", "in_memory", or "none"
    #[serde(default = "default_memory_backend")]
    pub backend: String,

    /// JSONL file for the "file" backend (default: ~/.openclaw/memory/vectors.jsonl)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// "hash" (offline) or "provider"
    #[serde(default = "default_embedder")]
    pub embedder: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Dimensions for the hash embedder
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,

    /// Memories recalled per turn
    #[serde(default = "default_recall_limit")]
    pub recall_limit: usize,

    /// Upper bound on a model-requested fact
    #[serde(default = "default_max_fact_chars")]
    pub max_fact_chars: usize,
}

fn default_memory_backend() -> String {
    "file".into()
}
fn default_embedder() -> String {
    "hash".into()
}
fn default_embedding_model() -> String {
    "all-minilm".into()
}
fn default_embedding_dimensions() -> usize {
    256
}
fn default_recall_limit() -> usize {
    2
}
fn default_max_fact_chars() -> usize {
    500
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: default_memory_backend(),
            path: None,
            embedder: default_embedder(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: default_embedding_dimensions(),
            recall_limit: default_recall_limit(),
            max_fact_chars: default_max_fact_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Maximum messages kept in the short-term window
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    6
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// "duckduckgo" or "none"
    #[serde(default = "default_search_backend")]
    pub backend: String,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Snippets shorter than this are dropped
    #[serde(default = "default_min_snippet_chars")]
    pub min_snippet_chars: usize,
}

fn default_search_backend() -> String {
    "duckduckgo".into()
}
fn default_max_results() -> usize {
    3
}
fn default_min_snippet_chars() -> usize {
    40
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: default_search_backend(),
            max_results: default_max_results(),
            min_snippet_chars: default_min_snippet_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoConfig {
    /// JSON file (default: ~/.openclaw/todo.json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Minimum fuzzy similarity for `complete_todo`
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f32,
}

fn default_match_threshold() -> f32 {
    0.6
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            path: None,
            match_threshold: default_match_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_model_secs")]
    pub model_secs: u64,

    #[serde(default = "default_memory_secs")]
    pub memory_secs: u64,

    #[serde(default = "default_tool_secs")]
    pub tool_secs: u64,
}

fn default_model_secs() -> u64 {
    120
}
fn default_memory_secs() -> u64 {
    10
}
fn default_tool_secs() -> u64 {
    15
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            model_secs: default_model_secs(),
            memory_secs: default_memory_secs(),
            tool_secs: default_tool_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentLoopConfig {
    /// Tool calls allowed per user turn
    #[serde(default = "default_max_hops")]
    pub max_hops: u32,

    /// Check deterministic intents before the first model call
    #[serde(default)]
    pub route_before_model: bool,
}

fn default_max_hops() -> u32 {
    1
}

impl Default for AgentLoopConfig {
    fn default() -> Self {
        Self {
            max_hops: default_max_hops(),
            route_before_model: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.openclaw/config.toml).
    ///
    /// Environment overrides:
    /// - `OPENCLAW_MODEL`
    /// - `OPENCLAW_API_URL`
    /// - `OPENCLAW_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(model) = std::env::var("OPENCLAW_MODEL") {
            config.model.name = model;
        }
        if let Ok(url) = std::env::var("OPENCLAW_API_URL") {
            config.model.api_url = url;
        }
        if config.model.api_key.is_none() {
            config.model.api_key = std::env::var("OPENCLAW_API_KEY").ok();
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".openclaw")
    }

    /// Resolved JSONL path for the file memory backend.
    pub fn memory_path(&self) -> PathBuf {
        self.memory
            .path
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("memory").join("vectors.jsonl"))
    }

    /// Resolved JSON path for the to-do list.
    pub fn todo_path(&self) -> PathBuf {
        self.todo
            .path
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("todo.json"))
    }

    /// The persona and user profile as an agent configuration.
    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            user_profile: self.user.clone(),
            persona: self.persona.clone(),
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, t) in [
            ("model.json_temperature", self.model.json_temperature),
            ("model.plain_temperature", self.model.plain_temperature),
        ] {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be between 0.0 and 2.0"
                )));
            }
        }

        if self.context.capacity == 0 {
            return Err(ConfigError::ValidationError(
                "context.capacity must be at least 1".into(),
            ));
        }

        if self.memory.recall_limit == 0 {
            return Err(ConfigError::ValidationError(
                "memory.recall_limit must be at least 1".into(),
            ));
        }

        if self.memory.embedding_dimensions == 0 || self.memory.max_fact_chars == 0 {
            return Err(ConfigError::ValidationError(
                "memory.embedding_dimensions and memory.max_fact_chars must be > 0".into(),
            ));
        }

        if !(1..=5).contains(&self.agent.max_hops) {
            return Err(ConfigError::ValidationError(
                "agent.max_hops must be between 1 and 5".into(),
            ));
        }

        if !(self.todo.match_threshold > 0.0 && self.todo.match_threshold <= 1.0) {
            return Err(ConfigError::ValidationError(
                "todo.match_threshold must be in (0.0, 1.0]".into(),
            ));
        }

        if self.timeouts.model_secs == 0
            || self.timeouts.memory_secs == 0
            || self.timeouts.tool_secs == 0
        {
            return Err(ConfigError::ValidationError(
                "timeouts must be greater than zero".into(),
            ));
        }

        self.agent_config()
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        Ok(())
    }

    /// Generate a default config TOML string (for the `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
