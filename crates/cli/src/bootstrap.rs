//! Wiring: build the provider, memory, tools and reasoning loop from config.

use std::sync::Arc;
use std::time::Duration;
use openclaw_agent::{LoopSettings, ReasoningLoop};
use openclaw_config::AppConfig;
use openclaw_core::agent::ConfigHandle;
use openclaw_core::memory::{Embedder, VectorBackend};
use openclaw_core::provider::Provider;
use openclaw_memory::{
    FileVectorStore, HashEmbedder, InMemoryVectorStore, MemoryStore, NoopVectorStore, ProviderEmbedder,
};
use openclaw_tools::{DuckDuckGoSearch, SearchTool, TodoList};

type BoxError = Box<dyn std::error::Error>;

pub struct Runtime {
    pub agent: ReasoningLoop,
    pub tool_names: Vec<String>,
}

pub fn load_config() -> Result<AppConfig, BoxError> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

pub fn provider(config: &AppConfig) -> Result<Arc<dyn Provider>, BoxError> {
    Ok(openclaw_providers::build_from_config(config)
        .map_err(|e| format!("Failed to build provider: {e}"))?)
}

pub fn todos(config: &AppConfig) -> TodoList {
    TodoList::open(config.todo_path()).with_threshold(config.todo.match_threshold)
}

pub fn memory(config: &AppConfig, provider: Arc<dyn Provider>) -> Result<MemoryStore, BoxError> {
    let backend: Arc<dyn VectorBackend> = match config.memory.backend.as_str() {
        "file" => Arc::new(FileVectorStore::new(config.memory_path())),
        "memory" => Arc::new(InMemoryVectorStore::new()),
        "none" => Arc::new(NoopVectorStore),
        other => return Err(format!("Unknown memory backend '{other}' (use file, memory or none)").into()),
    };

    let embedder: Arc<dyn Embedder> = match config.memory.embedder.as_str() {
        "hash" => Arc::new(HashEmbedder::new(config.memory.embedding_dimensions)),
        "provider" => Arc::new(ProviderEmbedder::new(provider, config.memory.embedding_model.clone())),
        other => return Err(format!("Unknown embedder '{other}' (use hash or provider)").into()),
    };

    Ok(MemoryStore::new(backend, embedder)
        .with_timeout(Duration::from_secs(config.timeouts.memory_secs)))
}

pub fn search(config: &AppConfig) -> Result<Option<SearchTool>, BoxError> {
    match config.search.backend.as_str() {
        "duckduckgo" => {
            let backend = DuckDuckGoSearch::new(config.timeouts.tool_secs)
                .map_err(|e| format!("Failed to build search backend: {e}"))?;
            Ok(Some(
                SearchTool::new(Arc::new(backend))
                    .with_limits(config.search.max_results, config.search.min_snippet_chars)
                    .with_timeout(Duration::from_secs(config.timeouts.tool_secs)),
            ))
        }
        "none" => Ok(None),
        other => Err(format!("Unknown search backend '{other}' (use duckduckgo or none)").into()),
    }
}

/// Assemble a ready-to-run reasoning loop.
pub fn runtime(config: &AppConfig) -> Result<Runtime, BoxError> {
    let provider = provider(config)?;
    let memory = memory(config, provider.clone())?;
    let todos = todos(config);
    let registry = openclaw_tools::default_registry(todos.clone(), search(config)?);
    let tool_names: Vec<String> = registry.names().into_iter().map(String::from).collect();
    let handle = ConfigHandle::new(config.agent_config()).map_err(|e| format!("Invalid agent config: {e}"))?;

    tracing::info!(
        provider = provider.name(),
        model = %config.model.name,
        memory = memory.backend_name(),
        tools = ?tool_names,
        "Runtime ready"
    );

    let agent = ReasoningLoop::new(provider, Arc::new(registry), memory, todos, handle)
        .with_settings(LoopSettings::from_config(config))
        .with_context_capacity(config.context.capacity);

    Ok(Runtime { agent, tool_names })
}
