//! # OpenClaw Core
//!
//! Domain types, traits, and error definitions for the OpenClaw local agent.
//! This crate has **no framework dependencies**: it defines the domain model
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (language model, vector store, embedding
//! function, web search) is a trait here. Implementations live in their
//! respective crates, so the reasoning loop can be driven end-to-end by
//! deterministic in-process stand-ins in tests.

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;
pub mod memory;
pub mod search;
pub mod agent;
pub mod event;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Message, Role, SessionId};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ResponseFormat};
pub use tool::{Tool, ToolCall, ToolDefinition, ToolRegistry, ToolResult};
pub use memory::{Embedder, MemoryMetadata, MemoryPayload, MemoryRecord, VectorBackend, VectorMatch};
pub use search::{SearchBackend, SearchHit};
pub use agent::{AgentConfig, ConfigHandle, ConfigSnapshot, Persona, UserProfile};
pub use event::{DomainEvent, EventBus};
