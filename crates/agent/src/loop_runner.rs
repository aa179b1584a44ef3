//! The reasoning loop.
//!
//! One call to [`ReasoningLoop::run_turn`] takes a user utterance to a final
//! answer through the states in [`LoopState`]:
//!
//! 1. **AwaitingInput**: pin a config snapshot, recall memory, build the prompt
//! 2. **Thinking**: structured model call, parsed through the fallback ladder
//! 3. **ActionPending / Observing**: run the chosen tool, then chain another
//!    step (while hops remain) or synthesize an answer from the observation
//! 4. **Synthesizing**: record the exchange and persist any validated fact
//! 5. **Done**: refresh the proactive suggestion
//!
//! Tool and memory failures degrade the turn. A failed model call aborts it
//! only before any tool has run, and then nothing but the reasoning log
//! changes; once a tool has run, its observation becomes the answer.

use std::sync::Arc;
use std::time::{Duration, Instant};
use chrono::Utc;
use openclaw_config::AppConfig;
use openclaw_core::agent::ConfigHandle;
use openclaw_core::error::{ProviderError, ToolError};
use openclaw_core::event::{DomainEvent, EventBus};
use openclaw_core::memory::MemoryMetadata;
use openclaw_core::message::{Message, SessionId};
use openclaw_core::provider::{Provider, ProviderRequest, ResponseFormat};
use openclaw_core::tool::{ToolCall, ToolDefinition, ToolRegistry, ToolResult};
use openclaw_memory::MemoryStore;
use openclaw_tools::TodoList;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;
use crate::context_window::ContextWindow;
use crate::parser::{self, ParseOutcome, ParseStrategy};
use crate::proactivity::ProactivityMonitor;
use crate::prompt;
use crate::reasoning_log::{LogKind, ReasoningLog};
use crate::routing;
use crate::step::{ActionRequest, ReasoningStep, Synthesis};

/// Note kind under which the proactive suggestion sits in the window.
pub const PROACTIVE_NOTE: &str = "proactive";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoopState {
    AwaitingInput,
    Thinking,
    ActionPending,
    Observing,
    Synthesizing,
    Done,
}

#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("Model call failed: {0}")]
    Model(#[from] ProviderError),

    #[error("Nothing to respond to")]
    EmptyInput,
}

/// Tunables for the loop, usually taken from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub model: String,
    pub json_temperature: f32,
    pub plain_temperature: f32,
    pub max_tokens: Option<u32>,
    pub recall_limit: usize,
    /// Structured model calls allowed per turn
    pub max_hops: u32,
    /// Skip the first model call when the utterance matches a routed intent
    pub route_before_model: bool,
    pub max_fact_chars: usize,
    pub model_timeout: Duration,
    pub tool_timeout: Duration,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            model: "gemma:2b".into(),
            json_temperature: 0.2,
            plain_temperature: 0.4,
            max_tokens: None,
            recall_limit: 2,
            max_hops: 1,
            route_before_model: false,
            max_fact_chars: 500,
            model_timeout: Duration::from_secs(120),
            tool_timeout: Duration::from_secs(15),
        }
    }
}

impl LoopSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.model.name.clone(),
            json_temperature: config.model.json_temperature,
            plain_temperature: config.model.plain_temperature,
            max_tokens: config.model.max_tokens,
            recall_limit: config.memory.recall_limit,
            max_hops: config.agent.max_hops.max(1),
            route_before_model: config.agent.route_before_model,
            max_fact_chars: config.memory.max_fact_chars,
            model_timeout: Duration::from_secs(config.timeouts.model_secs),
            tool_timeout: Duration::from_secs(config.timeouts.tool_secs),
        }
    }
}

/// Everything a completed turn produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub answer: String,
    pub states: Vec<LoopState>,
    pub steps: Vec<ReasoningStep>,
    pub tool_calls: Vec<ToolCall>,
    pub warnings: Vec<String>,
    pub suggestion: Option<String>,
    pub config_version: u64,
}

pub struct ReasoningLoop {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    memory: MemoryStore,
    proactivity: ProactivityMonitor,
    config: ConfigHandle,
    settings: LoopSettings,
    event_bus: Arc<EventBus>,
    session_id: SessionId,
    window: ContextWindow,
    log: ReasoningLog,
    turn: u64,
}

impl ReasoningLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        memory: MemoryStore,
        todos: TodoList,
        config: ConfigHandle,
    ) -> Self {
        Self {
            provider,
            tools,
            memory,
            proactivity: ProactivityMonitor::new(todos),
            config,
            settings: LoopSettings::default(),
            event_bus: Arc::new(EventBus::default()),
            session_id: SessionId::new(),
            window: ContextWindow::default(),
            log: ReasoningLog::new(),
            turn: 0,
        }
    }

    pub fn with_settings(mut self, settings: LoopSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = bus;
        self
    }

    pub fn with_session_id(mut self, id: SessionId) -> Self {
        self.session_id = id;
        self
    }

    /// Replace the context window with an empty one of `capacity`.
    pub fn with_context_capacity(mut self, capacity: usize) -> Self {
        self.window = ContextWindow::new(capacity);
        self
    }

    pub fn context_window(&self) -> &ContextWindow {
        &self.window
    }

    pub fn reasoning_log(&self) -> &ReasoningLog {
        &self.log
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn settings(&self) -> &LoopSettings {
        &self.settings
    }

    /// Turns run so far in this session.
    pub fn turns(&self) -> u64 {
        self.turn
    }

    /// Greet a fresh session with a suggestion about pending work, if any.
    pub async fn start_session(&mut self) -> Option<String> {
        info!(session_id = %self.session_id, "Session started");
        self.refresh_suggestion(self.turn).await
    }

    /// Run one user turn to a final answer.
    pub async fn run_turn(&mut self, utterance: &str) -> Result<TurnOutcome, TurnError> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(TurnError::EmptyInput);
        }

        self.turn += 1;
        let turn = self.turn;
        // One snapshot for the whole turn, whatever happens to the handle meanwhile
        let snapshot = self.config.snapshot();
        let mut states = vec![LoopState::AwaitingInput];

        info!(session_id = %self.session_id, turn, config_version = snapshot.version, "Turn started");
        self.event_bus.publish(DomainEvent::TurnStarted {
            session_id: self.session_id.to_string(),
            turn,
            config_version: snapshot.version,
            timestamp: Utc::now(),
        });

        let memories = self.memory.retrieve(utterance, self.settings.recall_limit).await;
        self.log.record(turn, LogKind::Retrieval {
            facts: memories.iter().map(|m| (m.text.clone(), m.score)).collect(),
        });
        self.event_bus.publish(DomainEvent::MemoryRecalled {
            count: memories.len(),
            timestamp: Utc::now(),
        });

        let system = prompt::system_prompt(&snapshot.config, &memories, &self.tools.definitions());
        let mut messages = prompt::reasoning_messages(&system, self.window.snapshot(), utterance);

        states.push(LoopState::Thinking);
        let pre_routed = self
            .settings
            .route_before_model
            .then(|| routing::route(utterance))
            .flatten();
        let first = match pre_routed {
            Some(intent) => {
                debug!(intent = intent.name(), "Routed before model call");
                let outcome = ParseOutcome {
                    step: intent.into_step(),
                    strategy: ParseStrategy::Routed,
                };
                self.record_step(turn, &outcome, None);
                outcome
            }
            None => match self.think(turn, &messages, Some(utterance)).await {
                Ok(outcome) => outcome,
                Err(e) => return Err(self.fail_turn(turn, e)),
            },
        };

        let mut step = first.step;
        let mut strategy = first.strategy;
        let mut steps = Vec::new();
        let mut facts = Vec::new();
        let mut tool_calls = Vec::new();
        let mut warnings = Vec::new();
        let mut hops = 1;

        let answer = loop {
            let Some(action) = step.action.clone() else {
                let answer = step.final_answer.clone().unwrap_or_default();
                facts.extend(fact_of(&step, strategy));
                steps.push(step);
                break answer;
            };

            states.push(LoopState::ActionPending);
            let (call, result) = self.execute(turn, &action).await;
            tool_calls.push(call);
            states.push(LoopState::Observing);

            if !result.success {
                warnings.push(format!("Tool '{}' degraded: {}", action.tool_name, result.output));
            }
            let observation = result.output;
            step.observation = Some(observation.clone());
            facts.extend(fact_of(&step, strategy));

            if step.synthesis == Synthesis::Observation {
                steps.push(step);
                break observation;
            }

            if hops < self.settings.max_hops {
                hops += 1;
                states.push(LoopState::Thinking);
                messages = prompt::followup_messages(&messages, &step, &action.tool_name, &observation);
                match self.think(turn, &messages, None).await {
                    // A non-structured follow-up would replay the user's intent
                    Ok(next) if next.strategy.is_structured() => {
                        steps.push(step);
                        step = next.step;
                        strategy = next.strategy;
                        continue;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warnings.push(model_lost_after_tool(turn, &action.tool_name, &e));
                        steps.push(step);
                        break observation;
                    }
                }
            }

            let synthesis = prompt::synthesis_messages(&snapshot.config, utterance, &step, &observation);
            // The tool already ran, so its observation stands in for a lost synthesis
            let text = match self.complete(synthesis, ResponseFormat::Text).await {
                Ok(text) => text,
                Err(e) => {
                    warnings.push(model_lost_after_tool(turn, &action.tool_name, &e));
                    String::new()
                }
            };
            steps.push(step);
            let text = text.trim();
            break if text.is_empty() { observation } else { text.to_string() };
        };

        states.push(LoopState::Synthesizing);
        self.window.append(Message::user(utterance));
        self.window.append(Message::agent(answer.as_str()));

        for (fact, tag) in facts {
            if let Some(warning) = self.persist_fact(turn, &fact, tag).await {
                warnings.push(warning);
            }
        }

        states.push(LoopState::Done);
        let suggestion = self.refresh_suggestion(turn).await;

        info!(turn, tools = tool_calls.len(), warnings = warnings.len(), "Turn complete");
        Ok(TurnOutcome {
            answer,
            states,
            steps,
            tool_calls,
            warnings,
            suggestion,
            config_version: snapshot.version,
        })
    }

    /// Structured model call and parse. `utterance` is `None` on follow-up
    /// hops, which skip intent routing.
    async fn think(
        &mut self,
        turn: u64,
        messages: &[Message],
        utterance: Option<&str>,
    ) -> Result<ParseOutcome, ProviderError> {
        let raw = self.complete(messages.to_vec(), ResponseFormat::Json).await?;
        let outcome = match utterance {
            Some(u) => parser::parse(&raw, u),
            None => parser::parse_followup(&raw),
        };
        self.record_step(turn, &outcome, Some(&raw));
        Ok(outcome)
    }

    fn record_step(&mut self, turn: u64, outcome: &ParseOutcome, raw: Option<&str>) {
        let step = &outcome.step;
        debug!(strategy = %outcome.strategy, thought = %step.thought, "Reasoning step");
        self.log.record(turn, LogKind::Step {
            thought: step.thought.clone(),
            action: step.action.as_ref().map(ToString::to_string),
            strategy: outcome.strategy.to_string(),
        });

        let Some(raw) = raw else { return };
        if !outcome.strategy.is_structured() {
            warn!(strategy = %outcome.strategy, "Model output unusable, fell back");
            self.log.record(turn, LogKind::ParseFallback {
                strategy: outcome.strategy.to_string(),
                raw: raw.to_string(),
            });
            self.event_bus.publish(DomainEvent::ParseFallback {
                strategy: outcome.strategy.to_string(),
                timestamp: Utc::now(),
            });
        }
    }

    async fn complete(&self, messages: Vec<Message>, format: ResponseFormat) -> Result<String, ProviderError> {
        let temperature = match format {
            ResponseFormat::Json => self.settings.json_temperature,
            ResponseFormat::Text => self.settings.plain_temperature,
        };
        let request = ProviderRequest {
            model: self.settings.model.clone(),
            messages,
            temperature,
            max_tokens: self.settings.max_tokens,
            format,
        };

        match tokio::time::timeout(self.settings.model_timeout, self.provider.complete(request)).await {
            Ok(Ok(response)) => Ok(response.message.content),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ProviderError::Timeout(format!(
                "no response within {}s",
                self.settings.model_timeout.as_secs()
            ))),
        }
    }

    async fn execute(&mut self, turn: u64, action: &ActionRequest) -> (ToolCall, ToolResult) {
        let definition = self.tools.get(&action.tool_name).map(|t| t.to_definition());
        let call = ToolCall {
            id: Uuid::new_v4().to_string(),
            name: action.tool_name.clone(),
            arguments: bind_arguments(definition.as_ref(), &action.arguments),
        };

        debug!(tool = %call.name, arguments = %call.arguments, "Executing tool");
        self.log.record(turn, LogKind::ToolCall {
            tool: call.name.clone(),
            arguments: call.arguments.to_string(),
        });

        let started = Instant::now();
        let result = match tokio::time::timeout(self.settings.tool_timeout, self.tools.execute(&call)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => degraded(&call.name, &e),
            Err(_) => degraded(&call.name, &ToolError::Timeout {
                tool_name: call.name.clone(),
                timeout_secs: self.settings.tool_timeout.as_secs(),
            }),
        };
        let duration_ms = started.elapsed().as_millis() as u64;

        if result.success {
            debug!(tool = %call.name, duration_ms, "Tool succeeded");
        } else {
            warn!(tool = %call.name, duration_ms, output = %result.output, "Tool degraded");
        }
        self.log.record(turn, LogKind::Observation {
            tool: call.name.clone(),
            output: result.output.clone(),
            success: result.success,
        });
        self.event_bus.publish(DomainEvent::ToolExecuted {
            tool_name: call.name.clone(),
            success: result.success,
            duration_ms,
            timestamp: Utc::now(),
        });

        (call, result)
    }

    /// Persist a model- or route-requested fact. Returns a warning when the
    /// fact is rejected or the store fails.
    async fn persist_fact(&mut self, turn: u64, fact: &str, tag: &str) -> Option<String> {
        let fact = fact.trim();
        let chars = fact.chars().count();
        if fact.is_empty() || chars > self.settings.max_fact_chars {
            let message = format!(
                "Memory not saved: fact must be 1 to {} characters, got {chars}",
                self.settings.max_fact_chars
            );
            warn!(chars, "Rejected memory fact");
            self.log.record(turn, LogKind::MemoryWarning { message: message.clone() });
            return Some(message);
        }

        let metadata = MemoryMetadata::new(Some(self.session_id.to_string()), vec![tag.to_string()]);
        match self.memory.persist(fact, metadata).await {
            Ok(id) => {
                self.log.record(turn, LogKind::MemoryPersisted {
                    id: id.clone(),
                    text: fact.to_string(),
                });
                self.event_bus.publish(DomainEvent::MemoryPersisted {
                    memory_id: id,
                    timestamp: Utc::now(),
                });
                None
            }
            Err(e) => {
                let message = format!("Memory not saved: {e}");
                warn!(error = %e, "Memory persistence failed");
                self.log.record(turn, LogKind::MemoryWarning { message: message.clone() });
                Some(message)
            }
        }
    }

    async fn refresh_suggestion(&mut self, turn: u64) -> Option<String> {
        let Some(text) = self.proactivity.check().await else {
            self.window.remove_note(PROACTIVE_NOTE);
            return None;
        };

        self.window.replace_note(PROACTIVE_NOTE, Message::system(text.as_str()));
        self.log.record(turn, LogKind::Suggestion { text: text.clone() });
        self.event_bus.publish(DomainEvent::SuggestionRaised {
            pending: self.proactivity.pending().await,
            timestamp: Utc::now(),
        });
        Some(text)
    }

    fn fail_turn(&mut self, turn: u64, error: ProviderError) -> TurnError {
        warn!(turn, error = %error, "Turn failed");
        self.log.record(turn, LogKind::TurnFailed { error: error.to_string() });
        self.event_bus.publish(DomainEvent::TurnFailed {
            turn,
            error_message: error.to_string(),
            timestamp: Utc::now(),
        });
        TurnError::Model(error)
    }
}

fn model_lost_after_tool(turn: u64, tool: &str, error: &ProviderError) -> String {
    warn!(turn, tool, error = %error, "Model call failed after tool ran, answering from observation");
    format!("Model call failed after '{tool}' ran: {error}")
}

fn degraded(tool: &str, error: &ToolError) -> ToolResult {
    ToolResult::degraded(format!("Tool '{tool}' failed: {error}"))
}

fn fact_of(step: &ReasoningStep, strategy: ParseStrategy) -> Option<(String, &'static str)> {
    if !step.save_memory {
        return None;
    }
    let tag = if strategy == ParseStrategy::Routed { "routed" } else { "model" };
    Some((step.memory_content.clone().unwrap_or_default(), tag))
}

/// Fit the model's `action_input` to the tool's schema. A bare string goes
/// to the first required parameter; nothing becomes an empty object.
fn bind_arguments(definition: Option<&ToolDefinition>, input: &Value) -> Value {
    let first_param = definition.and_then(|d| {
        d.required_arguments()
            .first()
            .map(|s| s.to_string())
            .or_else(|| d.argument_types().into_iter().next().map(|(name, _)| name))
    });

    match input {
        Value::Object(_) => input.clone(),
        Value::Null => Value::Object(Default::default()),
        Value::String(s) if s.trim().is_empty() => Value::Object(Default::default()),
        other => {
            let Some(param) = first_param else {
                return Value::Object(Default::default());
            };
            let text = match other {
                Value::String(s) => s.clone(),
                v => v.to_string(),
            };
            let mut args = serde_json::Map::new();
            args.insert(param, Value::String(text));
            Value::Object(args)
        }
    }
}
