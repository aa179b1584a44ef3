//! The OpenClaw reasoning engine.
//!
//! Each user turn runs **Thought → Action → Observation → Final Answer**:
//!
//! 1. **Recall** relevant long-term memories
//! 2. **Think**: ask the model for a structured step, parsed through a
//!    fallback ladder that ends in deterministic intent routing
//! 3. **Act**: run the chosen tool and observe its result
//! 4. **Answer**: synthesize the final reply, record it in the context
//!    window and persist any fact the model asked to keep
//!
//! After every turn the proactivity monitor checks for pending tasks.

pub mod context_window;
pub mod loop_runner;
pub mod parser;
pub mod proactivity;
pub mod prompt;
pub mod reasoning_log;
pub mod routing;
pub mod step;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context_window::ContextWindow;
pub use loop_runner::{LoopSettings, LoopState, PROACTIVE_NOTE, ReasoningLoop, TurnError, TurnOutcome};
pub use parser::{ParseOutcome, ParseStrategy, parse};
pub use proactivity::ProactivityMonitor;
pub use reasoning_log::{LogEntry, LogKind, ReasoningLog};
pub use routing::{RoutedIntent, route};
pub use step::{ActionRequest, ReasoningStep, Synthesis};
