//! Agent persona and user profile, plus the versioned handle the
//! configuration surface writes to.
//!
//! Configuration and conversation state have independent lifecycles: the
//! persona may change at any time, and the reasoning loop reads exactly one
//! [`ConfigSnapshot`] per turn so a persona never switches mid-reasoning.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use crate::error::ConfigError;

const MAX_NAME_CHARS: usize = 64;
const MAX_ROLE_CHARS: usize = 200;
const MAX_INSTRUCTIONS_CHARS: usize = 4000;
const MAX_USER_INFO_CHARS: usize = 2000;

/// Who the agent is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub instructions: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: "OpenClaw".into(),
            role: "Autonomous AI Agent".into(),
            instructions: String::new(),
        }
    }
}

/// Who the agent is talking to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    #[serde(default)]
    pub info: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "User".into(),
            info: String::new(),
        }
    }
}

/// Persona plus user profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub user_profile: UserProfile,
    #[serde(default)]
    pub persona: Persona,
}

impl AgentConfig {
    /// Reject malformed persona or profile input.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.persona;
        check_text(&p.name, MAX_NAME_CHARS, true, "name").map_err(ConfigError::InvalidPersona)?;
        check_text(&p.role, MAX_ROLE_CHARS, true, "role").map_err(ConfigError::InvalidPersona)?;
        check_text(&p.instructions, MAX_INSTRUCTIONS_CHARS, false, "instructions")
            .map_err(ConfigError::InvalidPersona)?;

        let u = &self.user_profile;
        check_text(&u.name, MAX_NAME_CHARS, true, "name").map_err(ConfigError::InvalidProfile)?;
        check_text(&u.info, MAX_USER_INFO_CHARS, false, "info").map_err(ConfigError::InvalidProfile)?;
        Ok(())
    }
}

fn check_text(value: &str, max_chars: usize, required: bool, field: &str) -> Result<(), String> {
    if required && value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    if value.chars().count() > max_chars {
        return Err(format!("{field} exceeds {max_chars} characters"));
    }
    if value.chars().any(|c| c.is_control() && c != '\n' && c != '\t') {
        return Err(format!("{field} contains control characters"));
    }
    Ok(())
}

/// An immutable view of the configuration, captured once per turn.
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    /// Monotonic version, bumped on every accepted update
    pub version: u64,
    pub config: Arc<AgentConfig>,
}

/// Shared, versioned agent configuration.
///
/// Cheap to clone; every clone observes the same configuration. Updates
/// are validated first and a rejected update leaves the previous
/// configuration in place.
#[derive(Clone)]
pub struct ConfigHandle {
    tx: Arc<watch::Sender<ConfigSnapshot>>,
}

impl ConfigHandle {
    /// Create a handle from an initial configuration.
    pub fn new(config: AgentConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let (tx, _rx) = watch::channel(ConfigSnapshot {
            version: 1,
            config: Arc::new(config),
        });
        Ok(Self { tx: Arc::new(tx) })
    }

    /// The current configuration.
    pub fn snapshot(&self) -> ConfigSnapshot {
        self.tx.borrow().clone()
    }

    /// Replace the configuration. Returns the new version.
    pub fn update(&self, config: AgentConfig) -> Result<u64, ConfigError> {
        config.validate()?;
        let mut version = 0;
        self.tx.send_modify(|snap| {
            snap.version += 1;
            snap.config = Arc::new(config);
            version = snap.version;
        });
        tracing::debug!(version, "Agent configuration updated");
        Ok(version)
    }

    /// Apply an edit to a copy of the current configuration and store it
    /// if the result validates. Read, edit and store happen under one lock.
    pub fn modify(&self, edit: impl FnOnce(&mut AgentConfig)) -> Result<u64, ConfigError> {
        let mut result = Ok(0);
        self.tx.send_if_modified(|snap| {
            let mut next = (*snap.config).clone();
            edit(&mut next);
            if let Err(e) = next.validate() {
                result = Err(e);
                return false;
            }
            snap.version += 1;
            snap.config = Arc::new(next);
            result = Ok(snap.version);
            true
        });
        if let Ok(version) = result {
            tracing::debug!(version, "Agent configuration updated");
        }
        result
    }

    /// Observe configuration changes.
    pub fn subscribe(&self) -> watch::Receiver<ConfigSnapshot> {
        self.tx.subscribe()
    }
}

impl Default for ConfigHandle {
    fn default() -> Self {
        let (tx, _rx) = watch::channel(ConfigSnapshot {
            version: 1,
            config: Arc::new(AgentConfig::default()),
        });
        Self { tx: Arc::new(tx) }
    }
}
