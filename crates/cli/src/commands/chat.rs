//! `openclaw chat`: interactive or single-message chat.

use openclaw_agent::{ReasoningLoop, TurnOutcome};
use openclaw_core::agent::AgentConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use crate::bootstrap;

const HELP: &str = "\
  Commands:
    /set persona name|role|instructions <text>
    /set user name|info <text>
    /show      current persona and user profile
    /context   messages in short-term memory
    /log       reasoning log for this session
    /help      this list
    exit       quit";

pub async fn run(message: Option<String>, debug: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = bootstrap::load_config()?;
    let runtime = bootstrap::runtime(&config)?;
    let mut agent = runtime.agent;

    if let Some(msg) = message {
        let outcome = agent.run_turn(&msg).await?;
        println!("{}", outcome.answer);
        if debug {
            print_turn_log(&agent);
        }
        return Ok(());
    }

    println!();
    println!("  OpenClaw - Interactive Mode");
    println!();
    println!("  Provider:  {}", config.model.provider);
    println!("  Model:     {}", config.model.name);
    println!("  Tools:     {}", runtime.tool_names.join(", "));
    println!("  Memory:    {} ({})", agent.memory().backend_name(), agent.memory().embedder_name());
    println!();
    println!("  Type your message and press Enter. /help lists commands, 'exit' quits.");
    println!();

    let mut last_suggestion = agent.start_session().await;
    if let Some(text) = &last_suggestion {
        println!("  OpenClaw > {text}");
        println!();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if matches!(input, "exit" | "quit" | "/exit") {
            break;
        }
        if input.is_empty() {
            prompt()?;
            continue;
        }

        if let Some(command) = input.strip_prefix('/') {
            handle_command(&agent, command);
        } else {
            match agent.run_turn(input).await {
                Ok(outcome) => {
                    print_outcome(&outcome);
                    if outcome.suggestion.is_some() && outcome.suggestion != last_suggestion {
                        if let Some(text) = &outcome.suggestion {
                            println!("  OpenClaw > {text}");
                            println!();
                        }
                    }
                    last_suggestion = outcome.suggestion;
                    if debug {
                        print_turn_log(&agent);
                    }
                }
                Err(e) => {
                    eprintln!("  [Error] {e}");
                    println!();
                }
            }
        }
        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    use std::io::Write;
    print!("  You > ");
    std::io::stdout().flush()
}

fn print_outcome(outcome: &TurnOutcome) {
    println!();
    for line in outcome.answer.lines() {
        println!("  OpenClaw > {line}");
    }
    for warning in &outcome.warnings {
        println!("  (warning: {warning})");
    }
    println!();
}

fn print_turn_log(agent: &ReasoningLoop) {
    for entry in agent.reasoning_log().for_turn(agent.turns()) {
        println!("  · {entry}");
    }
    println!();
}

fn handle_command(agent: &ReasoningLoop, command: &str) {
    let mut parts = command.splitn(2, ' ');
    match (parts.next().unwrap_or(""), parts.next().unwrap_or("").trim()) {
        ("set", rest) => match parse_set(rest) {
            Ok(edit) => match agent.config().modify(|c| edit.apply(c)) {
                Ok(version) => println!("  Updated (config version {version})."),
                Err(e) => println!("  Rejected: {e}"),
            },
            Err(usage) => println!("  {usage}"),
        },
        ("show", _) => {
            let snapshot = agent.config().snapshot();
            let c = &snapshot.config;
            println!("  Persona:  {} ({})", c.persona.name, c.persona.role);
            if !c.persona.instructions.is_empty() {
                println!("  Instructions: {}", c.persona.instructions);
            }
            println!("  User:     {}", c.user_profile.name);
            if !c.user_profile.info.is_empty() {
                println!("  Info:     {}", c.user_profile.info);
            }
        }
        ("context", _) => {
            let window = agent.context_window();
            println!("  {} of {} messages:", window.len(), window.capacity());
            for m in window.snapshot() {
                println!("  [{}] {}", m.role.as_str(), m.content);
            }
        }
        ("log", _) => {
            for entry in agent.reasoning_log().entries() {
                println!("  · {entry}");
            }
        }
        _ => println!("{HELP}"),
    }
    println!();
}

#[derive(Debug, PartialEq)]
enum ConfigEdit {
    PersonaName(String),
    PersonaRole(String),
    PersonaInstructions(String),
    UserName(String),
    UserInfo(String),
}

impl ConfigEdit {
    fn apply(self, config: &mut AgentConfig) {
        match self {
            Self::PersonaName(v) => config.persona.name = v,
            Self::PersonaRole(v) => config.persona.role = v,
            Self::PersonaInstructions(v) => config.persona.instructions = v,
            Self::UserName(v) => config.user_profile.name = v,
            Self::UserInfo(v) => config.user_profile.info = v,
        }
    }
}

/// `persona name Ada` → `ConfigEdit::PersonaName("Ada")`. The value may be
/// empty, which validation then rejects for required fields.
fn parse_set(args: &str) -> Result<ConfigEdit, String> {
    let mut parts = args.splitn(3, ' ');
    let target = parts.next().unwrap_or("");
    let field = parts.next().unwrap_or("");
    let value = parts.next().unwrap_or("").trim().to_string();

    match (target, field) {
        ("persona", "name") => Ok(ConfigEdit::PersonaName(value)),
        ("persona", "role") => Ok(ConfigEdit::PersonaRole(value)),
        ("persona", "instructions") => Ok(ConfigEdit::PersonaInstructions(value)),
        ("user", "name") => Ok(ConfigEdit::UserName(value)),
        ("user", "info") => Ok(ConfigEdit::UserInfo(value)),
        _ => Err("Usage: /set persona name|role|instructions <text> or /set user name|info <text>".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_set_commands() {
        assert_eq!(parse_set("persona name Ada"), Ok(ConfigEdit::PersonaName("Ada".into())));
        assert_eq!(
            parse_set("user info Lives in Oslo, likes tea"),
            Ok(ConfigEdit::UserInfo("Lives in Oslo, likes tea".into()))
        );
        assert_eq!(parse_set("persona name"), Ok(ConfigEdit::PersonaName(String::new())));
        assert!(parse_set("persona mood grumpy").is_err());
        assert!(parse_set("").is_err());
    }

    #[test]
    fn edits_apply_to_config() {
        let mut config = AgentConfig::default();
        ConfigEdit::PersonaRole("Librarian".into()).apply(&mut config);
        ConfigEdit::UserName("Sam".into()).apply(&mut config);
        assert_eq!(config.persona.role, "Librarian");
        assert_eq!(config.user_profile.name, "Sam");
    }
}
