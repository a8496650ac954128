use anyhow::{Context, Result};
use focusgate_engine::{AppId, EngineConfig, FocusEngine, GateResult, Platform, Scan};
use focusgate_events::EventBus;
use std::io::BufRead;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Forwards engine events to the log.
struct LogEventBus;

impl EventBus for LogEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        tracing::info!(topic, %payload, "event");
    }
}

enum Command {
    Scan(Scan),
    Register,
    Cancel,
    Block(Vec<AppId>),
    Status,
    TaskRemoved,
    Quit,
}

fn parse(line: &str) -> Option<Command> {
    let line = line.trim();
    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let command = match head {
        "tag" => Command::Scan(Scan::TagHex(rest.to_string())),
        "qr" => Command::Scan(Scan::Qr(rest.to_string())),
        "register" => Command::Register,
        "cancel" => Command::Cancel,
        "block" => Command::Block(rest.split_whitespace().map(AppId::new).collect()),
        "status" => Command::Status,
        "task-removed" => Command::TaskRemoved,
        "quit" | "exit" => Command::Quit,
        _ => return None,
    };
    Some(command)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,focusgate=debug")),
        )
        .init();

    tracing::info!("Starting focusgate headless host");

    let config = EngineConfig::load_default().context("failed to load configuration")?;
    let platform = Platform {
        bus: Arc::new(LogEventBus),
        ..Platform::headless()
    };
    let engine = FocusEngine::open(config, platform).context("failed to open focus engine")?;

    if engine.store().is_first_run() {
        println!("First run: `register` then scan a tag or QR code to enroll it.");
        engine.store().complete_onboarding();
    }

    let state = engine.cold_start();
    tracing::info!(%state, "cold start complete");

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read command")?;
        if line.trim().is_empty() {
            continue;
        }

        match parse(&line) {
            Some(Command::Scan(scan)) => match engine.submit_scan(&scan) {
                GateResult::Toggled { session_active } => {
                    println!("session {}", if session_active { "started" } else { "ended" })
                }
                GateResult::Registered => println!("credential registered"),
                GateResult::Rejected => println!("unknown credential"),
            },
            Some(Command::Register) => match engine.begin_registration() {
                Ok(()) => println!("scan a credential to register it"),
                Err(e) => println!("{e}"),
            },
            Some(Command::Cancel) => engine.cancel_registration(),
            Some(Command::Block(apps)) => match engine.settings().set_blocked_apps(apps) {
                Ok(()) => println!("blocked apps: {}", engine.store().get().blocked_apps.len()),
                Err(e) => println!("{e}"),
            },
            Some(Command::Status) => {
                let status = engine.status();
                println!("{} ({}) - {}", status.title(), status.supervisor, status.detail());
            }
            Some(Command::TaskRemoved) => {
                let state = engine.on_task_removed();
                println!("supervisor {state}");
            }
            Some(Command::Quit) => break,
            None => println!(
                "commands: tag <hex> | qr <payload> | register | cancel | block <app...> | status | task-removed | quit"
            ),
        }
    }

    engine.stop();
    tracing::info!("Headless host exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert!(matches!(parse("tag 04:A1:B2"), Some(Command::Scan(Scan::TagHex(h))) if h == "04:A1:B2"));
        assert!(matches!(parse("  qr  hello world "), Some(Command::Scan(Scan::Qr(p))) if p == "hello world"));
        assert!(matches!(parse("block a b"), Some(Command::Block(apps)) if apps.len() == 2));
        assert!(matches!(parse("status"), Some(Command::Status)));
        assert!(parse("dance").is_none());
    }
}
