//! Supervisor states and the engine status line.

use focusgate_events::EngineStatusEvent;
use serde::{Deserialize, Serialize};

/// Lifecycle of the poller + controller pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SupervisorState {
    #[default]
    Stopped,
    Starting,
    Running,
}

impl SupervisorState {
    pub fn label(&self) -> &'static str {
        match self {
            SupervisorState::Stopped => "stopped",
            SupervisorState::Starting => "starting",
            SupervisorState::Running => "running",
        }
    }
}

impl std::fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// What the host's persistent status indicator shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub session_active: bool,
    /// At least one credential is registered, so a session can be started.
    pub has_credentials: bool,
    pub supervisor: SupervisorState,
}

impl EngineStatus {
    pub fn title(&self) -> &'static str {
        if self.session_active {
            "Focus session active"
        } else {
            "Standby"
        }
    }

    pub fn detail(&self) -> &'static str {
        if self.session_active {
            "Blocked apps are locked."
        } else if self.has_credentials {
            "Ready to start a focus session."
        } else {
            "Register a key in settings to start."
        }
    }

    pub fn to_event(&self) -> EngineStatusEvent {
        EngineStatusEvent {
            session_active: self.session_active,
            has_credentials: self.has_credentials,
            supervisor: self.supervisor.label().to_string(),
            title: self.title().to_string(),
            detail: self.detail().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text_follows_session() {
        let active = EngineStatus {
            session_active: true,
            has_credentials: true,
            supervisor: SupervisorState::Running,
        };
        assert_eq!(active.title(), "Focus session active");

        let idle = EngineStatus {
            session_active: false,
            has_credentials: true,
            supervisor: SupervisorState::Running,
        };
        assert_eq!(idle.title(), "Standby");
        assert_eq!(idle.to_event().supervisor, "running");
    }

    #[test]
    fn test_standby_without_credentials_asks_for_registration() {
        let status = EngineStatus {
            session_active: false,
            has_credentials: false,
            supervisor: SupervisorState::Stopped,
        };
        assert_eq!(status.title(), "Standby");
        assert_eq!(status.detail(), "Register a key in settings to start.");
        assert!(!status.to_event().has_credentials);

        let ready = EngineStatus {
            has_credentials: true,
            ..status
        };
        assert_eq!(ready.detail(), "Ready to start a focus session.");
    }
}
