// src/host/mod.rs
//! Automation host interface
//!
//! The engine never drives a browser or similar target itself; it consumes
//! two operations from the hosting automation layer:
//!
//! - **capture_state**: textual/structural representation of current state
//! - **perform_action**: one of a closed set of action kinds
//!
//! Action specs are validated before the host is invoked, so a malformed
//! request fails fast with no side effects.

use crate::utils::errors::{EngineError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Placeholder for redacted free-text payloads
const REDACTED: &str = "[redacted]";

/// Closed set of trigger action kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Click the element identified by `target_ref`
    Click,

    /// Type `text` into the element identified by `target_ref`
    Type,

    /// Navigate to `url`
    Navigate,

    /// Press the keyboard key named by `key`
    PressKey,

    /// Perform nothing and just observe
    Wait,
}

/// One triggering action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSpec {
    /// Action kind
    pub kind: ActionKind,

    /// Element reference, required for click and type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_ref: Option<String>,

    /// Human-readable element label, optional for click
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,

    /// Text payload, required for type. Free text: redacted before the
    /// spec is stored on a recording.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Destination, required for navigate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Key name, required for press_key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl ActionSpec {
    /// A no-op observation action
    pub fn wait() -> Self {
        Self {
            kind: ActionKind::Wait,
            target_ref: None,
            element: None,
            text: None,
            url: None,
            key: None,
        }
    }

    /// Check required fields for the action kind; fails fast before the
    /// action is attempted
    pub fn validate(&self) -> Result<()> {
        let missing = |field: &str| {
            Err(EngineError::InvalidArgument(format!(
                "action {:?} requires field `{}`",
                self.kind, field
            )))
        };
        match self.kind {
            ActionKind::Click => {
                if self.target_ref.as_deref().map_or(true, str::is_empty) {
                    return missing("target_ref");
                }
            }
            ActionKind::Type => {
                if self.target_ref.as_deref().map_or(true, str::is_empty) {
                    return missing("target_ref");
                }
                if self.text.is_none() {
                    return missing("text");
                }
            }
            ActionKind::Navigate => {
                if self.url.as_deref().map_or(true, str::is_empty) {
                    return missing("url");
                }
            }
            ActionKind::PressKey => {
                if self.key.as_deref().map_or(true, str::is_empty) {
                    return missing("key");
                }
            }
            ActionKind::Wait => {}
        }
        Ok(())
    }

    /// Copy with free-text payloads replaced, safe to store on a recording
    pub fn redacted(&self) -> Self {
        let mut spec = self.clone();
        if spec.text.is_some() {
            spec.text = Some(REDACTED.to_string());
        }
        spec
    }
}

/// The external automation collaborator
#[async_trait]
pub trait AutomationHost: Send + Sync {
    /// Textual/structural representation of current target state
    ///
    /// A failure during a recording's capture loop skips that tick; a
    /// failure during the one-shot triggering action stops the session.
    async fn capture_state(&self) -> Result<String>;

    /// Execute one triggering action
    async fn perform_action(&self, action: &ActionSpec) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click(target_ref: Option<&str>) -> ActionSpec {
        ActionSpec {
            kind: ActionKind::Click,
            target_ref: target_ref.map(str::to_string),
            ..ActionSpec::wait()
        }
    }

    #[test]
    fn test_click_requires_ref() {
        assert!(click(Some("e1")).validate().is_ok());
        assert!(matches!(
            click(None).validate(),
            Err(EngineError::InvalidArgument(_))
        ));
        assert!(click(Some("")).validate().is_err());
    }

    #[test]
    fn test_type_requires_ref_and_text() {
        let mut spec = ActionSpec {
            kind: ActionKind::Type,
            target_ref: Some("e2".to_string()),
            ..ActionSpec::wait()
        };
        assert!(spec.validate().is_err());
        spec.text = Some("hello".to_string());
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_navigate_and_press_key() {
        let nav = ActionSpec {
            kind: ActionKind::Navigate,
            url: Some("https://example.com".to_string()),
            ..ActionSpec::wait()
        };
        assert!(nav.validate().is_ok());

        let press = ActionSpec {
            kind: ActionKind::PressKey,
            ..ActionSpec::wait()
        };
        assert!(press.validate().is_err());
    }

    #[test]
    fn test_wait_needs_nothing() {
        assert!(ActionSpec::wait().validate().is_ok());
    }

    #[test]
    fn test_redaction_hides_typed_text() {
        let spec = ActionSpec {
            kind: ActionKind::Type,
            target_ref: Some("e2".to_string()),
            text: Some("hunter2".to_string()),
            ..ActionSpec::wait()
        };
        let redacted = spec.redacted();
        assert_eq!(redacted.text.as_deref(), Some("[redacted]"));
        assert_eq!(redacted.target_ref.as_deref(), Some("e2"));
        // The original is untouched.
        assert_eq!(spec.text.as_deref(), Some("hunter2"));
    }
}
