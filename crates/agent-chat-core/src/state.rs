//! UI-agnostic chat state types
//!
//! These are shared between the core submission cycle, the AI provider
//! clients and the terminal renderer, and don't depend on any UI framework.

use serde::{Deserialize, Serialize};

/// Content of the assistant placeholder shown while a reply is outstanding.
pub const PENDING_MARKER: &str = "Thinking...";

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// The assistant message standing in for a reply not yet received
    pub fn placeholder() -> Self {
        Self::assistant(PENDING_MARKER)
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}
