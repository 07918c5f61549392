pub mod ai;
pub mod config;
pub mod conversation;
pub mod error;
pub mod provider;
pub mod service;
pub mod state;
pub mod widget;

// Re-export main types for convenience
pub use ai::{ClaudeClient, OllamaClient, OpenAIClient};
pub use config::Config;
pub use conversation::{Conversation, ConversationError};
pub use error::{classify, classify_text, ErrorClass, ServiceError};
pub use provider::Provider;
pub use service::ReplyService;
pub use state::{Message, Role, PENDING_MARKER};
pub use widget::{ChatView, ChatWidget, CycleOutcome, CycleState, Settled, SubmitOutcome};
