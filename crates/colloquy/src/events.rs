//! Event types for conversation orchestration
//!
//! A [`Conversation`](crate::Conversation) emits these while it runs a turn:
//! every decoded stream event, the outcome of each local tool call, and the
//! end of each request. They are one-way notifications; the conversation
//! awaits the callback but never changes course because of it.

use std::future::Future;
use std::pin::Pin;

use colloquy_common::{ResponseStatus, StreamEvent};

/// Events emitted by a conversation while a turn runs
#[derive(Debug, Clone)]
pub enum ConversationEvent {
    /// A stream event, after it has been folded into the entry log
    Stream(StreamEvent),

    /// A local tool call finished
    ToolResult {
        /// Name of the function that was called
        name: String,
        /// Call id the output answers
        call_id: String,
        /// Output sent back to the model, or the failure message
        output: String,
        /// Whether execution succeeded
        success: bool,
    },

    /// A request's stream ended with a response
    TurnCompleted {
        response_id: String,
        status: ResponseStatus,
    },
}

/// Async callback for receiving conversation events
pub type EventCallback =
    Box<dyn Fn(ConversationEvent) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;
