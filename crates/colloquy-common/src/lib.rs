//! # colloquy-common
//!
//! Data model shared by the colloquy crates: requests, responses and their
//! output items, stream events, conversation log entries, configuration and
//! function tool definitions.
//!
//! ## Example
//!
//! ```
//! use colloquy_common::{FunctionDefinition, InputItem, Parameters, Property, ResponsesRequest};
//! use std::collections::HashMap;
//!
//! let params = Parameters::new(
//!     HashMap::from([("city".to_string(), Property::string("City name"))]),
//!     vec!["city".to_string()],
//! );
//! let weather = FunctionDefinition::new("get_weather", "Current weather", &params).unwrap();
//!
//! let request = ResponsesRequest::builder()
//!     .model("gpt-4o")
//!     .input(vec![InputItem::user("Weather in Paris?")])
//!     .tools(vec![weather.into()])
//!     .build();
//! assert_eq!(request.tools.len(), 1);
//! ```

/// Client connection settings and conversation defaults.
pub mod config;
/// Conversation log entries.
pub mod entry;
/// Stream events and API errors.
pub mod events;
/// Request types.
pub mod request;
/// Response documents and output items.
pub mod response;
/// Function tool definitions.
pub mod tools;

pub use config::{Config, ConfigError, ConversationConfig, DEFAULT_BASE_URL, DecodePolicy};
pub use entry::Entry;
pub use events::{ApiError, ErrorResponse, StreamEvent};
pub use request::{
    Input, InputItem, InputPart, MessageContent, ReasoningConfig, ReasoningEffort,
    ReasoningSummary, ResponsesRequest, ResponsesTool, Role, ToolChoice,
};
pub use response::{
    Annotation, CodeInterpreterCall, ComputerCall, ContentPart, CustomToolCall, FileSearchCall,
    FunctionToolCall, ImageGenerationCall, IncompleteDetails, ItemStatus, LocalShellCall, LogProb,
    McpCall, McpListTools, OutputItem, OutputMessage, OutputText, ReasoningItem, ReasoningText,
    Refusal, Response, ResponseError, ResponseStatus, ResponseUsage, SummaryPart, TopLogProb,
    WebSearchCall,
};
pub use tools::{FunctionDefinition, Parameters, Property, ToolCall};
