//! Response document types for the Responses API.
//!
//! A [`Response`] is the model's answer to one turn. While streaming it is a
//! partially materialized document; after a terminal status has been folded in
//! it is final.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::request::Role;

// ============================================================================
// Response
// ============================================================================

/// A model response, as returned by `POST /responses` or carried by stream events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Unique response ID.
    pub id: String,
    /// Unix timestamp of creation.
    #[serde(default)]
    pub created_at: i64,
    /// Model that generated the response.
    #[serde(default)]
    pub model: String,
    /// Status of the response.
    pub status: ResponseStatus,
    /// Output items, in output-index order.
    #[serde(default)]
    pub output: Vec<OutputItem>,
    /// Error details, present when status is `failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
    /// Details about why the response is incomplete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incomplete_details: Option<IncompleteDetails>,
    /// The response this one continues, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
    /// Token usage statistics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<ResponseUsage>,
    /// Additional metadata.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Response {
    /// Creates an empty response with the given id and status.
    pub fn new(id: impl Into<String>, status: ResponseStatus) -> Self {
        Self {
            id: id.into(),
            created_at: 0,
            model: String::new(),
            status,
            output: Vec::new(),
            error: None,
            incomplete_details: None,
            previous_response_id: None,
            usage: None,
            metadata: HashMap::new(),
        }
    }

    /// Creation time as a `DateTime`, if the timestamp is representable.
    #[must_use]
    pub fn created_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_at, 0)
    }

    /// Concatenated `output_text` of every message item, in output order.
    #[must_use]
    pub fn output_text(&self) -> String {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::Message(message) => Some(message.text()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Iterates over the function-call items of this response.
    pub fn function_calls(&self) -> impl Iterator<Item = &FunctionToolCall> {
        self.output.iter().filter_map(|item| match item {
            OutputItem::FunctionCall(call) => Some(call),
            _ => None,
        })
    }
}

/// Status of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    /// Response is queued for processing.
    Queued,
    /// Response is being generated.
    InProgress,
    /// Response completed successfully.
    Completed,
    /// Response is incomplete (hit max tokens or content filter).
    Incomplete,
    /// Response generation failed.
    Failed,
    /// Response was cancelled.
    Cancelled,
}

impl ResponseStatus {
    /// Whether no further output will be produced for a response in this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Incomplete | Self::Failed | Self::Cancelled
        )
    }
}

/// Error returned when the model fails to generate a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseError {
    /// The error code.
    pub code: String,
    /// A human-readable description of the error.
    pub message: String,
}

/// Details about why a response is incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncompleteDetails {
    /// The reason the response is incomplete.
    pub reason: String,
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseUsage {
    /// Input tokens consumed.
    pub input_tokens: u32,
    /// Output tokens generated.
    pub output_tokens: u32,
    /// Total tokens used.
    #[serde(default)]
    pub total_tokens: u32,
    /// Detailed input token breakdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens_details: Option<InputTokensDetails>,
    /// Detailed output token breakdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens_details: Option<OutputTokensDetails>,
}

/// Detailed input token breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputTokensDetails {
    /// Tokens served from cache.
    #[serde(default)]
    pub cached_tokens: u32,
}

/// Detailed output token breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputTokensDetails {
    /// Tokens spent on reasoning.
    #[serde(default)]
    pub reasoning_tokens: u32,
}

// ============================================================================
// Output Items
// ============================================================================

/// One unit of model output, addressed by `id` and by its position in
/// [`Response::output`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    /// An assistant message.
    Message(OutputMessage),
    /// A call to a locally registered function.
    FunctionCall(FunctionToolCall),
    /// A hosted web search.
    WebSearchCall(WebSearchCall),
    /// A hosted file search.
    FileSearchCall(FileSearchCall),
    /// Reasoning produced by the model.
    Reasoning(ReasoningItem),
    /// A hosted image generation.
    ImageGenerationCall(ImageGenerationCall),
    /// A hosted code interpreter run.
    CodeInterpreterCall(CodeInterpreterCall),
    /// A call to a custom (free-form input) tool.
    CustomToolCall(CustomToolCall),
    /// A computer-use action.
    ComputerCall(ComputerCall),
    /// A call to a tool on a remote MCP server.
    McpCall(McpCall),
    /// The tool listing of a remote MCP server.
    McpListTools(McpListTools),
    /// A local shell command.
    LocalShellCall(LocalShellCall),
}

impl OutputItem {
    /// The stable item id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Message(item) => &item.id,
            Self::FunctionCall(item) => &item.id,
            Self::WebSearchCall(item) => &item.id,
            Self::FileSearchCall(item) => &item.id,
            Self::Reasoning(item) => &item.id,
            Self::ImageGenerationCall(item) => &item.id,
            Self::CodeInterpreterCall(item) => &item.id,
            Self::CustomToolCall(item) => &item.id,
            Self::ComputerCall(item) => &item.id,
            Self::McpCall(item) => &item.id,
            Self::McpListTools(item) => &item.id,
            Self::LocalShellCall(item) => &item.id,
        }
    }

    /// The wire discriminator of this item.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::FunctionCall(_) => "function_call",
            Self::WebSearchCall(_) => "web_search_call",
            Self::FileSearchCall(_) => "file_search_call",
            Self::Reasoning(_) => "reasoning",
            Self::ImageGenerationCall(_) => "image_generation_call",
            Self::CodeInterpreterCall(_) => "code_interpreter_call",
            Self::CustomToolCall(_) => "custom_tool_call",
            Self::ComputerCall(_) => "computer_call",
            Self::McpCall(_) => "mcp_call",
            Self::McpListTools(_) => "mcp_list_tools",
            Self::LocalShellCall(_) => "local_shell_call",
        }
    }
}

/// Lifecycle status shared by output items and hosted tool calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Work on the item has started.
    InProgress,
    /// A hosted search is running.
    Searching,
    /// Hosted code is being interpreted.
    Interpreting,
    /// An image is being generated.
    Generating,
    /// The item is complete.
    Completed,
    /// The item stopped before completion.
    Incomplete,
    /// The item failed.
    Failed,
}

/// An assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputMessage {
    /// Item ID.
    pub id: String,
    /// Author role, always `assistant` in practice.
    #[serde(default = "assistant_role")]
    pub role: Role,
    /// Item status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    /// Ordered content parts (empty when the item is first announced).
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

const fn assistant_role() -> Role {
    Role::Assistant
}

impl OutputMessage {
    /// Concatenated text of the `output_text` parts.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::OutputText(text) => Some(text.text.as_str()),
                ContentPart::Refusal(_) => None,
            })
            .collect()
    }

    /// Concatenated text of the `refusal` parts.
    #[must_use]
    pub fn refusal(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::Refusal(refusal) => Some(refusal.refusal.as_str()),
                ContentPart::OutputText(_) => None,
            })
            .collect()
    }
}

/// A function call emitted by the model.
///
/// During streaming `arguments` starts empty and grows with each delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionToolCall {
    /// Item ID.
    pub id: String,
    /// Correlates the call with its `function_call_output`.
    #[serde(default)]
    pub call_id: String,
    /// Name of the function to call.
    pub name: String,
    /// Arguments as a JSON string.
    #[serde(default)]
    pub arguments: String,
    /// Item status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
}

/// A hosted web search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchCall {
    /// Item ID.
    pub id: String,
    /// Search status.
    pub status: ItemStatus,
    /// The search action taken, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<serde_json::Value>,
}

/// A hosted file search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSearchCall {
    /// Item ID.
    pub id: String,
    /// Search status.
    pub status: ItemStatus,
    /// Queries issued.
    #[serde(default)]
    pub queries: Vec<String>,
    /// Search results, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<serde_json::Value>>,
}

/// Reasoning produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningItem {
    /// Item ID.
    pub id: String,
    /// Reasoning summary parts, addressed by summary index.
    #[serde(default)]
    pub summary: Vec<SummaryPart>,
    /// Raw reasoning text parts, addressed by content index.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<ReasoningText>,
    /// Opaque encrypted reasoning for stateless round-trips.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_content: Option<String>,
    /// Item status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
}

/// One part of a reasoning summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "summary_text")]
pub struct SummaryPart {
    /// Summary text.
    #[serde(default)]
    pub text: String,
}

/// One part of raw reasoning text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "reasoning_text")]
pub struct ReasoningText {
    /// Reasoning text.
    #[serde(default)]
    pub text: String,
}

/// A hosted image generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageGenerationCall {
    /// Item ID.
    pub id: String,
    /// Generation status.
    pub status: ItemStatus,
    /// Base64-encoded final image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Decoded partial images received while streaming, by partial index.
    #[serde(skip)]
    pub partial_images: Vec<Vec<u8>>,
}

/// A hosted code interpreter run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeInterpreterCall {
    /// Item ID.
    pub id: String,
    /// Interpreter status.
    pub status: ItemStatus,
    /// Container the code ran in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    /// The code, accumulated from deltas while streaming.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Run outputs, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<serde_json::Value>>,
}

/// A call to a custom tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomToolCall {
    /// Item ID.
    pub id: String,
    /// Correlates the call with its output.
    #[serde(default)]
    pub call_id: String,
    /// Tool name.
    pub name: String,
    /// Free-form input.
    #[serde(default)]
    pub input: String,
}

/// A computer-use action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputerCall {
    /// Item ID.
    pub id: String,
    /// Correlates the call with its output.
    #[serde(default)]
    pub call_id: String,
    /// The action, passed through untouched.
    #[serde(default)]
    pub action: serde_json::Value,
    /// Safety checks awaiting acknowledgement.
    #[serde(default)]
    pub pending_safety_checks: Vec<serde_json::Value>,
    /// Item status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
}

/// A call to a tool on a remote MCP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpCall {
    /// Item ID.
    pub id: String,
    /// Label of the MCP server.
    #[serde(default)]
    pub server_label: String,
    /// Tool name.
    pub name: String,
    /// Arguments as a JSON string.
    #[serde(default)]
    pub arguments: String,
    /// Tool output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Tool error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The tool listing of a remote MCP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpListTools {
    /// Item ID.
    pub id: String,
    /// Label of the MCP server.
    #[serde(default)]
    pub server_label: String,
    /// Tool descriptors, passed through untouched.
    #[serde(default)]
    pub tools: Vec<serde_json::Value>,
    /// Listing error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A local shell command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalShellCall {
    /// Item ID.
    pub id: String,
    /// Correlates the call with its output.
    #[serde(default)]
    pub call_id: String,
    /// The command, passed through untouched.
    #[serde(default)]
    pub action: serde_json::Value,
    /// Item status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
}

// ============================================================================
// Message Content
// ============================================================================

/// A content part of an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text output.
    OutputText(OutputText),
    /// Refusal message.
    Refusal(Refusal),
}

impl ContentPart {
    /// Creates an empty `output_text` part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::OutputText(OutputText {
            text: text.into(),
            annotations: Vec::new(),
            logprobs: Vec::new(),
        })
    }

    /// Creates a `refusal` part.
    #[must_use]
    pub fn refusal(refusal: impl Into<String>) -> Self {
        Self::Refusal(Refusal {
            refusal: refusal.into(),
        })
    }
}

/// Text output with its annotations and log probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputText {
    /// The text content.
    #[serde(default)]
    pub text: String,
    /// Annotations, addressed by annotation index.
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    /// Token log probabilities, when requested.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logprobs: Vec<LogProb>,
}

/// A refusal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refusal {
    /// The refusal message.
    #[serde(default)]
    pub refusal: String,
}

/// A citation or file reference attached to output text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    /// Citation of an uploaded file.
    FileCitation {
        /// File ID.
        file_id: String,
        /// File name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
        /// Character index in the text.
        #[serde(default)]
        index: u32,
    },
    /// Citation of a web page.
    UrlCitation {
        /// Cited URL.
        url: String,
        /// Page title.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        /// Start of the cited span.
        #[serde(default)]
        start_index: u32,
        /// End of the cited span.
        #[serde(default)]
        end_index: u32,
    },
    /// Citation of a file inside a code interpreter container.
    ContainerFileCitation {
        /// Container ID.
        container_id: String,
        /// File ID.
        file_id: String,
        /// File name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
        /// Start of the cited span.
        #[serde(default)]
        start_index: u32,
        /// End of the cited span.
        #[serde(default)]
        end_index: u32,
    },
    /// Path to a generated file.
    FilePath {
        /// File ID.
        file_id: String,
        /// Character index in the text.
        #[serde(default)]
        index: u32,
    },
    /// An annotation kind this library does not model yet.
    #[serde(untagged)]
    Other(serde_json::Value),
}

/// Log probability of one output token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogProb {
    /// Token text.
    pub token: String,
    /// Log probability of the token.
    pub logprob: f64,
    /// UTF-8 bytes of the token.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bytes: Vec<u8>,
    /// Most likely alternatives at this position.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_logprobs: Vec<TopLogProb>,
}

/// An alternative token at a log-probability position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopLogProb {
    /// Token text.
    pub token: String,
    /// Log probability of the token.
    pub logprob: f64,
    /// UTF-8 bytes of the token.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use super::*;

    #[test]
    fn test_completed_response_deserializes() {
        let response: Response = serde_json::from_value(serde_json::json!({
            "id": "resp_1",
            "object": "response",
            "created_at": 1_700_000_000,
            "model": "gpt-4o",
            "status": "completed",
            "output": [
                {
                    "type": "reasoning",
                    "id": "rs_1",
                    "summary": [{"type": "summary_text", "text": "Thinking."}]
                },
                {
                    "type": "message",
                    "id": "msg_1",
                    "role": "assistant",
                    "status": "completed",
                    "content": [{
                        "type": "output_text",
                        "text": "Hello!",
                        "annotations": [{
                            "type": "url_citation",
                            "url": "https://example.com",
                            "title": "Example",
                            "start_index": 0,
                            "end_index": 5
                        }]
                    }]
                },
                {
                    "type": "function_call",
                    "id": "fc_1",
                    "call_id": "call_1",
                    "name": "get_weather",
                    "arguments": "{\"city\":\"Paris\"}",
                    "status": "completed"
                }
            ],
            "usage": {"input_tokens": 3, "output_tokens": 4, "total_tokens": 7}
        }))
        .unwrap();

        assert_eq!(response.status, ResponseStatus::Completed);
        assert_eq!(response.output.len(), 3);
        assert_eq!(response.output[1].id(), "msg_1");
        assert_eq!(response.output[1].kind(), "message");
        assert_eq!(response.output_text(), "Hello!");
        assert_eq!(response.function_calls().count(), 1);
        assert_eq!(response.usage.as_ref().unwrap().total_tokens, 7);
        assert!(response.created_time().is_some());

        let OutputItem::Reasoning(reasoning) = &response.output[0] else {
            panic!("expected reasoning item");
        };
        assert_eq!(reasoning.summary[0].text, "Thinking.");
    }

    #[test]
    fn test_unknown_annotation_is_preserved() {
        let part: ContentPart = serde_json::from_value(serde_json::json!({
            "type": "output_text",
            "text": "x",
            "annotations": [{"type": "brand_new_citation", "span": [1, 2]}]
        }))
        .unwrap();

        let ContentPart::OutputText(text) = part else {
            panic!("expected output_text");
        };
        assert!(matches!(text.annotations[0], Annotation::Other(_)));
    }

    #[test]
    fn test_partial_images_are_not_serialized() {
        let item = OutputItem::ImageGenerationCall(ImageGenerationCall {
            id: "ig_1".to_string(),
            status: ItemStatus::Generating,
            result: None,
            partial_images: vec![vec![1, 2, 3]],
        });

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "image_generation_call");
        assert_eq!(json["status"], "generating");
        assert!(json.get("partial_images").is_none());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!ResponseStatus::Queued.is_terminal());
        assert!(!ResponseStatus::InProgress.is_terminal());
        assert!(ResponseStatus::Completed.is_terminal());
        assert!(ResponseStatus::Incomplete.is_terminal());
        assert!(ResponseStatus::Failed.is_terminal());
        assert!(ResponseStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_message_text_skips_refusals() {
        let message = OutputMessage {
            id: "msg_1".to_string(),
            role: Role::Assistant,
            status: None,
            content: vec![
                ContentPart::text("Hi"),
                ContentPart::refusal("no"),
                ContentPart::text(" there"),
            ],
        };

        assert_eq!(message.text(), "Hi there");
        assert_eq!(message.refusal(), "no");
    }
}
