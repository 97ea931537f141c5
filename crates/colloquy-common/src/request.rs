//! Request types for the Responses API.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::tools::FunctionDefinition;

// ============================================================================
// Role Types
// ============================================================================

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message.
    User,
    /// Assistant message.
    Assistant,
    /// System message.
    System,
    /// Developer message.
    Developer,
}

// ============================================================================
// Input
// ============================================================================

/// The `input` of a request: either plain text or a list of input items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Input {
    /// A single user text.
    Text(String),
    /// Structured input items.
    Items(Vec<InputItem>),
}

impl Input {
    /// Whether the input carries nothing to send.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Items(items) => items.is_empty(),
        }
    }
}

impl From<&str> for Input {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Input {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<InputItem>> for Input {
    fn from(items: Vec<InputItem>) -> Self {
        Self::Items(items)
    }
}

/// Content for a message: simple text or multimodal parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content.
    Text(String),
    /// Array of content parts for multimodal content.
    Parts(Vec<InputPart>),
}

impl MessageContent {
    /// The concatenated text of this content, ignoring non-text parts.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    InputPart::InputText { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }
}

/// A part of multimodal input content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputPart {
    /// Text content part.
    InputText {
        /// The text content.
        text: String,
    },
    /// Image content part, by URL (including data URLs) or uploaded file.
    InputImage {
        /// Image URL.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image_url: Option<String>,
        /// Uploaded file ID.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_id: Option<String>,
        /// Detail level (`low`, `high`, `auto`).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    /// File content part.
    InputFile {
        /// Uploaded file ID.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_id: Option<String>,
        /// File URL.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_url: Option<String>,
        /// File name, required with inline data.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
        /// Inline base64 file data.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_data: Option<String>,
    },
}

/// Input items that can be sent to the Responses API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputItem {
    /// A message in the conversation.
    Message {
        /// Role of the message author.
        role: Role,
        /// Content of the message.
        content: MessageContent,
    },
    /// Output from a function call.
    FunctionCallOutput {
        /// ID of the function call this is responding to.
        call_id: String,
        /// Output from the function.
        output: String,
    },
    /// Output from a custom tool call.
    CustomToolCallOutput {
        /// ID of the custom tool call this is responding to.
        call_id: String,
        /// Output from the tool.
        output: String,
    },
    /// A reference to a stored item.
    ItemReference {
        /// ID of the referenced item.
        id: String,
    },
}

impl InputItem {
    /// A user text message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::Message {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    /// A developer text message.
    pub fn developer(text: impl Into<String>) -> Self {
        Self::Message {
            role: Role::Developer,
            content: MessageContent::Text(text.into()),
        }
    }

    /// The output of a function call.
    pub fn function_call_output(call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self::FunctionCallOutput {
            call_id: call_id.into(),
            output: output.into(),
        }
    }
}

// ============================================================================
// Tool Types
// ============================================================================

/// A tool made available to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponsesTool {
    /// A locally executed function.
    Function(FunctionDefinition),
    /// Hosted web search.
    WebSearchPreview {
        /// How much context to retrieve (`low`, `medium`, `high`).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        search_context_size: Option<String>,
    },
    /// Hosted file search over vector stores.
    FileSearch {
        /// Vector stores to search.
        vector_store_ids: Vec<String>,
        /// Maximum number of results.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_num_results: Option<u32>,
    },
    /// Hosted code interpreter.
    CodeInterpreter {
        /// Container ID or container settings, e.g. `{"type": "auto"}`.
        container: serde_json::Value,
    },
    /// Hosted image generation.
    ImageGeneration {
        /// Number of partial images to stream.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        partial_images: Option<u32>,
    },
    /// A remote MCP server.
    Mcp {
        /// Label identifying the server in output items.
        server_label: String,
        /// Server URL.
        server_url: String,
        /// Approval policy (`never`, `always`, or a per-tool filter).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        require_approval: Option<serde_json::Value>,
    },
}

impl From<FunctionDefinition> for ResponsesTool {
    fn from(function: FunctionDefinition) -> Self {
        Self::Function(function)
    }
}

/// Tool selection strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolChoice {
    /// String-based choice (`auto`, `none`, `required`).
    Mode(String),
    /// Force a specific function.
    Function {
        /// Type, always `function`.
        #[serde(rename = "type")]
        choice_type: String,
        /// Name of the function to call.
        name: String,
    },
}

impl ToolChoice {
    /// Let the model decide.
    #[must_use]
    pub fn auto() -> Self {
        Self::Mode("auto".to_string())
    }

    /// Never call tools.
    #[must_use]
    pub fn none() -> Self {
        Self::Mode("none".to_string())
    }

    /// Call at least one tool.
    #[must_use]
    pub fn required() -> Self {
        Self::Mode("required".to_string())
    }

    /// Force a call to the named function.
    pub fn function(name: impl Into<String>) -> Self {
        Self::Function {
            choice_type: "function".to_string(),
            name: name.into(),
        }
    }
}

// ============================================================================
// Reasoning Configuration
// ============================================================================

/// Reasoning configuration for models that support it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningConfig {
    /// Effort level for reasoning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<ReasoningEffort>,
    /// Whether to generate a summary of reasoning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ReasoningSummary>,
}

/// Reasoning effort level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    /// Minimal reasoning effort.
    Minimal,
    /// Low reasoning effort.
    Low,
    /// Medium reasoning effort.
    Medium,
    /// High reasoning effort.
    High,
}

/// Reasoning summary configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningSummary {
    /// Let the model pick.
    Auto,
    /// Generate a concise summary.
    Concise,
    /// Generate a detailed summary.
    Detailed,
}

// ============================================================================
// Request
// ============================================================================

/// Request for the Responses API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct ResponsesRequest {
    /// Model identifier.
    #[builder(setter(into))]
    pub model: String,
    /// Text or input items for this turn.
    #[builder(setter(into))]
    pub input: Input,
    /// Instructions for the model (system prompt).
    #[builder(default, setter(strip_option, into))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Previous response ID for stateful conversations.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
    /// Tools available for the model.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ResponsesTool>,
    /// Tool selection strategy.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    /// Sampling temperature (0.0-2.0).
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Nucleus sampling threshold (0.0-1.0).
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Maximum output tokens to generate.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Whether the model may call tools in parallel.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_tool_calls: Option<bool>,
    /// Whether to store the response for later retrieval.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<bool>,
    /// Reasoning configuration.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<ReasoningConfig>,
    /// Truncation strategy (`auto` or `disabled`).
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncation: Option<String>,
    /// Request metadata.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
    /// Extra output to include, e.g. `reasoning.encrypted_content`.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    /// End-user identifier.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Whether to stream the response.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl ResponsesRequest {
    /// Returns this request with `stream` set.
    #[must_use]
    pub fn streaming(mut self, stream: bool) -> Self {
        self.stream = Some(stream);
        self
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn test_minimal_request_serialization() {
        let request = ResponsesRequest::builder()
            .model("gpt-4o")
            .input("Hi")
            .build();

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, json!({"model": "gpt-4o", "input": "Hi"}));
    }

    #[test]
    fn test_full_request_serialization() {
        let request = ResponsesRequest::builder()
            .model("gpt-4o")
            .input(vec![
                InputItem::user("What's the weather?"),
                InputItem::function_call_output("call_1", "sunny"),
                InputItem::ItemReference {
                    id: "msg_0".to_string(),
                },
            ])
            .instructions("Be brief.")
            .previous_response_id(Some("resp_0".to_string()))
            .tools(vec![
                ResponsesTool::Function(FunctionDefinition {
                    name: "get_weather".to_string(),
                    description: "Get the weather".to_string(),
                    parameters: json!({"type": "object", "properties": {}}),
                    strict: Some(true),
                }),
                ResponsesTool::WebSearchPreview {
                    search_context_size: None,
                },
            ])
            .tool_choice(Some(ToolChoice::function("get_weather")))
            .reasoning(Some(ReasoningConfig {
                effort: Some(ReasoningEffort::Low),
                summary: Some(ReasoningSummary::Auto),
            }))
            .build()
            .streaming(true);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["input"][0]["type"], "message");
        assert_eq!(json["input"][0]["role"], "user");
        assert_eq!(json["input"][1]["type"], "function_call_output");
        assert_eq!(json["input"][2]["type"], "item_reference");
        assert_eq!(json["instructions"], "Be brief.");
        assert_eq!(json["previous_response_id"], "resp_0");
        assert_eq!(json["tools"][0]["type"], "function");
        assert_eq!(json["tools"][0]["name"], "get_weather");
        assert_eq!(json["tools"][0]["strict"], true);
        assert_eq!(json["tools"][1], json!({"type": "web_search_preview"}));
        assert_eq!(
            json["tool_choice"],
            json!({"type": "function", "name": "get_weather"})
        );
        assert_eq!(json["reasoning"], json!({"effort": "low", "summary": "auto"}));
        assert_eq!(json["stream"], true);
    }

    #[test]
    fn test_tool_choice_modes() {
        assert_eq!(serde_json::to_value(ToolChoice::auto()).unwrap(), "auto");
        assert_eq!(serde_json::to_value(ToolChoice::none()).unwrap(), "none");
        assert_eq!(
            serde_json::to_value(ToolChoice::required()).unwrap(),
            "required"
        );
    }

    #[test]
    fn test_multimodal_content_text() {
        let content = MessageContent::Parts(vec![
            InputPart::InputText {
                text: "Look at ".to_string(),
            },
            InputPart::InputImage {
                image_url: Some("https://example.com/cat.png".to_string()),
                file_id: None,
                detail: None,
            },
            InputPart::InputText {
                text: "this".to_string(),
            },
        ]);

        assert_eq!(content.text(), "Look at this");
    }
}
