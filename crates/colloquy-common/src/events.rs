//! Server-sent stream events of the Responses API.
//!
//! Every `data:` line of a streamed response decodes into one [`StreamEvent`],
//! discriminated by its `type` field. Item-level events address their target
//! by `output_index` plus `item_id`, and content-level events add a
//! `content_index`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::response::{Annotation, ContentPart, LogProb, OutputItem, Response, SummaryPart};

/// A single event of a streamed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StreamEvent {
    // ------------------------------------------------------------------
    // Response lifecycle
    // ------------------------------------------------------------------
    /// A new response was created.
    #[serde(rename = "response.created")]
    ResponseCreated {
        /// The initial response object.
        response: Response,
    },
    /// The response is queued.
    #[serde(rename = "response.queued")]
    ResponseQueued {
        /// The response object.
        response: Response,
    },
    /// The response is in progress.
    #[serde(rename = "response.in_progress")]
    ResponseInProgress {
        /// The response object.
        response: Response,
    },
    /// The response completed.
    #[serde(rename = "response.completed")]
    ResponseCompleted {
        /// The final response object.
        response: Response,
    },
    /// The response failed; `response.error` says why.
    #[serde(rename = "response.failed")]
    ResponseFailed {
        /// The final response object.
        response: Response,
    },
    /// The response stopped early; `response.incomplete_details` says why.
    #[serde(rename = "response.incomplete")]
    ResponseIncomplete {
        /// The final response object.
        response: Response,
    },

    // ------------------------------------------------------------------
    // Output items and content parts
    // ------------------------------------------------------------------
    /// An output item was added.
    #[serde(rename = "response.output_item.added")]
    OutputItemAdded {
        /// Index of the output item.
        output_index: usize,
        /// The new output item.
        item: OutputItem,
    },
    /// An output item is complete.
    #[serde(rename = "response.output_item.done")]
    OutputItemDone {
        /// Index of the output item.
        output_index: usize,
        /// The completed output item.
        item: OutputItem,
    },
    /// A content part was added to a message.
    #[serde(rename = "response.content_part.added")]
    ContentPartAdded {
        /// Index of the output item.
        output_index: usize,
        /// ID of the message item.
        item_id: String,
        /// Index of the content part.
        content_index: usize,
        /// The new content part.
        part: ContentPart,
    },
    /// A content part is complete.
    #[serde(rename = "response.content_part.done")]
    ContentPartDone {
        /// Index of the output item.
        output_index: usize,
        /// ID of the message item.
        item_id: String,
        /// Index of the content part.
        content_index: usize,
        /// The completed content part.
        part: ContentPart,
    },

    // ------------------------------------------------------------------
    // Text and refusals
    // ------------------------------------------------------------------
    /// Text was appended to an `output_text` part.
    #[serde(rename = "response.output_text.delta")]
    OutputTextDelta {
        /// Index of the output item.
        output_index: usize,
        /// ID of the message item.
        item_id: String,
        /// Index of the content part.
        content_index: usize,
        /// The text delta.
        delta: String,
        /// Log probabilities of the delta tokens.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        logprobs: Vec<LogProb>,
    },
    /// An `output_text` part is complete.
    #[serde(rename = "response.output_text.done")]
    OutputTextDone {
        /// Index of the output item.
        output_index: usize,
        /// ID of the message item.
        item_id: String,
        /// Index of the content part.
        content_index: usize,
        /// The final text.
        text: String,
        /// Final log probabilities, when carried.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        logprobs: Option<Vec<LogProb>>,
    },
    /// An annotation was added to an `output_text` part.
    #[serde(rename = "response.output_text.annotation.added")]
    OutputTextAnnotationAdded {
        /// Index of the output item.
        output_index: usize,
        /// ID of the message item.
        item_id: String,
        /// Index of the content part.
        content_index: usize,
        /// Index of the annotation within the part.
        annotation_index: usize,
        /// The annotation.
        annotation: Annotation,
    },
    /// Text was appended to a `refusal` part.
    #[serde(rename = "response.refusal.delta")]
    RefusalDelta {
        /// Index of the output item.
        output_index: usize,
        /// ID of the message item.
        item_id: String,
        /// Index of the content part.
        content_index: usize,
        /// The refusal delta.
        delta: String,
    },
    /// A `refusal` part is complete.
    #[serde(rename = "response.refusal.done")]
    RefusalDone {
        /// Index of the output item.
        output_index: usize,
        /// ID of the message item.
        item_id: String,
        /// Index of the content part.
        content_index: usize,
        /// The final refusal.
        refusal: String,
    },

    // ------------------------------------------------------------------
    // Function, custom and MCP calls
    // ------------------------------------------------------------------
    /// Arguments were appended to a function call.
    #[serde(rename = "response.function_call_arguments.delta")]
    FunctionCallArgumentsDelta {
        /// Index of the output item.
        output_index: usize,
        /// ID of the function-call item.
        item_id: String,
        /// The arguments delta.
        delta: String,
    },
    /// The arguments of a function call are complete.
    #[serde(rename = "response.function_call_arguments.done")]
    FunctionCallArgumentsDone {
        /// Index of the output item.
        output_index: usize,
        /// ID of the function-call item.
        item_id: String,
        /// The final arguments.
        arguments: String,
    },
    /// Input was appended to a custom tool call.
    #[serde(rename = "response.custom_tool_call_input.delta")]
    CustomToolCallInputDelta {
        /// Index of the output item.
        output_index: usize,
        /// ID of the custom-tool-call item.
        item_id: String,
        /// The input delta.
        delta: String,
    },
    /// The input of a custom tool call is complete.
    #[serde(rename = "response.custom_tool_call_input.done")]
    CustomToolCallInputDone {
        /// Index of the output item.
        output_index: usize,
        /// ID of the custom-tool-call item.
        item_id: String,
        /// The final input.
        input: String,
    },
    /// Arguments were appended to an MCP call.
    #[serde(rename = "response.mcp_call_arguments.delta")]
    McpCallArgumentsDelta {
        /// Index of the output item.
        output_index: usize,
        /// ID of the MCP-call item.
        item_id: String,
        /// The arguments delta.
        delta: String,
    },
    /// The arguments of an MCP call are complete.
    #[serde(rename = "response.mcp_call_arguments.done")]
    McpCallArgumentsDone {
        /// Index of the output item.
        output_index: usize,
        /// ID of the MCP-call item.
        item_id: String,
        /// The final arguments.
        arguments: String,
    },
    /// An MCP call started.
    #[serde(rename = "response.mcp_call.in_progress")]
    McpCallInProgress {
        /// Index of the output item.
        output_index: usize,
        /// ID of the MCP-call item.
        item_id: String,
    },
    /// An MCP call completed.
    #[serde(rename = "response.mcp_call.completed")]
    McpCallCompleted {
        /// Index of the output item.
        output_index: usize,
        /// ID of the MCP-call item.
        item_id: String,
    },
    /// An MCP call failed.
    #[serde(rename = "response.mcp_call.failed")]
    McpCallFailed {
        /// Index of the output item.
        output_index: usize,
        /// ID of the MCP-call item.
        item_id: String,
    },
    /// Listing the tools of an MCP server started.
    #[serde(rename = "response.mcp_list_tools.in_progress")]
    McpListToolsInProgress {
        /// Index of the output item.
        output_index: usize,
        /// ID of the listing item.
        item_id: String,
    },
    /// Listing the tools of an MCP server completed.
    #[serde(rename = "response.mcp_list_tools.completed")]
    McpListToolsCompleted {
        /// Index of the output item.
        output_index: usize,
        /// ID of the listing item.
        item_id: String,
    },
    /// Listing the tools of an MCP server failed.
    #[serde(rename = "response.mcp_list_tools.failed")]
    McpListToolsFailed {
        /// Index of the output item.
        output_index: usize,
        /// ID of the listing item.
        item_id: String,
    },

    // ------------------------------------------------------------------
    // Hosted tool status
    // ------------------------------------------------------------------
    /// A web search started.
    #[serde(rename = "response.web_search_call.in_progress")]
    WebSearchCallInProgress {
        /// Index of the output item.
        output_index: usize,
        /// ID of the web-search item.
        item_id: String,
    },
    /// A web search is running.
    #[serde(rename = "response.web_search_call.searching")]
    WebSearchCallSearching {
        /// Index of the output item.
        output_index: usize,
        /// ID of the web-search item.
        item_id: String,
    },
    /// A web search completed.
    #[serde(rename = "response.web_search_call.completed")]
    WebSearchCallCompleted {
        /// Index of the output item.
        output_index: usize,
        /// ID of the web-search item.
        item_id: String,
    },
    /// A file search started.
    #[serde(rename = "response.file_search_call.in_progress")]
    FileSearchCallInProgress {
        /// Index of the output item.
        output_index: usize,
        /// ID of the file-search item.
        item_id: String,
    },
    /// A file search is running.
    #[serde(rename = "response.file_search_call.searching")]
    FileSearchCallSearching {
        /// Index of the output item.
        output_index: usize,
        /// ID of the file-search item.
        item_id: String,
    },
    /// A file search completed.
    #[serde(rename = "response.file_search_call.completed")]
    FileSearchCallCompleted {
        /// Index of the output item.
        output_index: usize,
        /// ID of the file-search item.
        item_id: String,
    },
    /// A code interpreter run started.
    #[serde(rename = "response.code_interpreter_call.in_progress")]
    CodeInterpreterCallInProgress {
        /// Index of the output item.
        output_index: usize,
        /// ID of the code-interpreter item.
        item_id: String,
    },
    /// Code is being interpreted.
    #[serde(rename = "response.code_interpreter_call.interpreting")]
    CodeInterpreterCallInterpreting {
        /// Index of the output item.
        output_index: usize,
        /// ID of the code-interpreter item.
        item_id: String,
    },
    /// A code interpreter run completed.
    #[serde(rename = "response.code_interpreter_call.completed")]
    CodeInterpreterCallCompleted {
        /// Index of the output item.
        output_index: usize,
        /// ID of the code-interpreter item.
        item_id: String,
    },
    /// Code was appended to a code interpreter call.
    #[serde(rename = "response.code_interpreter_call_code.delta")]
    CodeInterpreterCallCodeDelta {
        /// Index of the output item.
        output_index: usize,
        /// ID of the code-interpreter item.
        item_id: String,
        /// The code delta.
        delta: String,
    },
    /// The code of a code interpreter call is complete.
    #[serde(rename = "response.code_interpreter_call_code.done")]
    CodeInterpreterCallCodeDone {
        /// Index of the output item.
        output_index: usize,
        /// ID of the code-interpreter item.
        item_id: String,
        /// The final code.
        code: String,
    },
    /// An image generation started.
    #[serde(rename = "response.image_generation_call.in_progress")]
    ImageGenerationCallInProgress {
        /// Index of the output item.
        output_index: usize,
        /// ID of the image-generation item.
        item_id: String,
    },
    /// An image is being generated.
    #[serde(rename = "response.image_generation_call.generating")]
    ImageGenerationCallGenerating {
        /// Index of the output item.
        output_index: usize,
        /// ID of the image-generation item.
        item_id: String,
    },
    /// An image generation completed.
    #[serde(rename = "response.image_generation_call.completed")]
    ImageGenerationCallCompleted {
        /// Index of the output item.
        output_index: usize,
        /// ID of the image-generation item.
        item_id: String,
    },
    /// A partial image is available.
    #[serde(rename = "response.image_generation_call.partial_image")]
    ImageGenerationCallPartialImage {
        /// Index of the output item.
        output_index: usize,
        /// ID of the image-generation item.
        item_id: String,
        /// Index of the partial image.
        partial_image_index: usize,
        /// Base64-encoded partial image.
        partial_image_b64: String,
    },

    // ------------------------------------------------------------------
    // Reasoning
    // ------------------------------------------------------------------
    /// A reasoning summary part was added.
    #[serde(rename = "response.reasoning_summary_part.added")]
    ReasoningSummaryPartAdded {
        /// Index of the output item.
        output_index: usize,
        /// ID of the reasoning item.
        item_id: String,
        /// Index of the summary part.
        summary_index: usize,
        /// The summary part.
        part: SummaryPart,
    },
    /// A reasoning summary part is complete.
    #[serde(rename = "response.reasoning_summary_part.done")]
    ReasoningSummaryPartDone {
        /// Index of the output item.
        output_index: usize,
        /// ID of the reasoning item.
        item_id: String,
        /// Index of the summary part.
        summary_index: usize,
        /// The completed summary part.
        part: SummaryPart,
    },
    /// Text was appended to a reasoning summary part.
    #[serde(rename = "response.reasoning_summary_text.delta")]
    ReasoningSummaryTextDelta {
        /// Index of the output item.
        output_index: usize,
        /// ID of the reasoning item.
        item_id: String,
        /// Index of the summary part.
        summary_index: usize,
        /// The text delta.
        delta: String,
    },
    /// The text of a reasoning summary part is complete.
    #[serde(rename = "response.reasoning_summary_text.done")]
    ReasoningSummaryTextDone {
        /// Index of the output item.
        output_index: usize,
        /// ID of the reasoning item.
        item_id: String,
        /// Index of the summary part.
        summary_index: usize,
        /// The final text.
        text: String,
    },
    /// Structured reasoning summary delta. Carries nothing the item model stores.
    #[serde(rename = "response.reasoning_summary.delta")]
    ReasoningSummaryDelta {
        /// Index of the output item.
        output_index: usize,
        /// ID of the reasoning item.
        item_id: String,
    },
    /// Structured reasoning summary done. Carries nothing the item model stores.
    #[serde(rename = "response.reasoning_summary.done")]
    ReasoningSummaryDone {
        /// Index of the output item.
        output_index: usize,
        /// ID of the reasoning item.
        item_id: String,
    },
    /// Raw reasoning text was appended.
    #[serde(rename = "response.reasoning_text.delta")]
    ReasoningTextDelta {
        /// Index of the output item.
        output_index: usize,
        /// ID of the reasoning item.
        item_id: String,
        /// Index of the reasoning content slot.
        content_index: usize,
        /// The text delta.
        delta: String,
    },
    /// Raw reasoning text is complete.
    #[serde(rename = "response.reasoning_text.done")]
    ReasoningTextDone {
        /// Index of the output item.
        output_index: usize,
        /// ID of the reasoning item.
        item_id: String,
        /// Index of the reasoning content slot.
        content_index: usize,
        /// The final text.
        text: String,
    },

    // ------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------
    /// The server reported an error mid-stream.
    #[serde(rename = "error")]
    Error {
        /// Error code.
        #[serde(default)]
        code: Option<String>,
        /// Error message.
        #[serde(default)]
        message: String,
        /// The request parameter the error relates to.
        #[serde(default)]
        param: Option<String>,
    },
    /// An event type this library does not know.
    #[serde(other)]
    Unknown,
}

/// An error reported by the API, either as a non-2xx body or as an `error`
/// stream event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error type, e.g. `invalid_request_error`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Error message.
    pub message: String,
    /// The request parameter the error relates to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.error_type, &self.code) {
            (Some(kind), Some(code)) => write!(f, "{kind} ({code}): {}", self.message),
            (Some(label), None) | (None, Some(label)) => write!(f, "{label}: {}", self.message),
            (None, None) => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ApiError {}

/// Wrapper for the `{"error": {...}}` body of a non-2xx response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    /// Error details.
    pub error: ApiError,
}
