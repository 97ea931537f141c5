//! Folding stream events into a materialized conversation log.
//!
//! [`EntryLog`] holds the append-only list of entries of one conversation and
//! applies [`StreamEvent`]s to the response currently being streamed. Every
//! item-level event names the coordinates it targets; when those no longer
//! match the log (the item was replaced, the index holds a different item, the
//! part has another kind) the event is a no-op reported as [`Fold::Ignored`].

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{trace, warn};

use colloquy_common::{
    ApiError, ContentPart, Entry, ItemStatus, OutputItem, ReasoningText, Response,
    ResponsesRequest, StreamEvent, SummaryPart,
};

/// Outcome of applying one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fold {
    /// The event changed the log.
    Applied,
    /// The event did not match the log, or has no effect on the item model.
    Ignored,
}

impl Fold {
    const fn when(applied: bool) -> Self {
        if applied { Self::Applied } else { Self::Ignored }
    }
}

/// The entries of one conversation, with an id index over its responses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryLog {
    entries: Vec<Entry>,
    responses: HashMap<String, usize>,
    current_response_id: Option<String>,
}

impl EntryLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Id of the response most recently created by the stream.
    #[must_use]
    pub fn current_response_id(&self) -> Option<&str> {
        self.current_response_id.as_deref()
    }

    #[must_use]
    pub fn current_response(&self) -> Option<&Response> {
        self.current_response_id
            .as_deref()
            .and_then(|id| self.response(id))
    }

    /// Looks up a response entry by id.
    #[must_use]
    pub fn response(&self, id: &str) -> Option<&Response> {
        self.responses
            .get(id)
            .and_then(|&position| self.entries.get(position))
            .and_then(Entry::as_response)
    }

    pub fn push_request(&mut self, request: ResponsesRequest) {
        self.entries.push(Entry::Request(request));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.responses.clear();
        self.current_response_id = None;
    }

    /// Applies one stream event.
    ///
    /// # Errors
    ///
    /// An `error` event is returned as an [`ApiError`]; the log is left as it
    /// was.
    pub fn apply(&mut self, event: StreamEvent) -> Result<Fold, ApiError> {
        let fold = match event {
            StreamEvent::ResponseCreated { response } => {
                self.begin_response(response);
                Fold::Applied
            }
            StreamEvent::ResponseQueued { response }
            | StreamEvent::ResponseInProgress { response }
            | StreamEvent::ResponseCompleted { response }
            | StreamEvent::ResponseFailed { response }
            | StreamEvent::ResponseIncomplete { response } => self.replace_response(response),

            StreamEvent::OutputItemAdded { output_index, item } => {
                match self.streaming_response_mut() {
                    Some(response) => {
                        let at = output_index.min(response.output.len());
                        response.output.insert(at, item);
                        Fold::Applied
                    }
                    None => Fold::Ignored,
                }
            }
            StreamEvent::OutputItemDone { output_index, item } => {
                let id = item.id().to_owned();
                self.with_item(output_index, &id, |slot| {
                    *slot = item;
                    true
                })
            }

            StreamEvent::ContentPartAdded {
                output_index,
                item_id,
                content_index,
                part,
            } => self.with_item(output_index, &item_id, |item| match item {
                OutputItem::Message(message) => {
                    let at = content_index.min(message.content.len());
                    message.content.insert(at, part);
                    true
                }
                _ => false,
            }),
            StreamEvent::ContentPartDone {
                output_index,
                item_id,
                content_index,
                part,
            } => self.with_part(output_index, &item_id, content_index, |slot| {
                *slot = part;
                true
            }),

            StreamEvent::OutputTextDelta {
                output_index,
                item_id,
                content_index,
                delta,
                logprobs,
            } => self.with_part(output_index, &item_id, content_index, |part| match part {
                ContentPart::OutputText(text) => {
                    text.text.push_str(&delta);
                    text.logprobs.extend(logprobs);
                    true
                }
                ContentPart::Refusal(_) => false,
            }),
            StreamEvent::OutputTextDone {
                output_index,
                item_id,
                content_index,
                text: done,
                logprobs,
            } => self.with_part(output_index, &item_id, content_index, |part| match part {
                ContentPart::OutputText(text) => {
                    text.text = done;
                    if let Some(logprobs) = logprobs {
                        text.logprobs = logprobs;
                    }
                    true
                }
                ContentPart::Refusal(_) => false,
            }),
            StreamEvent::OutputTextAnnotationAdded {
                output_index,
                item_id,
                content_index,
                annotation_index,
                annotation,
            } => self.with_part(output_index, &item_id, content_index, |part| match part {
                ContentPart::OutputText(text) => {
                    let at = annotation_index.min(text.annotations.len());
                    text.annotations.insert(at, annotation);
                    true
                }
                ContentPart::Refusal(_) => false,
            }),

            StreamEvent::RefusalDelta {
                output_index,
                item_id,
                content_index,
                delta,
            } => self.with_part(output_index, &item_id, content_index, |part| match part {
                ContentPart::Refusal(refusal) => {
                    refusal.refusal.push_str(&delta);
                    true
                }
                ContentPart::OutputText(_) => false,
            }),
            StreamEvent::RefusalDone {
                output_index,
                item_id,
                content_index,
                refusal: done,
            } => self.with_part(output_index, &item_id, content_index, |part| match part {
                ContentPart::Refusal(refusal) => {
                    refusal.refusal = done;
                    true
                }
                ContentPart::OutputText(_) => false,
            }),

            StreamEvent::FunctionCallArgumentsDelta {
                output_index,
                item_id,
                delta,
            } => self.with_item(output_index, &item_id, |item| match item {
                OutputItem::FunctionCall(call) => {
                    call.arguments.push_str(&delta);
                    true
                }
                _ => false,
            }),
            StreamEvent::FunctionCallArgumentsDone {
                output_index,
                item_id,
                arguments,
            } => self.with_item(output_index, &item_id, |item| match item {
                OutputItem::FunctionCall(call) => {
                    call.arguments = arguments;
                    true
                }
                _ => false,
            }),

            StreamEvent::CustomToolCallInputDelta {
                output_index,
                item_id,
                delta,
            } => self.with_item(output_index, &item_id, |item| match item {
                OutputItem::CustomToolCall(call) => {
                    call.input.push_str(&delta);
                    true
                }
                _ => false,
            }),
            StreamEvent::CustomToolCallInputDone {
                output_index,
                item_id,
                input,
            } => self.with_item(output_index, &item_id, |item| match item {
                OutputItem::CustomToolCall(call) => {
                    call.input = input;
                    true
                }
                _ => false,
            }),

            StreamEvent::McpCallArgumentsDelta {
                output_index,
                item_id,
                delta,
            } => self.with_item(output_index, &item_id, |item| match item {
                OutputItem::McpCall(call) => {
                    call.arguments.push_str(&delta);
                    true
                }
                _ => false,
            }),
            StreamEvent::McpCallArgumentsDone {
                output_index,
                item_id,
                arguments,
            } => self.with_item(output_index, &item_id, |item| match item {
                OutputItem::McpCall(call) => {
                    call.arguments = arguments;
                    true
                }
                _ => false,
            }),

            StreamEvent::WebSearchCallInProgress {
                output_index,
                item_id,
            } => self.set_status(output_index, &item_id, "web_search_call", ItemStatus::InProgress),
            StreamEvent::WebSearchCallSearching {
                output_index,
                item_id,
            } => self.set_status(output_index, &item_id, "web_search_call", ItemStatus::Searching),
            StreamEvent::WebSearchCallCompleted {
                output_index,
                item_id,
            } => self.set_status(output_index, &item_id, "web_search_call", ItemStatus::Completed),
            StreamEvent::FileSearchCallInProgress {
                output_index,
                item_id,
            } => self.set_status(output_index, &item_id, "file_search_call", ItemStatus::InProgress),
            StreamEvent::FileSearchCallSearching {
                output_index,
                item_id,
            } => self.set_status(output_index, &item_id, "file_search_call", ItemStatus::Searching),
            StreamEvent::FileSearchCallCompleted {
                output_index,
                item_id,
            } => self.set_status(output_index, &item_id, "file_search_call", ItemStatus::Completed),
            StreamEvent::CodeInterpreterCallInProgress {
                output_index,
                item_id,
            } => self.set_status(
                output_index,
                &item_id,
                "code_interpreter_call",
                ItemStatus::InProgress,
            ),
            StreamEvent::CodeInterpreterCallInterpreting {
                output_index,
                item_id,
            } => self.set_status(
                output_index,
                &item_id,
                "code_interpreter_call",
                ItemStatus::Interpreting,
            ),
            StreamEvent::CodeInterpreterCallCompleted {
                output_index,
                item_id,
            } => self.set_status(
                output_index,
                &item_id,
                "code_interpreter_call",
                ItemStatus::Completed,
            ),
            StreamEvent::ImageGenerationCallInProgress {
                output_index,
                item_id,
            } => self.set_status(
                output_index,
                &item_id,
                "image_generation_call",
                ItemStatus::InProgress,
            ),
            StreamEvent::ImageGenerationCallGenerating {
                output_index,
                item_id,
            } => self.set_status(
                output_index,
                &item_id,
                "image_generation_call",
                ItemStatus::Generating,
            ),
            StreamEvent::ImageGenerationCallCompleted {
                output_index,
                item_id,
            } => self.set_status(
                output_index,
                &item_id,
                "image_generation_call",
                ItemStatus::Completed,
            ),

            StreamEvent::CodeInterpreterCallCodeDelta {
                output_index,
                item_id,
                delta,
            } => self.with_item(output_index, &item_id, |item| match item {
                OutputItem::CodeInterpreterCall(call) => {
                    call.code.get_or_insert_with(String::new).push_str(&delta);
                    true
                }
                _ => false,
            }),
            StreamEvent::CodeInterpreterCallCodeDone {
                output_index,
                item_id,
                code,
            } => self.with_item(output_index, &item_id, |item| match item {
                OutputItem::CodeInterpreterCall(call) => {
                    call.code = Some(code);
                    true
                }
                _ => false,
            }),

            StreamEvent::ImageGenerationCallPartialImage {
                output_index,
                item_id,
                partial_image_index,
                partial_image_b64,
            } => match STANDARD.decode(partial_image_b64.as_bytes()) {
                Ok(image) => self.with_item(output_index, &item_id, |item| match item {
                    OutputItem::ImageGenerationCall(call) => {
                        let at = partial_image_index.min(call.partial_images.len());
                        call.partial_images.insert(at, image);
                        true
                    }
                    _ => false,
                }),
                Err(e) => {
                    warn!("Discarding undecodable partial image for item {item_id}: {e}");
                    Fold::Ignored
                }
            },

            StreamEvent::ReasoningSummaryPartAdded {
                output_index,
                item_id,
                summary_index,
                part,
            }
            | StreamEvent::ReasoningSummaryPartDone {
                output_index,
                item_id,
                summary_index,
                part,
            } => self.with_item(output_index, &item_id, |item| match item {
                OutputItem::Reasoning(reasoning) => {
                    put_slot(&mut reasoning.summary, summary_index, part);
                    true
                }
                _ => false,
            }),
            StreamEvent::ReasoningSummaryTextDelta {
                output_index,
                item_id,
                summary_index,
                delta,
            } => self.with_item(output_index, &item_id, |item| match item {
                OutputItem::Reasoning(reasoning) => reasoning
                    .summary
                    .get_mut(summary_index)
                    .map(|part| part.text.push_str(&delta))
                    .is_some(),
                _ => false,
            }),
            StreamEvent::ReasoningSummaryTextDone {
                output_index,
                item_id,
                summary_index,
                text,
            } => self.with_item(output_index, &item_id, |item| match item {
                OutputItem::Reasoning(reasoning) => {
                    put_slot(&mut reasoning.summary, summary_index, SummaryPart { text });
                    true
                }
                _ => false,
            }),

            StreamEvent::ReasoningTextDelta {
                output_index,
                item_id,
                content_index,
                delta,
            } => self.with_item(output_index, &item_id, |item| match item {
                OutputItem::Reasoning(reasoning) => {
                    slot_mut(&mut reasoning.content, content_index)
                        .text
                        .push_str(&delta);
                    true
                }
                _ => false,
            }),
            StreamEvent::ReasoningTextDone {
                output_index,
                item_id,
                content_index,
                text,
            } => self.with_item(output_index, &item_id, |item| match item {
                OutputItem::Reasoning(reasoning) => {
                    put_slot(&mut reasoning.content, content_index, ReasoningText { text });
                    true
                }
                _ => false,
            }),

            event @ (StreamEvent::ReasoningSummaryDelta { .. }
            | StreamEvent::ReasoningSummaryDone { .. }
            | StreamEvent::McpCallInProgress { .. }
            | StreamEvent::McpCallCompleted { .. }
            | StreamEvent::McpCallFailed { .. }
            | StreamEvent::McpListToolsInProgress { .. }
            | StreamEvent::McpListToolsCompleted { .. }
            | StreamEvent::McpListToolsFailed { .. }) => {
                trace!("No item change for {event:?}");
                Fold::Ignored
            }

            StreamEvent::Error {
                code,
                message,
                param,
            } => {
                return Err(ApiError {
                    error_type: None,
                    code,
                    message,
                    param,
                });
            }

            StreamEvent::Unknown => Fold::Ignored,
        };

        if fold == Fold::Ignored {
            trace!("Event ignored at current log state");
        }
        Ok(fold)
    }

    /// Appends a new response entry and makes it current. A response whose
    /// id is already in the log replaces that entry in place.
    fn begin_response(&mut self, response: Response) {
        let id = response.id.clone();
        match self.responses.get(&id) {
            Some(&position) => self.entries[position] = Entry::Response(response),
            None => {
                self.responses.insert(id.clone(), self.entries.len());
                self.entries.push(Entry::Response(response));
            }
        }
        self.current_response_id = Some(id);
    }

    fn replace_response(&mut self, response: Response) -> Fold {
        match self.responses.get(&response.id) {
            Some(&position) => {
                self.entries[position] = Entry::Response(response);
                Fold::Applied
            }
            None => Fold::Ignored,
        }
    }

    /// The current response, while it is still accepting item events.
    fn streaming_response_mut(&mut self) -> Option<&mut Response> {
        let position = *self.responses.get(self.current_response_id.as_deref()?)?;
        match self.entries.get_mut(position)? {
            Entry::Response(response) if !response.status.is_terminal() => Some(response),
            _ => None,
        }
    }

    fn with_item(
        &mut self,
        output_index: usize,
        item_id: &str,
        update: impl FnOnce(&mut OutputItem) -> bool,
    ) -> Fold {
        let item = self
            .streaming_response_mut()
            .and_then(|response| response.output.get_mut(output_index))
            .filter(|item| item.id() == item_id);
        Fold::when(item.is_some_and(update))
    }

    fn with_part(
        &mut self,
        output_index: usize,
        item_id: &str,
        content_index: usize,
        update: impl FnOnce(&mut ContentPart) -> bool,
    ) -> Fold {
        self.with_item(output_index, item_id, |item| match item {
            OutputItem::Message(message) => message
                .content
                .get_mut(content_index)
                .is_some_and(update),
            _ => false,
        })
    }

    fn set_status(
        &mut self,
        output_index: usize,
        item_id: &str,
        kind: &str,
        status: ItemStatus,
    ) -> Fold {
        self.with_item(output_index, item_id, |item| {
            item.kind() == kind
                && hosted_status(item)
                    .map(|slot| *slot = status)
                    .is_some()
        })
    }
}

fn hosted_status(item: &mut OutputItem) -> Option<&mut ItemStatus> {
    match item {
        OutputItem::WebSearchCall(call) => Some(&mut call.status),
        OutputItem::FileSearchCall(call) => Some(&mut call.status),
        OutputItem::CodeInterpreterCall(call) => Some(&mut call.status),
        OutputItem::ImageGenerationCall(call) => Some(&mut call.status),
        _ => None,
    }
}

/// The slot at `index`, padding the list with empty slots to reach it.
fn slot_mut<T: Default>(slots: &mut Vec<T>, index: usize) -> &mut T {
    if index >= slots.len() {
        slots.resize_with(index + 1, T::default);
    }
    &mut slots[index]
}

fn put_slot<T: Default>(slots: &mut Vec<T>, index: usize, value: T) {
    *slot_mut(slots, index) = value;
}
