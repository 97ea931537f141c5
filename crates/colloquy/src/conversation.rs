use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::StreamExt;
use futures::future::join_all;
use log::{debug, info, warn};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use colloquy_client::{ResponsesApi, sse};
use colloquy_common::{
    ConversationConfig, Entry, Input, InputItem, Response, ResponseStatus, ResponsesRequest,
    ResponsesTool, StreamEvent, ToolCall,
};
use colloquy_tools::{ToolExecutor, ToolImplementation};

use crate::accumulate::EntryLog;
use crate::error::CoreError;
use crate::events::{ConversationEvent, EventCallback};
use crate::transcript::{TranscriptMessage, transcript};

/// A stateful conversation over a [`ResponsesApi`].
///
/// Each [`send`](Self::send) streams one or more requests, folds their events
/// into the shared [`EntryLog`], and answers function calls the model makes to
/// registered local tools until a response asks for none.
pub struct Conversation<A: ResponsesApi> {
    id: Uuid,
    api: Arc<A>,
    config: ConversationConfig,
    tools: ToolExecutor,
    log: Arc<RwLock<EntryLog>>,
    event_callback: Option<EventCallback>,
}

impl<A: ResponsesApi> Conversation<A> {
    /// Creates a conversation with no history.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Config` if the configuration is invalid.
    pub fn new(api: A, config: ConversationConfig) -> Result<Self, CoreError> {
        Self::with_shared_api(Arc::new(api), config)
    }

    /// Creates a conversation over a transport shared with other conversations.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Config` if the configuration is invalid.
    pub fn with_shared_api(api: Arc<A>, config: ConversationConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            api,
            config,
            tools: ToolExecutor::new(),
            log: Arc::new(RwLock::new(EntryLog::new())),
            event_callback: None,
        })
    }

    /// Registers a local tool the model may call.
    #[must_use]
    pub fn with_tool<T: ToolImplementation + 'static>(mut self, tool: T) -> Self {
        self.tools.add_tool(tool);
        self
    }

    #[must_use]
    pub fn with_tools(mut self, tools: ToolExecutor) -> Self {
        self.tools = tools;
        self
    }

    /// Sets an observer for stream events, tool results and finished turns.
    #[must_use]
    pub fn with_event_callback<F, Fut>(mut self, callback: F) -> Self
    where
        F: Fn(ConversationEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: EventCallback =
            Box::new(move |event| -> Pin<Box<dyn Future<Output = ()> + Send>> {
                Box::pin(callback(event))
            });
        self.event_callback = Some(handler);
        self
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub const fn config(&self) -> &ConversationConfig {
        &self.config
    }

    #[must_use]
    pub const fn tools(&self) -> &ToolExecutor {
        &self.tools
    }

    pub const fn tools_mut(&mut self) -> &mut ToolExecutor {
        &mut self.tools
    }

    /// Shared handle to the entry log, for readers outside the turn.
    #[must_use]
    pub fn entry_log(&self) -> Arc<RwLock<EntryLog>> {
        Arc::clone(&self.log)
    }

    /// A snapshot of every entry.
    pub async fn entries(&self) -> Vec<Entry> {
        self.log.read().await.entries().to_vec()
    }

    /// The text transcript of the conversation so far.
    pub async fn messages(&self) -> Vec<TranscriptMessage> {
        transcript(self.log.read().await.entries())
    }

    pub async fn current_response(&self) -> Option<Response> {
        self.log.read().await.current_response().cloned()
    }

    /// Forgets all history; the next request starts a fresh thread.
    pub async fn reset(&mut self) {
        self.log.write().await.clear();
    }

    /// Sends input and runs the turn, including any local tool follow-ups.
    ///
    /// Returns the final response. Dropping the returned future cancels the
    /// turn; entries folded so far are kept.
    ///
    /// # Errors
    ///
    /// Returns a `CoreError` if the transport fails, the stream reports an
    /// error, no response is created, or the turn limit is reached.
    pub async fn send(&mut self, input: impl Into<Input> + Send) -> Result<Response, CoreError> {
        self.send_cancellable(input, CancellationToken::new()).await
    }

    /// Like [`send`](Self::send), stopping with `CoreError::Cancelled` once
    /// `cancel` fires.
    ///
    /// Cancellation is observed while waiting for the next stream event,
    /// while tools run, and between requests.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn send_cancellable(
        &mut self,
        input: impl Into<Input> + Send,
        cancel: CancellationToken,
    ) -> Result<Response, CoreError> {
        let mut input = input.into();
        let mut turn_count = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(CoreError::Cancelled);
            }
            if let Some(max) = self.config.max_turns
                && turn_count >= max
            {
                return Err(CoreError::MaxTurnsExceeded { max });
            }
            turn_count += 1;

            info!(
                "Executing turn ({}/{}) of conversation {}",
                turn_count,
                self.config
                    .max_turns
                    .map_or_else(|| "unlimited".to_string(), |m| m.to_string()),
                self.id
            );

            let request = self.build_request(input).await;
            let response = self.stream_turn(request, &cancel).await?;

            self.emit(ConversationEvent::TurnCompleted {
                response_id: response.id.clone(),
                status: response.status,
            })
            .await;

            if response.status != ResponseStatus::Completed {
                debug!("Response {} ended with {:?}", response.id, response.status);
                return Ok(response);
            }

            let calls: Vec<ToolCall> = response
                .function_calls()
                .filter(|call| self.tools.has_tool(&call.name))
                .map(ToolCall::from)
                .collect();
            if calls.is_empty() {
                return Ok(response);
            }

            input = Input::Items(self.run_tools(&calls, &cancel).await?);
        }
    }

    async fn build_request(&self, input: Input) -> ResponsesRequest {
        let previous_response_id = self
            .log
            .read()
            .await
            .current_response_id()
            .map(str::to_owned);

        let mut tools = self.config.tools.clone();
        tools.extend(self.tools.definitions().into_iter().map(ResponsesTool::from));

        let config = &self.config;
        ResponsesRequest {
            model: config.model.clone(),
            input,
            instructions: config.instructions.clone(),
            previous_response_id,
            tools,
            tool_choice: config.tool_choice.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            max_output_tokens: config.max_output_tokens,
            parallel_tool_calls: config.parallel_tool_calls,
            store: config.store,
            reasoning: config.reasoning.clone(),
            truncation: config.truncation.clone(),
            metadata: config.metadata.clone(),
            include: config.include.clone(),
            user: config.user.clone(),
            stream: Some(true),
        }
    }

    /// Streams one request to completion, folding every event into the log.
    async fn stream_turn(
        &self,
        request: ResponsesRequest,
        cancel: &CancellationToken,
    ) -> Result<Response, CoreError> {
        self.log.write().await.push_request(request.clone());

        let payloads = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(CoreError::Cancelled),
            payloads = self.api.stream(&request) => payloads?,
        };
        let mut events = sse::decode_events(payloads, self.api.decode_policy());

        let mut response_id = None;
        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("Turn cancelled mid-stream");
                    return Err(CoreError::Cancelled);
                }
                next = events.next() => next,
            };
            let Some(event) = next else {
                break;
            };
            let event = event?;

            if let StreamEvent::ResponseCreated { response } = &event {
                response_id = Some(response.id.clone());
            }

            let observed = self.event_callback.as_ref().map(|_| event.clone());
            let folded = self.log.write().await.apply(event);
            if let Some(event) = observed {
                self.emit(ConversationEvent::Stream(event)).await;
            }
            folded?;
        }

        let response_id = response_id.ok_or(CoreError::NoResponse)?;
        self.log
            .read()
            .await
            .response(&response_id)
            .cloned()
            .ok_or(CoreError::NoResponse)
    }

    /// Runs all calls concurrently and returns their outputs in call order.
    async fn run_tools(
        &self,
        calls: &[ToolCall],
        cancel: &CancellationToken,
    ) -> Result<Vec<InputItem>, CoreError> {
        debug!("Running {} tool call(s)", calls.len());

        let executions = calls.iter().map(|call| self.tools.execute_tool(call));
        let results = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(CoreError::Cancelled),
            results = join_all(executions) => results,
        };

        let mut outputs = Vec::with_capacity(calls.len());
        for (call, result) in calls.iter().zip(results) {
            let (output, success) = match result {
                Ok(output) => (output, true),
                Err(e) => {
                    warn!("Tool '{}' failed: {e}", call.name);
                    (format!("Tool execution failed: {e}"), false)
                }
            };

            self.emit(ConversationEvent::ToolResult {
                name: call.name.clone(),
                call_id: call.call_id.clone(),
                output: output.clone(),
                success,
            })
            .await;

            outputs.push(InputItem::function_call_output(&call.call_id, output));
        }
        Ok(outputs)
    }

    async fn emit(&self, event: ConversationEvent) {
        if let Some(callback) = &self.event_callback {
            callback(event).await;
        }
    }
}
