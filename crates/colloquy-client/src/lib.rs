//! # colloquy-client
//!
//! Transport layer for the Responses API.
//!
//! - [`ResponsesApi`]: the seam the conversation layer talks to, with a
//!   non-streaming `create` and a `stream` of SSE event payloads
//! - [`ResponsesClient`]: the reqwest-backed implementation, plus response
//!   management and file upload
//! - [`RequestLogger`]: request logging middleware for the non-streaming client
//! - [`sse`]: event framing and decoding for streamed bodies
//!
//! ## Example
//!
//! ```no_run
//! use colloquy_client::ResponsesClient;
//! use colloquy_common::{Config, ResponsesRequest, StreamEvent};
//! use futures::StreamExt;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = ResponsesClient::new(Config::from_env())?;
//! let request = ResponsesRequest::builder()
//!     .model("gpt-4o")
//!     .input("Say hello")
//!     .build();
//!
//! let mut events = client.stream_events(&request).await?;
//! while let Some(event) = events.next().await {
//!     if let StreamEvent::OutputTextDelta { delta, .. } = event? {
//!         print!("{delta}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use futures::stream::BoxStream;

use colloquy_common::{DecodePolicy, Response, ResponsesRequest, StreamEvent};

pub mod client;
pub mod error;
pub mod middleware;
pub mod sse;

pub use client::{DeletedResponse, FileObject, InputItemList, ResponsesClient};
pub use error::ClientError;
pub use middleware::RequestLogger;

/// `data` payloads of a streamed response body, one per SSE event, in
/// arrival order.
pub type PayloadStream = BoxStream<'static, Result<String, ClientError>>;

/// Decoded events of a streamed response, in arrival order.
pub type EventStream = BoxStream<'static, Result<StreamEvent, ClientError>>;

/// Transport for the Responses API.
///
/// Implementations must be thread-safe; the conversation layer holds them
/// behind an `Arc` and may be driven from any task.
#[async_trait]
pub trait ResponsesApi: Send + Sync {
    /// Sends a non-streaming request and returns the finished response.
    ///
    /// # Errors
    ///
    /// Returns a `ClientError` on transport failure or a non-2xx status.
    async fn create(&self, request: &ResponsesRequest) -> Result<Response, ClientError>;

    /// Sends a streaming request and returns the event payloads of the SSE
    /// body.
    ///
    /// The returned stream owns the HTTP body; dropping it closes the
    /// connection.
    ///
    /// # Errors
    ///
    /// Returns a `ClientError` if the request fails or the status is not 2xx.
    async fn stream(&self, request: &ResponsesRequest) -> Result<PayloadStream, ClientError>;

    /// How undecodable stream payloads should be treated.
    fn decode_policy(&self) -> DecodePolicy {
        DecodePolicy::Skip
    }
}
