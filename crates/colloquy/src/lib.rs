//! # colloquy
//!
//! Stateful, streaming conversations over the Responses API.
//!
//! A [`Conversation`] sends input, folds the streamed events into an
//! [`EntryLog`] as they arrive, and answers the model's function calls with
//! registered local tools until a response asks for none.
//!
//! ## Quick Start
//!
//! ```no_run
//! use colloquy::{Conversation, ConversationConfig, ResponsesClient};
//! use colloquy_common::Config;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = ResponsesClient::new(Config::from_env())?;
//! let config = ConversationConfig::builder()
//!     .model("gpt-4o")
//!     .instructions("You are terse.")
//!     .build();
//!
//! let mut conversation = Conversation::new(client, config)?;
//! let response = conversation.send("Hi").await?;
//! println!("{}", response.output_text());
//!
//! for message in conversation.messages().await {
//!     println!("{:?}: {}", message.role, message.text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Event accumulation**: every stream event is applied to the live
//!   response in arrival order; events naming stale coordinates are ignored
//! - **Tool loop**: matching function calls run concurrently and their
//!   outputs are sent back as the next request
//! - **Cancellation**: a `CancellationToken`, or dropping the `send` future,
//!   stops the stream and any running tools while keeping what was folded
//! - **Observation**: an async callback sees stream events, tool results and
//!   finished turns

pub mod accumulate;
pub mod conversation;
pub mod error;
pub mod events;
pub mod transcript;

pub use colloquy_client::*;
pub use colloquy_common::*;
pub use colloquy_tools::*;

pub use accumulate::{EntryLog, Fold};
pub use conversation::Conversation;
pub use error::CoreError;
pub use events::{ConversationEvent, EventCallback};
pub use transcript::{TranscriptMessage, transcript};
pub use tokio_util::sync::CancellationToken;
