//! Responses API streaming demo
//!
//! Streams one response at the transport level, printing text as it arrives
//! and every other event as a debug log line. With `--retrieve`, fetches the
//! stored response afterwards.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=info cargo run -p colloquy-client --example responses_stream_demo -- \
//!     --model gpt-4o-mini --message "Write a haiku about rust"
//! ```

use std::io::Write;

use anyhow::Result;
use clap::Parser;
use futures::StreamExt;
use log::{debug, info};

use colloquy_client::ResponsesClient;
use colloquy_common::{Config, ResponsesRequest, StreamEvent};

#[derive(Parser, Debug)]
#[command(author, version, about = "Responses API streaming demo")]
struct Args {
    /// Base URL for the API endpoint
    #[arg(long, env = "OPENAI_BASE_URL", default_value = colloquy_common::DEFAULT_BASE_URL)]
    base_url: String,

    /// API key for authentication
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Model to use
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,

    /// The user message to send
    #[arg(long, default_value = "Say hello in three languages.")]
    message: String,

    /// Temperature for sampling (0.0-2.0)
    #[arg(long)]
    temperature: Option<f32>,

    /// Fetch the stored response once the stream ends
    #[arg(long)]
    retrieve: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let client = ResponsesClient::new(
        Config::new()
            .with_base_url(&args.base_url)
            .with_api_key(&args.api_key),
    )?;

    let request = ResponsesRequest::builder()
        .model(&args.model)
        .input(args.message.as_str())
        .temperature(args.temperature)
        .store(Some(args.retrieve))
        .build();

    let mut events = client.stream_events(&request).await?;
    let mut response_id = None;

    while let Some(event) = events.next().await {
        match event? {
            StreamEvent::OutputTextDelta { delta, .. } => {
                print!("{delta}");
                std::io::stdout().flush()?;
            }
            StreamEvent::ResponseCreated { response } => {
                info!("Response {} created", response.id);
                response_id = Some(response.id);
            }
            StreamEvent::ResponseCompleted { response } => {
                println!();
                if let Some(usage) = response.usage {
                    info!(
                        "Completed: {} input, {} output tokens",
                        usage.input_tokens, usage.output_tokens
                    );
                }
            }
            StreamEvent::Error { message, .. } => anyhow::bail!("Stream error: {message}"),
            other => debug!("{other:?}"),
        }
    }

    if args.retrieve
        && let Some(id) = response_id
    {
        let stored = client.retrieve(&id).await?;
        info!("Retrieved {} with status {:?}", stored.id, stored.status);
        info!("Text: {}", stored.output_text());
    }

    Ok(())
}
