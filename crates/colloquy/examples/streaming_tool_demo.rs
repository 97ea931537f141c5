use std::io::Write;
use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use log::info;

use colloquy::{
    CancellationToken, Config, Conversation, ConversationConfig, ConversationEvent,
    FunctionDefinition, FunctionTool, Parameters, Property, ResponsesClient, Role, StreamEvent,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL for the API endpoint
    #[arg(long, env = "OPENAI_BASE_URL", default_value = colloquy::DEFAULT_BASE_URL)]
    base_url: String,

    /// API key for authentication
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Model to use
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,

    /// The user message to send
    #[arg(long, default_value = "What time is it in Tokyo?")]
    message: String,

    /// Maximum number of requests, counting tool follow-ups
    #[arg(long, default_value = "10")]
    max_turns: usize,
}

fn time_definition() -> Result<FunctionDefinition> {
    let parameters = Parameters::new(
        [(
            "utc_offset_hours".to_string(),
            Property::integer("Offset from UTC in hours, e.g. 9 for Tokyo"),
        )]
        .into(),
        vec!["utc_offset_hours".to_string()],
    );
    Ok(FunctionDefinition::new(
        "current_time",
        "Get the current time at a UTC offset",
        &parameters,
    )?)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    info!("Streaming Tool Demo");
    info!("===================");
    info!("Base URL: {}", args.base_url);
    info!("Model: {}", args.model);
    info!("Message: {}", args.message);
    info!("Max turns: {}", args.max_turns);

    let client = ResponsesClient::new(
        Config::new()
            .with_base_url(&args.base_url)
            .with_api_key(&args.api_key),
    )?;

    let config = ConversationConfig::builder()
        .model(&args.model)
        .instructions("You always speak like a pirate.")
        .max_turns(Some(args.max_turns))
        .build();

    let time_tool = FunctionTool::new(time_definition()?, |args: serde_json::Value| async move {
        let offset = args["utc_offset_hours"].as_i64().unwrap_or(0);
        let now = Utc::now() + chrono::Duration::hours(offset);
        anyhow::Ok(format!("{} (UTC{offset:+})", now.format("%Y-%m-%d %H:%M:%S")))
    });

    let mut conversation = Conversation::new(client, config)?
        .with_tool(time_tool)
        .with_event_callback(|event| async move {
            match event {
                ConversationEvent::Stream(StreamEvent::OutputTextDelta { delta, .. }) => {
                    print!("{delta}");
                    let _ = std::io::stdout().flush();
                }
                ConversationEvent::ToolResult {
                    name,
                    output,
                    success,
                    ..
                } => {
                    info!("Tool {name} (success: {success}): {output}");
                }
                ConversationEvent::TurnCompleted {
                    response_id,
                    status,
                } => {
                    info!("Response {response_id} finished: {status:?}");
                }
                ConversationEvent::Stream(_) => {}
            }
        });

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let start_time = Instant::now();
    println!("Assistant: ");
    let response = conversation.send_cancellable(args.message.as_str(), cancel).await?;
    println!("\n");

    info!("Conversation completed with {:?}", response.status);
    for message in conversation.messages().await {
        let speaker = if message.role == Role::User { "User" } else { "Assistant" };
        info!("{speaker}: {}", message.text);
    }
    if let Some(usage) = &response.usage {
        info!(
            "Usage: {} input, {} output tokens",
            usage.input_tokens, usage.output_tokens
        );
    }
    info!("Total request time: {:.2}ms", start_time.elapsed().as_millis());

    Ok(())
}
