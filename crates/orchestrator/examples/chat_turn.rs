//! Send one chat message through the orchestrator.
//!
//! Run with: cargo run -p orchestrator --example chat_turn
//! Or with a message: cargo run -p orchestrator --example chat_turn -- "ارسم شعار"
//! Deep thinking: cargo run -p orchestrator --example chat_turn -- --deep "سؤال"
//!
//! Environment (see .env):
//!   LLM_API_KEY        - enables the chat-completions engine
//!   LLAMA_LOCAL_URL    - local fallback endpoint
//!   STABILITY_API_KEY  - image generation
//!   GEMINI_API_KEY     - image analysis
//!   IMAGE_URL          - attach an image to the message

use std::env;

use orchestrator::{Orchestrator, SendMessage};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let deep = args.first().map(|a| a == "--deep").unwrap_or(false);
    if deep {
        args.remove(0);
    }
    let message = if args.is_empty() {
        "من أنت؟".to_string()
    } else {
        args.join(" ")
    };

    let orchestrator = Orchestrator::from_env()?;

    let mut request = SendMessage::new("example-user", message.clone());
    if deep {
        request = request.deep_thinking();
    }
    if let Ok(url) = env::var("IMAGE_URL") {
        request = request.with_image_url(url);
    }

    println!("Message: {}", message);
    let reply = orchestrator.send_message(request).await?;

    println!("\nIntent: {}", reply.intent);
    if let Some(thinking) = &reply.thinking_process {
        println!("\n{}", thinking);
    }
    println!("\nResponse: {}", reply.response);

    for conversation in orchestrator.list_conversations("example-user").await? {
        println!("\nConversation #{}: {}", conversation.id, conversation.title);
    }

    Ok(())
}
