//! Send a single prompt through the model invoker.
//!
//! Run with: cargo run -p llama-brain --example invoke
//! Or with a custom prompt: cargo run -p llama-brain --example invoke -- "Your prompt here"
//!
//! Environment (see .env):
//!   LLM_API_KEY     - enables the chat-completions engine
//!   LLAMA_LOCAL_URL - local fallback endpoint

use std::env;

use llama_brain::{GenerationOptions, LlamaBrainConfig, ModelInvoker};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let prompt = if args.len() > 1 {
        args[1..].join(" ")
    } else {
        "Hello! Please respond with a short greeting.".to_string()
    };

    let config = LlamaBrainConfig::from_env()?;
    println!("Strategy: {}", config.effective_strategy());
    println!("Local URL: {}", config.local_url);
    if config.api_key.is_some() {
        println!("Primary: {} ({})", config.api_url, config.model);
    }

    let invoker = ModelInvoker::from_config(&config)?;

    println!("\nPrompt: {}", prompt);
    let reply = invoker.invoke(prompt, GenerationOptions::default()).await;

    if reply.is_failed() {
        eprintln!("\n{}", reply.into_display());
        std::process::exit(1);
    }

    println!("\nReply: {}", reply.into_display());
    Ok(())
}
