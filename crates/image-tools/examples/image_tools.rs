//! Generate an image, then analyze it.
//!
//! Run with: cargo run -p image-tools --example image_tools -- "a falcon logo"
//!
//! Make sure to set environment variables in .env:
//!   STABILITY_API_KEY - image generation
//!   GEMINI_API_KEY    - image analysis

use std::env;

use base64::Engine;
use image_tools::{GeminiVision, ImageAnalyzer, ImageGenerator, ImageSource, StableDiffusion};
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
        "A minimalist falcon logo, flat design".to_string()
    };

    let generator = StableDiffusion::from_env()?;
    println!("Generating with {}: {}", generator.name(), prompt);
    let generated = generator.generate(&prompt).await?;

    let Some(image) = generated.images.first() else {
        println!("The service returned no images");
        return Ok(());
    };
    println!("Saved: {}", image.path);

    let bytes = std::fs::read(&image.path)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);

    let analyzer = GeminiVision::from_env()?;
    let analysis = analyzer.analyze(ImageSource::Base64(encoded)).await?;
    println!("\nAnalysis:\n{}", analysis.analysis_text);

    Ok(())
}
