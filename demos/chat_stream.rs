//! Streaming chat completion against an OpenAI-compatible endpoint.
//!
//! Run with: OPENAI_API_KEY=... cargo run --example chat_stream
//! Set OPENAI_BASE_URL to target another compatible server.

use rust_ai_stream::{ChatCompletionChunk, ResponseStream, StreamConfig};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let api_key = env::var("OPENAI_API_KEY")?;
    let base_url = env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());

    let body = serde_json::json!({
        "model": "gpt-4o-mini",
        "stream": true,
        "stream_options": {"include_usage": true},
        "messages": [
            {"role": "system", "content": "You are a helpful assistant. Be concise."},
            {"role": "user", "content": "Write a haiku about Rust programming."}
        ]
    });

    let response = reqwest::Client::new()
        .post(format!("{base_url}/chat/completions"))
        .bearer_auth(api_key)
        .header("content-type", "application/json")
        .body(body.to_string())
        .send()
        .await?;

    let config = StreamConfig::builder().empty_messages_limit(50).build()?;
    let mut stream: ResponseStream<ChatCompletionChunk> =
        ResponseStream::from_response_with_config(response, &config);

    let limits = stream.rate_limit_headers();

    // Print chunks as they arrive
    let mut usage = None;
    loop {
        match stream.recv().await {
            Ok(chunk) => {
                if let Some(text) = chunk.text() {
                    print!("{text}");
                }
                if chunk.usage.is_some() {
                    usage = chunk.usage;
                }
            }
            Err(e) if e.is_end_of_stream() => break,
            Err(e) => return Err(e.into()),
        }
    }
    stream.close();

    println!("\n\n--- Stats ---");
    if let Some(usage) = usage {
        println!("Input tokens: {}", usage.prompt_tokens);
        println!("Output tokens: {}", usage.completion_tokens);
    }
    if let Some(remaining) = limits.remaining_requests {
        println!("Requests remaining: {remaining}");
    }

    Ok(())
}
