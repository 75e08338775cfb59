//! Decode an SSE body from stdin and print each JSON frame on its own line.
//!
//! Run with: curl -N ... | cargo run --example pipe

use rust_ai_stream::{Error, StreamReader};
use std::io;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin().lock();
    let mut reader: StreamReader<serde_json::Value, _> = StreamReader::new(stdin);

    for message in reader.messages() {
        match message {
            Ok(value) => println!("{value}"),
            Err(Error::Remote(api)) => {
                eprintln!("remote error ({}): {}", api.error_type, api.message);
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        }
    }
    reader.close();

    Ok(())
}
