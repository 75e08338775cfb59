//! Integration tests reading SSE bodies served by a wiremock server.

use futures::StreamExt;
use rust_ai_stream::{ChatCompletionChunk, Error, ResponseStream, StreamConfig};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHAT_BODY: &str = concat!(
    "data: {\"id\":\"c1\",\"object\":\"chat.completion.chunk\",\"created\":1,\"model\":\"gpt-4o-mini\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"\"},\"finish_reason\":null}]}\n",
    "\n",
    "data: {\"id\":\"c1\",\"object\":\"chat.completion.chunk\",\"created\":1,\"model\":\"gpt-4o-mini\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hello\"},\"finish_reason\":null}]}\n",
    "\n",
    "data: {\"id\":\"c1\",\"object\":\"chat.completion.chunk\",\"created\":1,\"model\":\"gpt-4o-mini\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\" there\"},\"finish_reason\":null}]}\n",
    "\n",
    "data: {\"id\":\"c1\",\"object\":\"chat.completion.chunk\",\"created\":1,\"model\":\"gpt-4o-mini\",\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n",
    "\n",
    "data: [DONE]\n",
    "\n",
);

/// Start a mock server answering chat completions with `body`.
async fn serve(body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ratelimit-limit-requests", "60")
                .insert_header("x-ratelimit-remaining-requests", "59")
                .insert_header("x-ratelimit-reset-requests", "1s")
                .set_body_raw(body.as_bytes().to_vec(), "text/event-stream"),
        )
        .mount(&server)
        .await;
    server
}

async fn post(server: &MockServer) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}/v1/chat/completions", server.uri()))
        .body(r#"{"model":"gpt-4o-mini","stream":true}"#)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_chat_stream_recv() {
    let server = serve(CHAT_BODY).await;
    let mut stream: ResponseStream<ChatCompletionChunk> =
        ResponseStream::from_response(post(&server).await);

    let mut content = String::new();
    let mut chunks = 0;
    loop {
        match stream.recv().await {
            Ok(chunk) => {
                chunks += 1;
                content.push_str(chunk.text().unwrap_or_default());
            }
            Err(e) if e.is_end_of_stream() => break,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(chunks, 4);
    assert_eq!(content, "Hello there");
    assert!(stream.is_finished());
    assert!(stream.recv().await.unwrap_err().is_end_of_stream());
}

#[tokio::test]
async fn test_chat_stream_as_futures_stream() {
    let server = serve(CHAT_BODY).await;
    let stream: ResponseStream<ChatCompletionChunk> =
        ResponseStream::from_response(post(&server).await);

    let chunks: Vec<ChatCompletionChunk> = stream
        .map(|chunk| chunk.unwrap())
        .collect()
        .await;

    assert_eq!(chunks.len(), 4);
    assert_eq!(chunks[3].finish_reason(), Some(rust_ai_stream::FinishReason::Stop));
}

#[tokio::test]
async fn test_rate_limit_headers() {
    let server = serve(CHAT_BODY).await;
    let stream: ResponseStream<ChatCompletionChunk> =
        ResponseStream::from_response(post(&server).await);

    assert_eq!(
        stream.headers().get("content-type").unwrap(),
        "text/event-stream"
    );
    let limits = stream.rate_limit_headers();
    assert_eq!(limits.limit_requests, Some(60));
    assert_eq!(limits.remaining_requests, Some(59));
    assert_eq!(
        limits.reset_requests.and_then(|r| r.duration()),
        Some(Duration::from_secs(1))
    );
    stream.close();
}

#[tokio::test]
async fn test_in_band_error_mid_stream() {
    let body = concat!(
        "data: {\"id\":\"c1\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hi\"}}]}\n",
        "\n",
        "data: {\"error\":{\"message\":\"The server had an error\",\"type\":\"server_error\",\"param\":null,\"code\":null}}\n",
        "\n",
    );
    let server = serve(body).await;
    let mut stream: ResponseStream<ChatCompletionChunk> =
        ResponseStream::from_response(post(&server).await);

    assert_eq!(stream.recv().await.unwrap().text(), Some("Hi"));

    let err = stream.recv().await.unwrap_err();
    let api = err.remote().expect("remote error");
    assert_eq!(api.message, "The server had an error");
    assert_eq!(api.error_type, "server_error");
    assert_eq!(err.to_string(), "error, The server had an error");
}

#[tokio::test]
async fn test_noise_limit_from_config() {
    let server = serve(": ping\n: ping\n: ping\ndata: [DONE]\n").await;
    let config = StreamConfig::builder()
        .empty_messages_limit(2)
        .build()
        .unwrap();
    let mut stream: ResponseStream<ChatCompletionChunk> =
        ResponseStream::from_response_with_config(post(&server).await, &config);

    assert!(matches!(
        stream.recv().await.unwrap_err(),
        Error::TooManyEmptyMessages { limit: 2 }
    ));
}
