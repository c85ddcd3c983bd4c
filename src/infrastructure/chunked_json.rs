// Chunked JSON streaming utilities
use async_compression::tokio::bufread::BrotliEncoder;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use serde::Serialize;
use tokio::io::AsyncReadExt;

/// Create a chunked JSON streaming response. Each message is framed as a
/// 4-byte big-endian length followed by the JSON payload.
pub async fn chunked_json_stream<S, T>(
    stream: S,
    compress: bool,
) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize + Send + Sync + 'static,
{
    let byte_stream = stream.then(move |msg| async move { serialize_chunk(&msg, compress).await });

    let body = Body::from_stream(byte_stream);

    // NOTE: We do NOT set Content-Encoding here because we compress
    // individual chunks, not the entire HTTP response. Advertising a
    // stream-level encoding would make clients decompress the HTTP body
    // as a whole, which breaks the chunk framing.
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-json-stream")
        .header(header::TRANSFER_ENCODING, "chunked");

    response
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize a single message to a length-prefixed chunk
async fn serialize_chunk<T: Serialize>(msg: &T, compress: bool) -> Result<Bytes, std::io::Error> {
    // 1. Serialize to JSON
    let buffer = serde_json::to_vec(msg).map_err(std::io::Error::other)?;

    // 2. Optionally compress
    let payload = if compress {
        let cursor = std::io::Cursor::new(buffer);
        let mut encoder = BrotliEncoder::new(cursor);
        let mut compressed = Vec::new();
        encoder.read_to_end(&mut compressed).await?;
        compressed
    } else {
        buffer
    };

    // 3. Prepend length (4 bytes, big-endian)
    let length = payload.len() as u32;
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(length);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Helper to create a streaming response from a live watch slot: the
/// current state is emitted first, then every subsequent change.
pub async fn stream_from_watch<T, U, F>(
    mut rx: tokio::sync::watch::Receiver<T>,
    render: F,
    compress: bool,
) -> impl IntoResponse
where
    T: Clone + Send + Sync + 'static,
    U: Serialize + Send + Sync + 'static,
    F: Fn(&T) -> U + Send + 'static,
{
    let stream = async_stream::stream! {
        let current = rx.borrow_and_update().clone();
        yield render(&current);
        while rx.changed().await.is_ok() {
            let next = rx.borrow_and_update().clone();
            yield render(&next);
        }
    };

    match chunked_json_stream(stream, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
