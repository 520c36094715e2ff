// Chunked JSON streaming utilities
use crate::application::reactive_controller::DisplayedChart;
use axum::body::Body;
use axum::http::{Response, StatusCode, header};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::Stream;
use serde::Serialize;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Create a newline-delimited JSON streaming response
pub fn ndjson_stream<S, T>(stream: S) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize + Send + 'static,
{
    let byte_stream = stream.map(|item| serialize_line(&item));
    let body = Body::from_stream(byte_stream);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize a single item to one `\n`-terminated chunk
fn serialize_line<T: Serialize>(item: &T) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(item).map_err(std::io::Error::other)?;
    let mut chunk = BytesMut::with_capacity(json.len() + 1);
    chunk.put_slice(&json);
    chunk.put_u8(b'\n');
    Ok(chunk.freeze())
}

/// Stream every displayed chart, starting with the current one.
/// `guard` is dropped when the client goes away.
pub fn stream_from_watch<G>(rx: watch::Receiver<DisplayedChart>, guard: G) -> impl IntoResponse
where
    G: Send + Sync + 'static,
{
    let charts = WatchStream::new(rx).map(move |chart| {
        let _held = &guard;
        chart
    });
    match ndjson_stream(charts) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
