//! Cancellable, fully-buffering stream reader
//!
//! Consumes a runtime byte stream (container logs, image-pull progress) to
//! completion on a background task while the caller waits on either the read
//! finishing or a cancellation token firing. The caller always joins the
//! background task before returning, so the task never outlives the call and
//! the stream handle is dropped exactly once, on task exit, whichever way the
//! read ended.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use regex::Regex;
use std::sync::LazyLock;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Result, TaskerError};

/// Matches the logical-failure line the image-pull protocol embeds in an
/// otherwise successful HTTP response body
static PULL_ERROR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""error"\s*:\s*"([^"]*)""#).expect("pull error pattern compiles")
});

/// Reads a byte stream to completion into an in-memory buffer
///
/// On cancellation the read terminates promptly and returns whatever was
/// buffered so far. A mid-stream runtime error is returned as-is.
pub async fn read_stream<S>(stream: S, cancel: CancellationToken) -> Result<Vec<u8>>
where
    S: Stream<Item = std::result::Result<Bytes, bollard::errors::Error>> + Send + Unpin + 'static,
{
    let reader = tokio::spawn(async move {
        let mut stream = stream;
        let mut buf = Vec::new();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("stream read cancelled after {} bytes", buf.len());
                    break;
                }
                item = stream.next() => match item {
                    Some(Ok(chunk)) => buf.extend_from_slice(&chunk),
                    Some(Err(e)) => return Err(TaskerError::Runtime(e)),
                    None => break,
                },
            }
        }
        // The stream is owned by this task and drops here, closing the
        // underlying handle exactly once.
        Ok(buf)
    });

    reader
        .await
        .map_err(|e| TaskerError::ReadTask(e.to_string()))?
}

/// Extracts the embedded error message from buffered pull output, if any
///
/// The pull protocol can report success at the transport layer while encoding
/// a failure line-by-line in its body; a match here is a first-class error.
pub fn scan_pull_error(body: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(body);
    PULL_ERROR
        .captures(&text)
        .map(|caps| caps[1].to_string())
}
