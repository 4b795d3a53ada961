//! Server-sent events parsing for streamed provider responses.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures::stream::Fuse;
use futures::{Stream, StreamExt};

use crate::error::Error;

/// Splits an SSE byte stream into `data:` payloads.
///
/// Comments, `event:` lines and the `[DONE]` marker are skipped. Bytes are
/// buffered until a line is complete, so a character split across chunks is
/// decoded whole. A transport error or a line that is not UTF-8 becomes
/// [`Error::ProviderStream`].
#[derive(Debug)]
pub struct SseStreamParser<S> {
    inner: Fuse<S>,
    buffer: BytesMut,
}

impl<S, E> SseStreamParser<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: std::fmt::Display,
{
    /// Create a new SSE stream parser.
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream.fuse(),
            buffer: BytesMut::new(),
        }
    }

    fn next_line(&mut self) -> Option<Result<String, Error>> {
        let pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let line = self.buffer.split_to(pos + 1);
        Some(decode_line(&line[..pos]))
    }
}

fn decode_line(bytes: &[u8]) -> Result<String, Error> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| Error::provider_stream(format!("invalid UTF-8 in event stream: {e}")))
}

/// Parse an SSE data line, stripping the `data:` prefix.
#[must_use]
pub fn parse_sse_data(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(':') {
        return None;
    }
    trimmed.strip_prefix("data:").map(str::trim_start)
}

/// Check if the data indicates stream completion.
#[must_use]
pub fn is_done_marker(data: &str) -> bool {
    data.trim() == "[DONE]"
}

impl<S, E> Stream for SseStreamParser<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: std::fmt::Display,
{
    type Item = Result<String, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match self.next_line() {
                Some(Ok(line)) => {
                    if let Some(data) = parse_sse_data(&line)
                        && !is_done_marker(data)
                    {
                        return Poll::Ready(Some(Ok(data.to_owned())));
                    }
                    continue;
                }
                Some(Err(e)) => return Poll::Ready(Some(Err(e))),
                None => {}
            }

            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => self.buffer.extend_from_slice(&bytes),
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(Error::provider_stream(e.to_string()))));
                }
                Poll::Ready(None) => {
                    if self.buffer.is_empty() {
                        return Poll::Ready(None);
                    }
                    // Flush a final line that had no trailing newline.
                    let remaining = self.buffer.split();
                    let text = match decode_line(&remaining) {
                        Ok(text) => text,
                        Err(e) => return Poll::Ready(Some(Err(e))),
                    };
                    for line in text.lines() {
                        if let Some(data) = parse_sse_data(line)
                            && !is_done_marker(data)
                        {
                            return Poll::Ready(Some(Ok(data.to_owned())));
                        }
                    }
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
