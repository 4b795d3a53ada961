//! A scripted [`ResponsesClient`] for tests.
//!
//! Replies are queued up front and handed out in order; every request the
//! client receives is recorded so tests can inspect the exact wire params.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use futures::stream;

use super::openai::types::{Response, ResponseCreateParams, ResponseStreamEvent};
use super::{ResponseStream, ResponsesClient};
use crate::error::{Error, Result};

enum Reply {
    Response(Response),
    Stream(Vec<Result<ResponseStreamEvent>>),
    Error(Error),
}

/// A [`ResponsesClient`] that replays queued replies.
///
/// ```rust
/// use tripwire::providers::MockResponsesClient;
/// use tripwire::providers::openai::types::Response;
///
/// let client = MockResponsesClient::new().with_response(Response {
///     id: "resp_1".into(),
///     model: None,
///     status: None,
///     output: vec![],
///     usage: None,
///     error: None,
/// });
/// assert_eq!(client.pending(), 1);
/// ```
#[derive(Default)]
pub struct MockResponsesClient {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ResponseCreateParams>>,
}

impl MockResponsesClient {
    /// Create a client with nothing queued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a full response for [`create`](ResponsesClient::create).
    #[must_use]
    pub fn with_response(self, response: Response) -> Self {
        self.push(Reply::Response(response));
        self
    }

    /// Queue a stream of events for
    /// [`create_stream`](ResponsesClient::create_stream).
    #[must_use]
    pub fn with_stream(self, events: Vec<ResponseStreamEvent>) -> Self {
        self.push(Reply::Stream(events.into_iter().map(Ok).collect()));
        self
    }

    /// Queue a stream whose items may include errors.
    #[must_use]
    pub fn with_stream_results(self, items: Vec<Result<ResponseStreamEvent>>) -> Self {
        self.push(Reply::Stream(items));
        self
    }

    /// Queue an error for the next call of either kind.
    #[must_use]
    pub fn with_error(self, error: Error) -> Self {
        self.push(Reply::Error(error));
        self
    }

    /// Requests received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<ResponseCreateParams> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent request.
    #[must_use]
    pub fn last_request(&self) -> Option<ResponseCreateParams> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Number of replies not yet handed out.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn push(&self, reply: Reply) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
    }

    fn next_reply(&self, params: &ResponseCreateParams) -> Result<Reply> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(params.clone());
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| Error::configuration("MockResponsesClient has no reply queued"))
    }
}

impl std::fmt::Debug for MockResponsesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockResponsesClient")
            .field("pending", &self.pending())
            .field("requests", &self.requests().len())
            .finish()
    }
}

#[async_trait]
impl ResponsesClient for MockResponsesClient {
    async fn create(&self, params: &ResponseCreateParams) -> Result<Response> {
        match self.next_reply(params)? {
            Reply::Response(response) => Ok(response),
            Reply::Error(error) => Err(error),
            Reply::Stream(_) => Err(Error::configuration(
                "MockResponsesClient: a stream is queued but create() was called",
            )),
        }
    }

    async fn create_stream(&self, params: &ResponseCreateParams) -> Result<ResponseStream> {
        match self.next_reply(params)? {
            Reply::Stream(items) => Ok(Box::pin(stream::iter(items))),
            Reply::Error(error) => Err(error),
            Reply::Response(_) => Err(Error::configuration(
                "MockResponsesClient: a response is queued but create_stream() was called",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn params() -> ResponseCreateParams {
        ResponseCreateParams::new("gpt-4o", vec![])
    }

    fn response(id: &str) -> Response {
        Response {
            id: id.to_owned(),
            model: None,
            status: None,
            output: vec![],
            usage: None,
            error: None,
        }
    }

    #[tokio::test]
    async fn test_replays_in_order_and_records() {
        let client = MockResponsesClient::new()
            .with_response(response("a"))
            .with_error(Error::provider_request(Some(500), "boom", None));

        assert_eq!(client.create(&params()).await.unwrap().id, "a");
        assert!(client.create(&params()).await.is_err());
        assert_eq!(client.requests().len(), 2);
        assert_eq!(client.pending(), 0);
    }

    #[tokio::test]
    async fn test_empty_queue_is_an_error() {
        let err = MockResponsesClient::new()
            .create(&params())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[tokio::test]
    async fn test_stream_reply() {
        let client = MockResponsesClient::new().with_stream(vec![
            ResponseStreamEvent::Created {
                response: response("s"),
            },
            ResponseStreamEvent::Completed {
                response: response("s"),
            },
        ]);
        let events: Vec<_> = client.create_stream(&params()).await.unwrap().collect().await;
        assert_eq!(events.len(), 2);
        assert!(client.last_request().is_some());
    }
}
