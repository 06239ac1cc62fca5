use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures::StreamExt;
use http::{HeaderMap, Method, Request, Response, StatusCode};
use kubeclient::{Body, Transport, TransportError};

/// What the client sent.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Default)]
struct Inner {
    requests: Vec<RecordedRequest>,
    responses: VecDeque<Result<Response<Body>, TransportError>>,
}

/// Records requests and answers them with queued responses, in order.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

impl MockTransport {
    pub fn respond(&self, status: StatusCode, body: &str) {
        let chunk = Bytes::copy_from_slice(body.as_bytes());
        self.respond_chunks(status, vec![Ok(chunk)]);
    }

    /// Queues a response whose body arrives in `chunks`, errors included.
    pub fn respond_chunks(&self, status: StatusCode, chunks: Vec<std::io::Result<Bytes>>) {
        let body = futures::stream::iter(chunks).boxed();
        let resp = Response::builder().status(status).body(body).unwrap();

        self.inner.lock().unwrap().responses.push_back(Ok(resp));
    }

    pub fn fail(&self, err: TransportError) {
        self.inner.lock().unwrap().responses.push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.inner
            .lock()
            .unwrap()
            .requests
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl Transport for MockTransport {
    async fn send(&self, req: Request<Bytes>) -> Result<Response<Body>, TransportError> {
        let (parts, body) = req.into_parts();
        let mut inner = self.inner.lock().unwrap();

        inner.requests.push(RecordedRequest {
            method: parts.method,
            uri: parts.uri.to_string(),
            headers: parts.headers,
            body,
        });

        inner.responses.pop_front().unwrap_or_else(|| {
            Err(TransportError::Io(std::io::Error::other(
                "no response queued",
            )))
        })
    }
}
