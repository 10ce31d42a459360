//! Response sink handed to callbacks and the dispatcher.
//!
//! # Responsibilities
//! - Accept header, status and body writes from callbacks and the dispatcher
//! - Turn the buffered writes into an axum `Response`
//!
//! # Design Decisions
//! - The first status write wins; later ones are logged and ignored
//! - Writing body bytes before any status implies 200 OK
//! - No implicit `Content-Type`; callbacks set it when they want one

use std::io;

use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

/// Where callbacks and the dispatcher write the HTTP response.
pub trait ResponseSink: Send {
    /// Response headers, mutable until the response is sent.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Write the status line. Only the first call takes effect.
    fn write_status(&mut self, status: StatusCode);

    /// Append body bytes.
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;
}

/// Buffers a response in memory until the dispatch completes.
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status written so far, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Status the client will observe.
    pub fn effective_status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }
}

impl ResponseSink for BufferedResponse {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        match self.status {
            Some(existing) => {
                tracing::warn!(
                    existing = %existing,
                    ignored = %status,
                    "Superfluous status write"
                );
            }
            None => self.status = Some(status),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(bytes);
        Ok(bytes.len())
    }
}

impl IntoResponse for BufferedResponse {
    fn into_response(self) -> Response {
        let status = self.effective_status();
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }
}
