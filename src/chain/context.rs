//! Per-request scratch state.
//!
//! # Responsibilities
//! - Hold the response status and body the dispatcher will eventually write
//! - Hold the raw request body once it has been read
//! - Carry caller-defined values between callbacks and the procedure
//!
//! # Design Decisions
//! - Reserved fields are typed; everything else goes through a string-keyed map
//! - Owned by exactly one request; never cloned or shared across tasks

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use axum::body::Bytes;
use axum::http::StatusCode;

/// Scratch space shared by the callback chains and the procedure of a single request.
pub struct RequestContext {
    status: StatusCode,
    response_body: Bytes,
    request_body: Bytes,
    values: HashMap<String, Box<dyn Any + Send>>,
}

impl RequestContext {
    /// Fresh context: status 200, empty response body, empty request body.
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            response_body: Bytes::new(),
            request_body: Bytes::new(),
            values: HashMap::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn response_body(&self) -> &Bytes {
        &self.response_body
    }

    pub fn set_response_body(&mut self, body: impl Into<Bytes>) {
        self.response_body = body.into();
    }

    /// Raw bytes of the request body. Empty until the body has been read.
    pub fn request_body(&self) -> &Bytes {
        &self.request_body
    }

    pub(crate) fn set_request_body(&mut self, body: Bytes) {
        self.request_body = body;
    }

    /// Store a caller-defined value, returning the previous value under `key` if it had type `T`.
    pub fn insert<T>(&mut self, key: impl Into<String>, value: T) -> Option<T>
    where
        T: Any + Send,
    {
        self.values
            .insert(key.into(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Look up a value by key. Returns `None` if absent or stored with a different type.
    pub fn get<T: Any + Send>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn get_mut<T: Any + Send>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key).and_then(|v| v.downcast_mut::<T>())
    }

    /// Remove a value. A value of another type is left in place.
    pub fn remove<T: Any + Send>(&mut self, key: &str) -> Option<T> {
        if !self.values.get(key).is_some_and(|v| v.is::<T>()) {
            return None;
        }
        self.values
            .remove(key)
            .and_then(|v| v.downcast::<T>().ok())
            .map(|v| *v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("status", &self.status)
            .field("response_body_len", &self.response_body.len())
            .field("request_body_len", &self.request_body.len())
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}
