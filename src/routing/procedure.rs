//! Procedures and their replies.
//!
//! A procedure receives the request context and the raw body and returns a [`Reply`].
//! Registration erases the concrete reply type behind [`Procedure`], which hands the
//! dispatcher either a bare status or already-encoded JSON.

use std::marker::PhantomData;

use axum::body::Bytes;
use axum::http::StatusCode;
use serde::Serialize;

use crate::chain::context::RequestContext;

/// What a procedure produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T = serde_json::Value> {
    /// Respond with this status and an empty body.
    StatusOnly(StatusCode),
    /// Encode the value as JSON and respond with it.
    Body(T),
}

impl<T> Reply<T> {
    /// Shorthand for `Reply::StatusOnly` from a numeric code.
    ///
    /// # Panics
    /// If `code` is outside 100..=999.
    pub fn status(code: u16) -> Self {
        match StatusCode::from_u16(code) {
            Ok(status) => Reply::StatusOnly(status),
            Err(_) => panic!("invalid status code {code} returned by procedure"),
        }
    }
}

impl<T> From<StatusCode> for Reply<T> {
    fn from(status: StatusCode) -> Self {
        Reply::StatusOnly(status)
    }
}

/// Reply after JSON encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedReply {
    Status(StatusCode),
    Json(Bytes),
}

/// Type-erased procedure as stored in a handler record.
pub trait Procedure: Send + Sync + 'static {
    fn invoke(&self, ctx: &mut RequestContext, body: &Bytes) -> Result<EncodedReply, serde_json::Error>;
}

/// Adapts a closure returning `Reply<T>` into a [`Procedure`].
pub struct JsonProcedure<F, T> {
    procedure: F,
    _reply: PhantomData<fn() -> T>,
}

impl<F, T> JsonProcedure<F, T>
where
    F: Fn(&mut RequestContext, &Bytes) -> Reply<T> + Send + Sync + 'static,
    T: Serialize + 'static,
{
    pub fn new(procedure: F) -> Self {
        Self {
            procedure,
            _reply: PhantomData,
        }
    }
}

impl<F, T> Procedure for JsonProcedure<F, T>
where
    F: Fn(&mut RequestContext, &Bytes) -> Reply<T> + Send + Sync + 'static,
    T: Serialize + 'static,
{
    fn invoke(&self, ctx: &mut RequestContext, body: &Bytes) -> Result<EncodedReply, serde_json::Error> {
        match (self.procedure)(ctx, body) {
            Reply::StatusOnly(status) => Ok(EncodedReply::Status(status)),
            Reply::Body(value) => serde_json::to_vec(&value).map(|json| EncodedReply::Json(Bytes::from(json))),
        }
    }
}
