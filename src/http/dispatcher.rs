//! Per-request dispatch.
//!
//! # States
//! ```text
//! Init → BodyRead → PreChain → Procedure → PostChain → WriteResponse → Done
//!           │           │
//!           │           └─ pre-chain returned false → Done (nothing written)
//!           └─ read failed → 417, no body → Done
//! ```
//!
//! # Design Decisions
//! - The context is created here and dropped when dispatch returns
//! - A pre-chain abort writes nothing; the aborting callback owns the response
//! - A post-chain abort still writes the status and body from the context
//! - An unencodable procedure reply is a fault, not an HTTP error

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::StatusCode;

use crate::chain::context::RequestContext;
use crate::http::response::ResponseSink;
use crate::routing::procedure::EncodedReply;
use crate::routing::table::HandlerRecord;

/// How a dispatch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The request body could not be read; 417 was written.
    BodyReadFailed,
    /// A pre-callback returned false; the procedure did not run.
    PreChainAborted,
    /// The procedure ran and the response was written.
    Completed {
        /// A post-callback returned false and the rest of the post-chain was skipped.
        post_chain_aborted: bool,
    },
    /// The procedure ran but the sink refused the body.
    ///
    /// Only sinks that can fail report this. Under [`HttpServer`](crate::HttpServer) the
    /// sink is a [`BufferedResponse`](crate::http::BufferedResponse), whose writes never
    /// fail; socket errors happen later inside hyper, after the handler has returned,
    /// and are not seen by the dispatcher or the request metrics.
    WriteFailed,
}

impl DispatchOutcome {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::BodyReadFailed => "body_read_failed",
            DispatchOutcome::PreChainAborted => "pre_chain_aborted",
            DispatchOutcome::Completed { post_chain_aborted: false } => "completed",
            DispatchOutcome::Completed { post_chain_aborted: true } => "post_chain_aborted",
            DispatchOutcome::WriteFailed => "write_failed",
        }
    }
}

/// Drive one request through `record`'s chains and procedure, writing into `sink`.
///
/// # Panics
/// If the procedure's reply cannot be encoded as JSON.
pub async fn dispatch<S>(
    record: &HandlerRecord,
    request: &Parts,
    body: Body,
    body_limit: usize,
    sink: &mut S,
) -> DispatchOutcome
where
    S: ResponseSink,
{
    let mut ctx = RequestContext::new();

    let payload = match axum::body::to_bytes(body, body_limit).await {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(message = %record.name(), error = %e, "Failed to read request body");
            sink.write_status(StatusCode::EXPECTATION_FAILED);
            return DispatchOutcome::BodyReadFailed;
        }
    };
    ctx.set_request_body(payload.clone());

    if !record.pre_chain().run(&mut ctx, sink, request) {
        tracing::debug!(message = %record.name(), "Pre-chain aborted request");
        return DispatchOutcome::PreChainAborted;
    }

    match record.procedure().invoke(&mut ctx, &payload) {
        Ok(EncodedReply::Status(status)) => ctx.set_status(status),
        Ok(EncodedReply::Json(json)) => ctx.set_response_body(json),
        Err(e) => {
            tracing::error!(message = %record.name(), error = %e, "Procedure reply is not JSON-encodable");
            panic!("procedure for message {:?} returned an unencodable reply: {e}", record.name());
        }
    }

    let post_chain_completed = record.post_chain().run(&mut ctx, sink, request);
    if !post_chain_completed {
        tracing::debug!(message = %record.name(), "Post-chain stopped early");
    }

    sink.write_status(ctx.status());
    if let Err(e) = sink.write(ctx.response_body()) {
        tracing::error!(message = %record.name(), error = %e, "Failed to write response body");
        return DispatchOutcome::WriteFailed;
    }

    DispatchOutcome::Completed {
        post_chain_aborted: !post_chain_completed,
    }
}
