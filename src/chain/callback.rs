//! Callbacks and ordered callback chains.
//!
//! # Responsibilities
//! - Define the callback contract (context, sink, request) -> continue?
//! - Run a chain in registration order, stopping at the first `false`
//!
//! # Design Decisions
//! - Callbacks are shared `Arc<dyn Callback>` so resolved chains can reuse the global ones
//! - A chain is immutable once built; resolution produces a new chain

use std::fmt;
use std::sync::Arc;

use axum::http::request::Parts;

use crate::chain::context::RequestContext;
use crate::http::response::ResponseSink;

/// A hook run before or after a procedure.
///
/// Returning `false` aborts the rest of the chain for the current phase.
pub trait Callback: Send + Sync + 'static {
    fn call(&self, ctx: &mut RequestContext, sink: &mut dyn ResponseSink, request: &Parts) -> bool;
}

impl<F> Callback for F
where
    F: Fn(&mut RequestContext, &mut dyn ResponseSink, &Parts) -> bool + Send + Sync + 'static,
{
    fn call(&self, ctx: &mut RequestContext, sink: &mut dyn ResponseSink, request: &Parts) -> bool {
        self(ctx, sink, request)
    }
}

/// Shared handle to a callback.
pub type SharedCallback = Arc<dyn Callback>;

/// Ordered list of callbacks.
#[derive(Clone, Default)]
pub struct CallbackChain {
    callbacks: Vec<SharedCallback>,
}

impl CallbackChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, callback: SharedCallback) {
        self.callbacks.push(callback);
    }

    /// Chain made of `base` (unless `clear_base`) followed by `extra`.
    pub fn resolve(base: &CallbackChain, clear_base: bool, extra: &CallbackChain) -> Self {
        let mut callbacks = Vec::with_capacity(base.len() + extra.len());
        if !clear_base {
            callbacks.extend(base.callbacks.iter().cloned());
        }
        callbacks.extend(extra.callbacks.iter().cloned());
        Self { callbacks }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Run every callback in order. Returns `false` as soon as one callback does;
    /// an empty chain returns `true`.
    pub fn run(&self, ctx: &mut RequestContext, sink: &mut dyn ResponseSink, request: &Parts) -> bool {
        for (position, callback) in self.callbacks.iter().enumerate() {
            if !callback.call(ctx, sink, request) {
                tracing::debug!(position, "Callback aborted chain");
                return false;
            }
        }
        true
    }
}

impl fmt::Debug for CallbackChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackChain")
            .field("len", &self.callbacks.len())
            .finish()
    }
}

impl<C: Callback> FromIterator<C> for CallbackChain {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self {
            callbacks: iter
                .into_iter()
                .map(|c| Arc::new(c) as SharedCallback)
                .collect(),
        }
    }
}
