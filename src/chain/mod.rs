//! Callback chains and per-request context.
//!
//! # Data Flow
//! ```text
//! Dispatcher creates RequestContext
//!     → pre-chain (callback.rs), may abort
//!     → procedure
//!     → post-chain (callback.rs), may stop early
//! RequestContext dropped with the request
//! ```

pub mod callback;
pub mod context;

pub use callback::{Callback, CallbackChain, SharedCallback};
pub use context::RequestContext;
