//! RPC-over-HTTP dispatch shim.
//!
//! Named messages are exposed as `POST <prefix><name>`. Each request runs a pre-chain of
//! callbacks, the message's procedure, and a post-chain, then writes the status and body
//! left in its [`RequestContext`].

pub mod chain;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use chain::{Callback, RequestContext};
pub use config::ShimConfig;
pub use http::{HttpServer, ResponseSink};
pub use lifecycle::Shutdown;
pub use routing::{RegistrationOptions, Registry, Reply};
