//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, exact path lookup)
//!     → request.rs (request ID)
//!     → dispatcher.rs (body read, pre-chain, procedure, post-chain)
//!     → response.rs (buffered sink → Response)
//!     → Send to client
//! ```

pub mod dispatcher;
pub mod request;
pub mod response;
pub mod server;

pub use dispatcher::{dispatch, DispatchOutcome};
pub use request::X_REQUEST_ID;
pub use response::{BufferedResponse, ResponseSink};
pub use server::HttpServer;
