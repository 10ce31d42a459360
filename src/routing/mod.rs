//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Configuration phase:
//!     set_url_prefix / add_pre_callback / add_post_callback / register
//!     → registry.rs (pending registrations, global chains)
//!
//! Sealing (at startup):
//!     pending registrations
//!     → resolve chains (global unless cleared, then per-message extras)
//!     → reject duplicate names
//!     → table.rs (immutable RouteTable keyed by <prefix><name>)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Exact path match only
//! - Deterministic: same path always reaches the same message

pub mod prefix;
pub mod procedure;
pub mod registry;
pub mod table;

pub use prefix::{PrefixError, UrlPrefix};
pub use procedure::{EncodedReply, JsonProcedure, Procedure, Reply};
pub use registry::{RegistrationOptions, Registry, RegistryError};
pub use table::{HandlerRecord, RouteTable};
