//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (state.rs):
//!     Configuring → Sealed → Serving, one way only
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → server stops accepting → drain → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Registration misuse is fatal and happens before any traffic
//! - Listeners start last (traffic only once every route is sealed)

pub mod shutdown;
pub mod signals;
pub mod state;

pub use shutdown::Shutdown;
pub use state::{LifecycleGuard, LifecycleState};
