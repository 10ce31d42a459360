//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Registry, dispatcher and server produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows into every dispatch log line
//! - The library records metrics but never installs a recorder; binaries decide

pub mod logging;
pub mod metrics;
