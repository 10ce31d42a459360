//! Network-layer plumbing below the HTTP router.
//!
//! ```text
//! TcpListener ──────────────▶ axum::serve          (plain HTTP)
//! bind_address + tls.rs ────▶ axum_server (rustls) (HTTPS)
//! ```

pub mod tls;
