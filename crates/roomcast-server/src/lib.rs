//! Router, handlers, and shared state for the roomcast HTTP server.
//!
//! The binary in `main.rs` only wires configuration and serves the
//! router built here; keeping the surface in the library makes the
//! whole thing testable with `tower::ServiceExt::oneshot`.

pub mod routes;
pub mod state;
