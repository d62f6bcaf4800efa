//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all routes)
//!     → pipeline: routing table snapshot → privilege check
//!     → local handler, or hyper client forward to the cluster destination
//!     → response relayed to client, one log event emitted
//! ```

pub mod server;

pub use server::{build_router, AppState};
