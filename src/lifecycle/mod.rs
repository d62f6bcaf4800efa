//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (gateway.rs):
//!     Load route document → Compile → Bind listener → Start watcher → Serve
//!
//! Shutdown (shutdown.rs):
//!     stop() or SIGINT → stop accepting → drain in-flight requests → exit
//! ```
//!
//! # Design Decisions
//! - Listener binds before the serve task spawns: bind failure is a startup
//!   error reported to the caller, never a silent background death
//! - Stop is idempotent and callable from any task

pub mod shutdown;

pub use shutdown::Shutdown;
