//! Local dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Request path "/api/ObjectList"
//!     → endpoint_name() extracts final segment
//!     → registry.resolve() (case-insensitive, '-' stripped)
//!     → hit: invoke handler in-process, respond with its JSON result
//!     → miss: fall through to network forwarding
//! ```
//!
//! # Design Decisions
//! - The registry is populated explicitly at startup; no runtime type
//!   scanning, so the handler set is enumerable and testable
//! - Handlers are async capabilities; invoking one suspends the request task
//!   without blocking other in-flight requests

pub mod registry;

pub use registry::{
    endpoint_name, HandlerError, HandlerFn, HandlerRequest, HandlerResult, LocalDispatchRegistry,
};
