//! Route document management subsystem.
//!
//! # Data Flow
//! ```text
//! route document (YAML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, discarded after compilation)
//!
//! On file change:
//!     watcher.rs detects change, waits out the grace period
//!     → loader.rs reloads
//!     → routing compiler produces a new generation
//!     → atomic publish; requests in flight keep their snapshot
//!     → on any failure the previous generation keeps serving
//! ```
//!
//! # Design Decisions
//! - A parsed document is read-only; changes require a full reload
//! - Optional fields have defaults so minimal documents work
//! - Unknown top-level fields are ignored for forward compatibility

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_router_config, parse_router_config, ConfigError};
pub use schema::{AuthPolicy, RouteEntry, RouterConfig};
pub use watcher::{RouterWatcher, WatcherHandle};
