//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route document (RouterConfig)
//!     → compiler.rs (derive ids, dedupe clusters)
//!     → CompiledTables
//!     → table.rs (stamp generation id, atomic publish)
//!     → RouteTableGeneration (immutable, consulted per request)
//! ```
//!
//! # Design Decisions
//! - Tables are compiled whole; the live table is swapped, never mutated
//! - No regex in the hot path (prefix matching only)
//! - Deterministic: the same document always compiles to the same ids
//! - First match wins, in document order

pub mod compiler;
pub mod table;

pub use compiler::{compile, CompilerContext};
pub use table::{CompiledRoute, CompiledTables, RouteTable, RouteTableGeneration};
