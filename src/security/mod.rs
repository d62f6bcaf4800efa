//! Privilege-based access control.
//!
//! # Design Decisions
//! - Privileges are opaque string tokens; the gateway compares, never interprets
//! - The decision is a pure function over the route's compiled metadata and
//!   the caller's asserted set, evaluated before any dispatch or forwarding
//! - Deny responses name the missing privileges so operators can fix policies

pub mod privileges;

pub use privileges::{authorize, PrivilegeSet, PRIVILEGES_HEADER};
