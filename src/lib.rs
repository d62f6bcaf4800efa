//! Ultramarine Gateway Library
//!
//! A local/edge API gateway: declarative path-prefix routing, per-route
//! privilege checks, in-process local dispatch with network-proxy fallback,
//! and hot reload of the route document while serving.

pub mod config;
pub mod dispatch;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod routing;
pub mod security;

pub use config::schema::RouterConfig;
pub use dispatch::LocalDispatchRegistry;
pub use gateway::{Gateway, GatewayError, GatewayHandle, GatewayOptions};
pub use lifecycle::Shutdown;
pub use security::PRIVILEGES_HEADER;
