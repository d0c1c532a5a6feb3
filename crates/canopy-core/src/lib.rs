//! Core infrastructure for Canopy.
//!
//! Holds the application state shared by every handler, bearer token
//! authentication, the role classifier, the hierarchical permission resolver
//! and the middleware adapters that put the resolver in front of routes.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod auth;
pub mod extract;
pub mod membership;
pub mod middleware;
pub mod perm;
pub mod prelude;
pub mod resolver;
pub mod roles;
pub mod tree;

// Re-export commonly used types
pub use app::{App, AppBuilderOpts, AppState, VERSION};
pub use auth::AuthCtx;
pub use extract::{Auth, NodeAccess};
pub use middleware::PermissionCheckOutput;
pub use resolver::{Access, Grant, PermissionResolver};

// vim: ts=4
