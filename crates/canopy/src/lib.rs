//! Canopy is a service for nested communities.
//!
//! # Features
//!
//! - Community tree with materialized paths
//!     - sub-communities at any depth
//!     - reparenting moves a whole subtree in one transaction
//! - Memberships and invite codes
//! - Community admin and sub-community admin assignments
//!     - an assignment covers the node and everything below it
//! - One permission resolver behind every route
//!     - public communities leak read access to members of their parents,
//!       never across a private community

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

// Re-export shared types and adapter traits from canopy-types
pub use canopy_types::community;
pub use canopy_types::error;
pub use canopy_types::meta_adapter;
pub use canopy_types::tree;
pub use canopy_types::types;
pub use canopy_types::utils;

// Local modules
pub mod admin;
pub mod app;
pub mod communities;
pub mod invite;
pub mod member;
pub mod prelude;
pub mod routes;

pub use crate::app::{App, AppBuilder};

// vim: ts=4
