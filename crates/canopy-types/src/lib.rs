//! Shared types, adapter traits, and core utilities for Canopy.
//!
//! This crate contains the foundational types that are shared between the
//! core crate, the server crate and all adapter implementations. Keeping them
//! here lets adapter crates compile without pulling in the HTTP layer.

pub mod community;
pub mod error;
pub mod meta_adapter;
pub mod prelude;
pub mod tree;
pub mod types;
pub mod utils;

// vim: ts=4
