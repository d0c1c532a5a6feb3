//! Shared middleware types

use axum::response::Response;
use std::future::Future;
use std::pin::Pin;

use crate::prelude::*;

/// Return type of every permission check middleware factory
pub type PermissionCheckOutput = Pin<Box<dyn Future<Output = Result<Response, Error>> + Send>>;

// vim: ts=4
