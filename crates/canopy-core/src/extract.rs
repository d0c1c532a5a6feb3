//! Custom extractors for Canopy-specific data

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::AuthCtx;
use crate::prelude::*;
use crate::resolver::Grant;

// Auth //
//******//
#[derive(Debug, Clone)]
pub struct Auth(pub AuthCtx);

impl<S> FromRequestParts<S> for Auth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		if let Some(auth) = parts.extensions.get::<Auth>().cloned() {
			Ok(auth)
		} else {
			Err(Error::Unauthorized)
		}
	}
}

// NodeAccess //
//************//
/// The node a permission middleware checked, and the rule that allowed it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeAccess {
	pub node_id: NodeId,
	pub grant: Grant,
}

impl<S> FromRequestParts<S> for NodeAccess
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		parts.extensions.get::<NodeAccess>().copied().ok_or_else(|| {
			error!("NodeAccess requested on a route without a permission check");
			Error::PermissionDenied
		})
	}
}

// vim: ts=4
