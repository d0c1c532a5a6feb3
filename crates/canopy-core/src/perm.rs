//! Community permission middleware
//!
//! Thin adapters around the permission resolver: each one finds the target
//! node of a request, resolves the caller's access and either rejects the
//! request or stores a `NodeAccess` in the request extensions for handlers.
//! Inactive nodes are refused unless the grant is privileged.

use axum::{
	body::{Body, to_bytes},
	extract::{Path, Request, State},
	middleware::Next,
	response::Response,
};
use std::collections::HashMap;

use canopy_types::community::Permission;

use crate::{
	extract::{Auth, NodeAccess},
	middleware::PermissionCheckOutput,
	prelude::*,
	resolver::Access,
	tree,
};

/// Path parameter naming the community a route acts on
pub const COMMUNITY_PARAM: &str = "communityId";
/// Path parameter naming a sub-community of the route's community
pub const SUB_COMMUNITY_PARAM: &str = "subCommunityId";

/// Middleware factory checking `permission` on the `{communityId}` path parameter
pub fn check_perm_community(
	permission: Permission,
) -> impl Fn(State<App>, Auth, Path<HashMap<String, String>>, Request, Next) -> PermissionCheckOutput
+ Clone {
	move |state, auth, path, req, next| {
		Box::pin(check_path_permission(state, auth, path, req, next, COMMUNITY_PARAM, permission))
	}
}

/// Middleware factory checking `permission` on the `{subCommunityId}` path parameter
pub fn check_perm_sub_community(
	permission: Permission,
) -> impl Fn(State<App>, Auth, Path<HashMap<String, String>>, Request, Next) -> PermissionCheckOutput
+ Clone {
	move |state, auth, path, req, next| {
		Box::pin(check_path_permission(state, auth, path, req, next, SUB_COMMUNITY_PARAM, permission))
	}
}

/// Middleware factory checking `permission` on a node id carried in the JSON
/// request body under `field`
pub fn check_perm_payload(
	field: &'static str,
	permission: Permission,
) -> impl Fn(State<App>, Auth, Request, Next) -> PermissionCheckOutput + Clone {
	move |state, auth, req, next| {
		Box::pin(check_payload_permission(state, auth, req, next, field, permission))
	}
}

async fn check_path_permission(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(params): Path<HashMap<String, String>>,
	mut req: Request,
	next: Next,
	param: &str,
	permission: Permission,
) -> Result<Response, Error> {
	let node_id = params
		.get(param)
		.ok_or_else(|| {
			error!(param = param, "Permission check on a route without the parameter");
			Error::Internal(format!("missing path parameter {}", param))
		})?
		.parse::<NodeId>()
		.map_err(|_| Error::ValidationError(format!("invalid {}", param)))?;

	let access = authorize(&app, auth.account_id, node_id, permission).await?;
	req.extensions_mut().insert(access);

	Ok(next.run(req).await)
}

async fn check_payload_permission(
	State(app): State<App>,
	Auth(auth): Auth,
	req: Request,
	next: Next,
	field: &str,
	permission: Permission,
) -> Result<Response, Error> {
	let (parts, body) = req.into_parts();
	let bytes = to_bytes(body, app.opts.max_payload_size)
		.await
		.map_err(|_| Error::ValidationError("request body too large".into()))?;

	let node_id = node_id_from_payload(&bytes, field)?;
	let access = authorize(&app, auth.account_id, node_id, permission).await?;

	let mut req = Request::from_parts(parts, Body::from(bytes));
	req.extensions_mut().insert(access);

	Ok(next.run(req).await)
}

/// The id must be a JSON number, the same form handlers deserialize
fn node_id_from_payload(bytes: &[u8], field: &str) -> ClResult<NodeId> {
	let payload: serde_json::Value = serde_json::from_slice(bytes)?;

	payload
		.get(field)
		.and_then(serde_json::Value::as_u64)
		.and_then(|n| u32::try_from(n).ok())
		.map(NodeId)
		.ok_or_else(|| Error::ValidationError(format!("missing or invalid {}", field)))
}

async fn authorize(
	app: &App,
	account_id: AccountId,
	node_id: NodeId,
	permission: Permission,
) -> ClResult<NodeAccess> {
	let access = match app.resolver.resolve(account_id, node_id, permission).await? {
		Access::Allow(grant) => {
			let privileged = grant.is_privileged();
			match tree::read_visible_node(app.meta_adapter.as_ref(), node_id, privileged).await {
				Ok(_) => Access::Allow(grant),
				Err(Error::NotFound) => Access::Deny,
				Err(err) => return Err(err),
			}
		}
		Access::Deny => Access::Deny,
	};

	match access {
		Access::Allow(grant) => Ok(NodeAccess { node_id, grant }),
		Access::Deny => {
			warn!(
				subject = %account_id,
				community = %node_id,
				permission = %permission,
				"Community permission denied"
			);
			Err(Error::PermissionDenied)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_node_id_from_payload() {
		assert_eq!(node_id_from_payload(br#"{"communityId":7}"#, "communityId").unwrap(), NodeId(7));
		assert_eq!(
			node_id_from_payload(br#"{"communityId":12,"x":1}"#, "communityId").unwrap(),
			NodeId(12)
		);
		assert!(matches!(
			node_id_from_payload(br#"{"communityId":"12"}"#, "communityId"),
			Err(Error::ValidationError(_))
		));
		assert!(matches!(
			node_id_from_payload(br#"{"other":7}"#, "communityId"),
			Err(Error::ValidationError(_))
		));
		assert!(matches!(
			node_id_from_payload(br#"{"communityId":-1}"#, "communityId"),
			Err(Error::ValidationError(_))
		));
		assert!(matches!(node_id_from_payload(b"not json", "communityId"), Err(Error::Parse)));
	}
}

// vim: ts=4
