//! Membership handlers

use axum::{
	Json,
	extract::{Path, State},
	http::StatusCode,
};

use crate::community::Membership;
use crate::prelude::*;
use crate::types::ApiResponse;
use canopy_core::extract::{Auth, NodeAccess};

/// GET /api/communities/{communityId}/members
///
/// Readers that only see the community through a parent membership cannot
/// list its members.
pub async fn list_members(
	State(app): State<App>,
	Auth(auth): Auth,
	access: NodeAccess,
) -> ClResult<Json<ApiResponse<Vec<Membership>>>> {
	if access.grant.is_limited() {
		warn!(subject = %auth.account_id, community = %access.node_id, grant = %access.grant, "Member listing denied for limited grant");
		return Err(Error::PermissionDenied);
	}

	let members = app.meta_adapter.list_members(access.node_id).await?;
	Ok(Json(ApiResponse::new(members)))
}

/// DELETE /api/communities/{communityId}/members/me - Leave a community
pub async fn leave_community(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(community_id): Path<NodeId>,
) -> ClResult<StatusCode> {
	app.meta_adapter.delete_membership(auth.account_id, community_id).await?;
	info!(subject = %auth.account_id, community = %community_id, "Left community");

	Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/communities/{communityId}/members/{accountId} - Remove a member
pub async fn remove_member(
	State(app): State<App>,
	Auth(auth): Auth,
	access: NodeAccess,
	Path((_community_id, account_id)): Path<(NodeId, AccountId)>,
) -> ClResult<StatusCode> {
	app.meta_adapter.delete_membership(account_id, access.node_id).await?;
	info!(
		subject = %auth.account_id,
		community = %access.node_id,
		member = %account_id,
		grant = %access.grant,
		"Member removed"
	);

	Ok(StatusCode::NO_CONTENT)
}

// vim: ts=4
