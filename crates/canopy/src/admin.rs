//! Admin assignment handlers
//!
//! Assignments are managed by callers holding `admin` on the community, which
//! includes admins of any ancestor.

use axum::{
	Json,
	extract::{Path, Query, State},
	http::StatusCode,
};
use serde::Deserialize;

use crate::community::{AssignmentKind, NodeAdminAssignment};
use crate::prelude::*;
use crate::types::ApiResponse;
use canopy_core::{
	extract::{Auth, NodeAccess},
	roles,
};

/// GET /api/communities/{communityId}/admins
pub async fn list_admins(
	State(app): State<App>,
	access: NodeAccess,
) -> ClResult<Json<ApiResponse<Vec<NodeAdminAssignment>>>> {
	let assignments = app.meta_adapter.list_node_assignments(access.node_id).await?;
	Ok(Json(ApiResponse::new(assignments)))
}

#[derive(Debug, Deserialize)]
pub struct AssignmentRequest {
	pub kind: AssignmentKind,
}

/// PUT /api/communities/{communityId}/admins/{accountId}
pub async fn put_admin(
	State(app): State<App>,
	Auth(auth): Auth,
	access: NodeAccess,
	Path((_community_id, account_id)): Path<(NodeId, AccountId)>,
	Json(req): Json<AssignmentRequest>,
) -> ClResult<StatusCode> {
	let target = app.meta_adapter.read_account(account_id).await?;
	if !roles::classify(&target).is_eligible_for(req.kind) {
		return Err(Error::ValidationError(format!(
			"account role '{}' cannot hold a {:?} assignment",
			target.role, req.kind
		)));
	}

	app.meta_adapter
		.create_assignment(account_id, access.node_id, req.kind, Some(auth.account_id))
		.await?;
	info!(
		subject = %auth.account_id,
		community = %access.node_id,
		admin = %account_id,
		kind = ?req.kind,
		"Admin assigned"
	);

	Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/communities/{communityId}/admins/{accountId}?kind=...
pub async fn delete_admin(
	State(app): State<App>,
	Auth(auth): Auth,
	access: NodeAccess,
	Path((_community_id, account_id)): Path<(NodeId, AccountId)>,
	Query(req): Query<AssignmentRequest>,
) -> ClResult<StatusCode> {
	app.meta_adapter.delete_assignment(account_id, access.node_id, req.kind).await?;
	info!(
		subject = %auth.account_id,
		community = %access.node_id,
		admin = %account_id,
		kind = ?req.kind,
		"Admin unassigned"
	);

	Ok(StatusCode::NO_CONTENT)
}

// vim: ts=4
