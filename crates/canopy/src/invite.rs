//! Invite code handlers

use axum::{
	Json,
	extract::{Path, State},
	http::StatusCode,
};
use serde::Deserialize;

use crate::community::{InviteCode, Membership};
use crate::meta_adapter::CreateInviteData;
use crate::prelude::*;
use crate::types::ApiResponse;
use crate::utils;
use canopy_core::{
	extract::{Auth, NodeAccess},
	tree,
};

const MAX_INVITE_USES: u32 = 1000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInviteRequest {
	pub community_id: NodeId,
	pub max_uses: Option<u32>,
	/// Lifetime in seconds
	pub expires_in: Option<i64>,
}

/// POST /api/invites - Create an invite code for `communityId`
pub async fn post_invite(
	State(app): State<App>,
	Auth(auth): Auth,
	access: NodeAccess,
	Json(req): Json<CreateInviteRequest>,
) -> ClResult<(StatusCode, Json<ApiResponse<InviteCode>>)> {
	if req.community_id != access.node_id {
		return Err(Error::PermissionDenied);
	}

	let max_uses = req.max_uses.unwrap_or(1);
	if max_uses == 0 || max_uses > MAX_INVITE_USES {
		return Err(Error::ValidationError(format!("maxUses must be 1 to {}", MAX_INVITE_USES)));
	}
	let expires_at = match req.expires_in {
		Some(secs) if secs <= 0 => {
			return Err(Error::ValidationError("expiresIn must be positive".into()));
		}
		Some(secs) => Some(Timestamp::now().add_seconds(secs)),
		None => None,
	};

	let code = utils::invite_code();
	let invite = app
		.meta_adapter
		.create_invite(CreateInviteData {
			code: &code,
			node_id: access.node_id,
			max_uses,
			expires_at,
			created_by: auth.account_id,
		})
		.await?;

	Ok((StatusCode::CREATED, Json(ApiResponse::new(invite))))
}

/// POST /api/invites/{code}/redeem - Join the invite's community
pub async fn redeem_invite(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(code): Path<String>,
) -> ClResult<Json<ApiResponse<Membership>>> {
	let invite = app.meta_adapter.read_invite(&code).await?;
	let node = tree::read_visible_node(app.meta_adapter.as_ref(), invite.node_id, false).await?;

	let membership =
		app.meta_adapter.redeem_invite(&code, auth.account_id, Timestamp::now()).await?;
	info!(subject = %auth.account_id, community = %node.node_id, "Joined community via invite");

	Ok(Json(ApiResponse::new(membership)))
}

// vim: ts=4
