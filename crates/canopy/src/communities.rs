//! Community tree handlers

use axum::{
	Json,
	extract::{Path, State},
	http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::community::{CommunityNode, Permission};
use crate::meta_adapter::{CreateNodeData, UpdateNodeData};
use crate::prelude::*;
use crate::types::ApiResponse;
use canopy_core::{
	extract::{Auth, NodeAccess},
	resolver::Grant,
	roles, tree,
};

const MAX_NAME_LENGTH: usize = 100;

/// A community as returned to a caller. Callers with a limited grant do not
/// see where the community sits in the tree.
#[skip_serializing_none]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityView {
	pub id: NodeId,
	pub parent_id: Option<NodeId>,
	pub path: Option<Box<str>>,
	pub name: Box<str>,
	pub is_public: bool,
	pub is_active: bool,
	pub created_at: Timestamp,
	pub grant: Option<Grant>,
}

impl CommunityView {
	pub fn new(node: CommunityNode, grant: Option<Grant>) -> Self {
		let limited = grant.is_some_and(|g| g.is_limited());
		CommunityView {
			id: node.node_id,
			parent_id: if limited { None } else { node.parent_id },
			path: if limited { None } else { Some(node.path) },
			name: node.name,
			is_public: node.is_public,
			is_active: node.is_active,
			created_at: node.created_at,
			grant,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommunityRequest {
	pub name: String,
	#[serde(default = "default_public")]
	pub is_public: bool,
}

fn default_public() -> bool {
	true
}

fn validate_name(name: &str) -> ClResult<&str> {
	let name = name.trim();
	if name.is_empty() || name.chars().count() > MAX_NAME_LENGTH {
		return Err(Error::ValidationError(format!(
			"name must be 1 to {} characters",
			MAX_NAME_LENGTH
		)));
	}
	Ok(name)
}

/// POST /api/communities - Create a root community
pub async fn post_community(
	State(app): State<App>,
	Auth(auth): Auth,
	Json(req): Json<CreateCommunityRequest>,
) -> ClResult<(StatusCode, Json<ApiResponse<CommunityView>>)> {
	let name = validate_name(&req.name)?;

	let account = app.meta_adapter.read_account(auth.account_id).await.map_err(|err| match err {
		Error::NotFound => Error::PermissionDenied,
		err => err,
	})?;
	if !roles::classify(&account).is_bypass() {
		warn!(subject = %auth.account_id, "Root community creation denied");
		return Err(Error::PermissionDenied);
	}

	let node = app
		.meta_adapter
		.create_node(CreateNodeData { parent_id: None, name, is_public: req.is_public })
		.await?;
	info!(subject = %auth.account_id, community = %node.node_id, "Root community created");

	Ok((
		StatusCode::CREATED,
		Json(ApiResponse::new(CommunityView::new(node, Some(Grant::GlobalBypass)))),
	))
}

/// GET /api/communities/{communityId}
pub async fn get_community(
	State(app): State<App>,
	access: NodeAccess,
) -> ClResult<Json<ApiResponse<CommunityView>>> {
	let node = app.meta_adapter.read_node(access.node_id).await?;
	Ok(Json(ApiResponse::new(CommunityView::new(node, Some(access.grant)))))
}

/// PATCH /api/communities/{communityId}
pub async fn patch_community(
	State(app): State<App>,
	access: NodeAccess,
	Json(mut data): Json<UpdateNodeData>,
) -> ClResult<Json<ApiResponse<CommunityView>>> {
	if let Patch::Value(name) = &mut data.name {
		let trimmed = validate_name(name)?.to_string();
		*name = trimmed;
	}

	app.meta_adapter.update_node(access.node_id, &data).await?;
	let node = app.meta_adapter.read_node(access.node_id).await?;

	Ok(Json(ApiResponse::new(CommunityView::new(node, Some(access.grant)))))
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionVerdict {
	pub permission: Permission,
	pub allowed: bool,
	pub grant: Option<Grant>,
}

/// GET /api/communities/{communityId}/access - The caller's verdict for every permission
pub async fn get_access(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(community_id): Path<NodeId>,
) -> ClResult<Json<ApiResponse<Vec<PermissionVerdict>>>> {
	let node = match app.meta_adapter.read_node(community_id).await {
		Ok(node) => Some(node),
		Err(Error::NotFound) => None,
		Err(err) => return Err(err),
	};

	let verdicts = app
		.resolver
		.resolve_all(auth.account_id, community_id)
		.await?
		.into_iter()
		.map(|(permission, access)| {
			let access = match &node {
				Some(node) => tree::screen_inactive(node, access),
				None => access,
			};
			PermissionVerdict { permission, allowed: access.is_allowed(), grant: access.grant() }
		})
		.collect();

	Ok(Json(ApiResponse::new(verdicts)))
}

/// GET /api/communities/{communityId}/children - Children the caller can read
pub async fn list_children(
	State(app): State<App>,
	Auth(auth): Auth,
	access: NodeAccess,
) -> ClResult<Json<ApiResponse<Vec<CommunityView>>>> {
	let children = app.meta_adapter.list_children(access.node_id).await?;

	let mut visible = Vec::with_capacity(children.len());
	for child in children {
		let child_access =
			app.resolver.resolve(auth.account_id, child.node_id, Permission::Read).await?;
		if let Some(grant) = tree::screen_inactive(&child, child_access).grant() {
			visible.push(CommunityView::new(child, Some(grant)));
		}
	}

	Ok(Json(ApiResponse::new(visible)))
}

/// POST /api/communities/{communityId}/sub-communities
pub async fn post_sub_community(
	State(app): State<App>,
	Auth(auth): Auth,
	access: NodeAccess,
	Json(req): Json<CreateCommunityRequest>,
) -> ClResult<(StatusCode, Json<ApiResponse<CommunityView>>)> {
	let name = validate_name(&req.name)?;

	let node = app
		.meta_adapter
		.create_node(CreateNodeData {
			parent_id: Some(access.node_id),
			name,
			is_public: req.is_public,
		})
		.await?;
	info!(subject = %auth.account_id, community = %node.node_id, parent = %access.node_id, "Sub-community created");

	// Admin on the parent is ancestor admin on the new node
	let grant = match access.grant {
		Grant::NodeAdmin => Grant::AncestorAdmin,
		grant => grant,
	};
	Ok((StatusCode::CREATED, Json(ApiResponse::new(CommunityView::new(node, Some(grant))))))
}

/// DELETE /api/communities/{communityId}/sub-communities/{subCommunityId} - Deactivate
///
/// The sub-community may sit anywhere below `communityId`.
pub async fn delete_sub_community(
	State(app): State<App>,
	Auth(auth): Auth,
	Path((community_id, sub_community_id)): Path<(NodeId, NodeId)>,
) -> ClResult<StatusCode> {
	let community = app.meta_adapter.read_node(community_id).await?;
	let sub = app.meta_adapter.read_node(sub_community_id).await?;
	if sub.node_id == community.node_id || !tree::is_in_subtree(&sub, &community) {
		return Err(Error::NotFound);
	}

	let data = UpdateNodeData { is_active: Patch::Value(false), ..UpdateNodeData::default() };
	app.meta_adapter.update_node(sub_community_id, &data).await?;
	info!(subject = %auth.account_id, community = %sub_community_id, "Sub-community deactivated");

	Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReparentRequest {
	pub parent_id: Option<NodeId>,
}

/// PUT /api/communities/{communityId}/parent - Move a community
///
/// Needs admin on the community and on the new parent. Detaching into a root
/// community needs a bypass account.
pub async fn put_parent(
	State(app): State<App>,
	Auth(auth): Auth,
	access: NodeAccess,
	Json(req): Json<ReparentRequest>,
) -> ClResult<Json<ApiResponse<CommunityView>>> {
	match req.parent_id {
		Some(parent_id) => {
			let parent_access =
				app.resolver.resolve(auth.account_id, parent_id, Permission::Admin).await?;
			if !parent_access.is_allowed() {
				warn!(subject = %auth.account_id, community = %access.node_id, parent = %parent_id, "Reparent denied on target parent");
				return Err(Error::PermissionDenied);
			}
		}
		None if access.grant != Grant::GlobalBypass => {
			warn!(subject = %auth.account_id, community = %access.node_id, "Detaching to root denied");
			return Err(Error::PermissionDenied);
		}
		None => {}
	}

	app.meta_adapter.reparent_node(access.node_id, req.parent_id).await?;
	let node = app.meta_adapter.read_node(access.node_id).await?;

	Ok(Json(ApiResponse::new(CommunityView::new(node, Some(access.grant)))))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node() -> CommunityNode {
		CommunityNode {
			node_id: NodeId(9),
			parent_id: Some(NodeId(4)),
			path: "1/4/9".into(),
			name: "project".into(),
			is_public: true,
			is_active: true,
			created_at: Timestamp(0),
		}
	}

	#[test]
	fn test_limited_view_hides_position() {
		let view = serde_json::to_value(CommunityView::new(node(), Some(Grant::ParentMemberLimited)))
			.unwrap();
		assert!(view.get("path").is_none());
		assert!(view.get("parentId").is_none());
		assert_eq!(view["grant"], "parent_member_limited");

		let view =
			serde_json::to_value(CommunityView::new(node(), Some(Grant::DirectMember))).unwrap();
		assert_eq!(view["path"], "1/4/9");
		assert_eq!(view["parentId"], 4);
	}

	#[test]
	fn test_validate_name() {
		assert_eq!(validate_name("  team ").unwrap(), "team");
		assert!(validate_name("   ").is_err());
		assert!(validate_name(&"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
	}
}

// vim: ts=4
