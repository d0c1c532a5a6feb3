use axum::{
	Router, middleware,
	routing::{delete, get, patch, post, put},
};
use tower_http::trace::TraceLayer;

use crate::App;
use crate::admin;
use crate::communities;
use crate::community::Permission;
use crate::invite;
use crate::member;
use canopy_core::auth::require_auth;
use canopy_core::perm::{check_perm_community, check_perm_payload, check_perm_sub_community};

pub fn init(app: App) -> Router {
	let community_router = Router::new()
		.route("/api/communities", post(communities::post_community))
		.route(
			"/api/communities/{communityId}",
			get(communities::get_community).route_layer(middleware::from_fn_with_state(
				app.clone(),
				check_perm_community(Permission::Read),
			)),
		)
		.route(
			"/api/communities/{communityId}",
			patch(communities::patch_community).route_layer(middleware::from_fn_with_state(
				app.clone(),
				check_perm_community(Permission::Admin),
			)),
		)
		.route("/api/communities/{communityId}/access", get(communities::get_access))
		.route(
			"/api/communities/{communityId}/children",
			get(communities::list_children).route_layer(middleware::from_fn_with_state(
				app.clone(),
				check_perm_community(Permission::Read),
			)),
		)
		.route(
			"/api/communities/{communityId}/sub-communities",
			post(communities::post_sub_community).route_layer(middleware::from_fn_with_state(
				app.clone(),
				check_perm_community(Permission::Admin),
			)),
		)
		.route(
			"/api/communities/{communityId}/sub-communities/{subCommunityId}",
			delete(communities::delete_sub_community).route_layer(
				middleware::from_fn_with_state(
					app.clone(),
					check_perm_sub_community(Permission::Admin),
				),
			),
		)
		.route(
			"/api/communities/{communityId}/parent",
			put(communities::put_parent).route_layer(middleware::from_fn_with_state(
				app.clone(),
				check_perm_community(Permission::Admin),
			)),
		);

	let member_router = Router::new()
		.route(
			"/api/communities/{communityId}/members",
			get(member::list_members).route_layer(middleware::from_fn_with_state(
				app.clone(),
				check_perm_community(Permission::Read),
			)),
		)
		.route("/api/communities/{communityId}/members/me", delete(member::leave_community))
		.route(
			"/api/communities/{communityId}/members/{accountId}",
			delete(member::remove_member).route_layer(middleware::from_fn_with_state(
				app.clone(),
				check_perm_community(Permission::Moderate),
			)),
		)
		.route(
			"/api/communities/{communityId}/admins",
			get(admin::list_admins).route_layer(middleware::from_fn_with_state(
				app.clone(),
				check_perm_community(Permission::Admin),
			)),
		)
		.route(
			"/api/communities/{communityId}/admins/{accountId}",
			put(admin::put_admin).delete(admin::delete_admin).route_layer(
				middleware::from_fn_with_state(
					app.clone(),
					check_perm_community(Permission::Admin),
				),
			),
		);

	let invite_router = Router::new()
		.route(
			"/api/invites",
			post(invite::post_invite).route_layer(middleware::from_fn_with_state(
				app.clone(),
				check_perm_payload("communityId", Permission::Invite),
			)),
		)
		.route("/api/invites/{code}/redeem", post(invite::redeem_invite));

	Router::new()
		.merge(community_router)
		.merge(member_router)
		.merge(invite_router)
		.layer(middleware::from_fn_with_state(app.clone(), require_auth))
		.layer(TraceLayer::new_for_http())
		.with_state(app)
}

// vim: ts=4
