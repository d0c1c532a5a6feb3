//! Store outages surface as errors, never as a denial

mod common;

use common::*;

use async_trait::async_trait;
use axum::{
	Router,
	body::Body,
	http::{Request, StatusCode, header},
	middleware,
	routing::get,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tower::ServiceExt;

use canopy_core::auth::require_auth;
use canopy_core::perm::check_perm_community;
use canopy_core::{App, AppBuilderOpts, AppState, NodeAccess};
use canopy_types::community::{
	Account, AssignmentKind, CommunityNode, GlobalRole, InviteCode, Membership, MembershipRole,
	MembershipStatus, NodeAdminAssignment, Permission,
};
use canopy_types::meta_adapter::{
	CreateAccountData, CreateInviteData, CreateNodeData, MetaAdapter, UpdateNodeData,
};
use canopy_types::prelude::*;

/// Delegates to a working store, failing node or membership reads on demand
#[derive(Debug)]
struct UnreliableAdapter {
	inner: Arc<dyn MetaAdapter>,
	fail_nodes: AtomicBool,
	fail_memberships: AtomicBool,
}

fn unavailable() -> Error {
	Error::ServiceUnavailable("database is locked".into())
}

#[async_trait]
impl MetaAdapter for UnreliableAdapter {
	async fn create_account(&self, data: CreateAccountData<'_>) -> ClResult<AccountId> {
		self.inner.create_account(data).await
	}

	async fn read_account(&self, account_id: AccountId) -> ClResult<Account> {
		self.inner.read_account(account_id).await
	}

	async fn update_account_role(&self, account_id: AccountId, role: GlobalRole) -> ClResult<()> {
		self.inner.update_account_role(account_id, role).await
	}

	async fn create_node(&self, data: CreateNodeData<'_>) -> ClResult<CommunityNode> {
		self.inner.create_node(data).await
	}

	async fn read_node(&self, node_id: NodeId) -> ClResult<CommunityNode> {
		if self.fail_nodes.load(Ordering::SeqCst) {
			return Err(unavailable());
		}
		self.inner.read_node(node_id).await
	}

	async fn read_nodes(&self, node_ids: &[NodeId]) -> ClResult<Vec<CommunityNode>> {
		self.inner.read_nodes(node_ids).await
	}

	async fn list_children(&self, node_id: NodeId) -> ClResult<Vec<CommunityNode>> {
		self.inner.list_children(node_id).await
	}

	async fn list_subtree(&self, node_id: NodeId) -> ClResult<Vec<CommunityNode>> {
		self.inner.list_subtree(node_id).await
	}

	async fn update_node(&self, node_id: NodeId, data: &UpdateNodeData) -> ClResult<()> {
		self.inner.update_node(node_id, data).await
	}

	async fn reparent_node(&self, node_id: NodeId, new_parent_id: Option<NodeId>) -> ClResult<()> {
		self.inner.reparent_node(node_id, new_parent_id).await
	}

	async fn create_membership(
		&self,
		account_id: AccountId,
		node_id: NodeId,
		role: MembershipRole,
		status: MembershipStatus,
	) -> ClResult<()> {
		self.inner.create_membership(account_id, node_id, role, status).await
	}

	async fn read_membership(
		&self,
		account_id: AccountId,
		node_id: NodeId,
	) -> ClResult<Option<Membership>> {
		self.inner.read_membership(account_id, node_id).await
	}

	async fn delete_membership(&self, account_id: AccountId, node_id: NodeId) -> ClResult<()> {
		self.inner.delete_membership(account_id, node_id).await
	}

	async fn list_memberships_in(
		&self,
		account_id: AccountId,
		node_ids: &[NodeId],
	) -> ClResult<Vec<Membership>> {
		if self.fail_memberships.load(Ordering::SeqCst) {
			return Err(unavailable());
		}
		self.inner.list_memberships_in(account_id, node_ids).await
	}

	async fn list_members(&self, node_id: NodeId) -> ClResult<Vec<Membership>> {
		self.inner.list_members(node_id).await
	}

	async fn create_assignment(
		&self,
		account_id: AccountId,
		node_id: NodeId,
		kind: AssignmentKind,
		granted_by: Option<AccountId>,
	) -> ClResult<()> {
		self.inner.create_assignment(account_id, node_id, kind, granted_by).await
	}

	async fn delete_assignment(
		&self,
		account_id: AccountId,
		node_id: NodeId,
		kind: AssignmentKind,
	) -> ClResult<()> {
		self.inner.delete_assignment(account_id, node_id, kind).await
	}

	async fn list_assignments_in(
		&self,
		account_id: AccountId,
		node_ids: &[NodeId],
	) -> ClResult<Vec<NodeAdminAssignment>> {
		self.inner.list_assignments_in(account_id, node_ids).await
	}

	async fn list_node_assignments(&self, node_id: NodeId) -> ClResult<Vec<NodeAdminAssignment>> {
		self.inner.list_node_assignments(node_id).await
	}

	async fn create_invite(&self, data: CreateInviteData<'_>) -> ClResult<InviteCode> {
		self.inner.create_invite(data).await
	}

	async fn read_invite(&self, code: &str) -> ClResult<InviteCode> {
		self.inner.read_invite(code).await
	}

	async fn redeem_invite(
		&self,
		code: &str,
		account_id: AccountId,
		now: Timestamp,
	) -> ClResult<Membership> {
		self.inner.redeem_invite(code, account_id, now).await
	}
}

struct Fixture {
	app: App,
	adapter: Arc<UnreliableAdapter>,
	member: AccountId,
	team: NodeId,
	_temp: tempfile::TempDir,
}

/// A member of a public team below a public root, served through the unreliable store
async fn fixture() -> Fixture {
	let (base, temp) = setup_app().await;
	let root = node(&base, None, "root", true).await;
	let team = node(&base, Some(root), "team", true).await;
	let member = account(&base, "member", GlobalRole::User).await;
	join(&base, member, team).await;

	let adapter = Arc::new(UnreliableAdapter {
		inner: base.meta_adapter.clone(),
		fail_nodes: AtomicBool::new(false),
		fail_memberships: AtomicBool::new(false),
	});
	let opts = AppBuilderOpts { jwt_secret: JWT_SECRET.into(), ..AppBuilderOpts::default() };
	let app = AppState::new(opts, adapter.clone());

	Fixture { app, adapter, member, team, _temp: temp }
}

async fn show_grant(access: NodeAccess) -> String {
	access.grant.to_string()
}

async fn get_status(app: &App, account_id: AccountId, node_id: NodeId) -> StatusCode {
	let router = Router::new()
		.route(
			"/communities/{communityId}",
			get(show_grant).route_layer(middleware::from_fn_with_state(
				app.clone(),
				check_perm_community(Permission::Read),
			)),
		)
		.layer(middleware::from_fn_with_state(app.clone(), require_auth))
		.with_state(app.clone());

	let req = Request::builder()
		.uri(format!("/communities/{}", node_id))
		.header(header::AUTHORIZATION, format!("Bearer {}", token(account_id)))
		.body(Body::empty())
		.expect("request");
	router.oneshot(req).await.expect("Router should respond").status()
}

#[tokio::test]
async fn test_healthy_store_allows() {
	let f = fixture().await;

	let access = f.app.resolver.resolve(f.member, f.team, Permission::Write).await;
	assert!(matches!(access, Ok(access) if access.is_allowed()));
	assert_eq!(get_status(&f.app, f.member, f.team).await, StatusCode::OK);
}

#[tokio::test]
async fn test_node_read_failure_is_unavailable() {
	let f = fixture().await;
	f.adapter.fail_nodes.store(true, Ordering::SeqCst);

	let res = f.app.resolver.resolve(f.member, f.team, Permission::Read).await;
	assert!(matches!(res, Err(Error::ServiceUnavailable(_))));
	assert!(matches!(
		f.app.resolver.resolve_all(f.member, f.team).await,
		Err(Error::ServiceUnavailable(_))
	));
	assert_eq!(get_status(&f.app, f.member, f.team).await, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_membership_failure_is_unavailable() {
	let f = fixture().await;
	f.adapter.fail_memberships.store(true, Ordering::SeqCst);

	let res = f.app.resolver.resolve(f.member, f.team, Permission::Write).await;
	assert!(matches!(res, Err(Error::ServiceUnavailable(_))));
	assert_eq!(get_status(&f.app, f.member, f.team).await, StatusCode::SERVICE_UNAVAILABLE);
}

// vim: ts=4
