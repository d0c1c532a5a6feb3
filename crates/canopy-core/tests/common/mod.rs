//! Common test utilities and fixtures
//!
//! Builds an app backed by a temporary SQLite metadata store and offers
//! shortcuts for creating accounts, community trees, memberships and tokens.

#![allow(dead_code)]

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use std::sync::Arc;
use tempfile::TempDir;

use canopy_core::auth::AccessClaims;
use canopy_core::{App, AppBuilderOpts, AppState};
use canopy_meta_adapter_sqlite::MetaAdapterSqlite;
use canopy_types::community::{AssignmentKind, GlobalRole, MembershipRole, MembershipStatus};
use canopy_types::meta_adapter::{CreateAccountData, CreateNodeData, UpdateNodeData};
use canopy_types::types::{AccountId, NodeId, Patch, Timestamp};

pub const JWT_SECRET: &str = "test-secret";

pub async fn setup_app() -> (App, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter =
		MetaAdapterSqlite::new(temp_dir.path()).await.expect("Failed to create adapter");

	let opts = AppBuilderOpts { jwt_secret: JWT_SECRET.into(), ..AppBuilderOpts::default() };
	(AppState::new(opts, Arc::new(adapter)), temp_dir)
}

pub async fn account(app: &App, id_tag: &str, role: GlobalRole) -> AccountId {
	app.meta_adapter
		.create_account(CreateAccountData { id_tag, name: id_tag, role })
		.await
		.expect("Should create account")
}

pub async fn node(app: &App, parent_id: Option<NodeId>, name: &str, is_public: bool) -> NodeId {
	app.meta_adapter
		.create_node(CreateNodeData { parent_id, name, is_public })
		.await
		.expect("Should create node")
		.node_id
}

pub async fn join(app: &App, account_id: AccountId, node_id: NodeId) {
	app.meta_adapter
		.create_membership(account_id, node_id, MembershipRole::Member, MembershipStatus::Active)
		.await
		.expect("Should join");
}

pub async fn assign(app: &App, account_id: AccountId, node_id: NodeId, kind: AssignmentKind) {
	app.meta_adapter
		.create_assignment(account_id, node_id, kind, None)
		.await
		.expect("Should assign");
}

pub async fn deactivate(app: &App, node_id: NodeId) {
	let data = UpdateNodeData { is_active: Patch::Value(false), ..UpdateNodeData::default() };
	app.meta_adapter.update_node(node_id, &data).await.expect("Should deactivate");
}

pub fn token(account_id: AccountId) -> String {
	let exp = u64::try_from(Timestamp::now().add_seconds(3600).0).expect("positive timestamp");
	encode(
		&Header::new(Algorithm::HS256),
		&AccessClaims { sub: account_id.to_string(), exp },
		&EncodingKey::from_secret(JWT_SECRET.as_bytes()),
	)
	.expect("Should encode token")
}

// vim: ts=4
