//! SQLite implementation of the Canopy metadata adapter.
//!
//! One database file (`meta.db`) holds accounts, the community tree with its
//! materialized paths, memberships, admin assignments and invite codes.

#![forbid(unsafe_code)]

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::path::Path;
use std::time::Duration;

use canopy::community::{
	Account, AssignmentKind, CommunityNode, GlobalRole, InviteCode, Membership, MembershipRole,
	MembershipStatus, NodeAdminAssignment,
};
use canopy::meta_adapter::{
	self, CreateAccountData, CreateInviteData, CreateNodeData, UpdateNodeData,
};
use canopy::prelude::*;

mod account;
mod invite;
mod membership;
mod node;
mod schema;
mod utils;

const DB_FILE: &str = "meta.db";

#[derive(Debug)]
pub struct MetaAdapterSqlite {
	db: SqlitePool,
}

impl MetaAdapterSqlite {
	/// Open (or create) the metadata database inside `dir`
	pub async fn new(dir: impl AsRef<Path>) -> ClResult<Self> {
		tokio::fs::create_dir_all(dir.as_ref()).await?;

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(dir.as_ref().join(DB_FILE))
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal)
			.busy_timeout(Duration::from_secs(5));
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		schema::init_db(&db)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		Ok(Self { db })
	}
}

#[async_trait]
impl meta_adapter::MetaAdapter for MetaAdapterSqlite {
	// Accounts
	//**********
	async fn create_account(&self, data: CreateAccountData<'_>) -> ClResult<AccountId> {
		account::create(&self.db, data).await
	}

	async fn read_account(&self, account_id: AccountId) -> ClResult<Account> {
		account::read(&self.db, account_id).await
	}

	async fn update_account_role(&self, account_id: AccountId, role: GlobalRole) -> ClResult<()> {
		account::update_role(&self.db, account_id, role).await
	}

	// Community tree
	//****************
	async fn create_node(&self, data: CreateNodeData<'_>) -> ClResult<CommunityNode> {
		node::create(&self.db, data).await
	}

	async fn read_node(&self, node_id: NodeId) -> ClResult<CommunityNode> {
		node::read(&self.db, node_id).await
	}

	async fn read_nodes(&self, node_ids: &[NodeId]) -> ClResult<Vec<CommunityNode>> {
		node::read_many(&self.db, node_ids).await
	}

	async fn list_children(&self, node_id: NodeId) -> ClResult<Vec<CommunityNode>> {
		node::list_children(&self.db, node_id).await
	}

	async fn list_subtree(&self, node_id: NodeId) -> ClResult<Vec<CommunityNode>> {
		node::list_subtree(&self.db, node_id).await
	}

	async fn update_node(&self, node_id: NodeId, data: &UpdateNodeData) -> ClResult<()> {
		node::update(&self.db, node_id, data).await
	}

	async fn reparent_node(&self, node_id: NodeId, new_parent_id: Option<NodeId>) -> ClResult<()> {
		node::reparent(&self.db, node_id, new_parent_id).await
	}

	// Memberships
	//*************
	async fn create_membership(
		&self,
		account_id: AccountId,
		node_id: NodeId,
		role: MembershipRole,
		status: MembershipStatus,
	) -> ClResult<()> {
		membership::create(&self.db, account_id, node_id, role, status).await
	}

	async fn read_membership(
		&self,
		account_id: AccountId,
		node_id: NodeId,
	) -> ClResult<Option<Membership>> {
		membership::read(&self.db, account_id, node_id).await
	}

	async fn delete_membership(&self, account_id: AccountId, node_id: NodeId) -> ClResult<()> {
		membership::delete(&self.db, account_id, node_id).await
	}

	async fn list_memberships_in(
		&self,
		account_id: AccountId,
		node_ids: &[NodeId],
	) -> ClResult<Vec<Membership>> {
		membership::list_in(&self.db, account_id, node_ids).await
	}

	async fn list_members(&self, node_id: NodeId) -> ClResult<Vec<Membership>> {
		membership::list_members(&self.db, node_id).await
	}

	// Admin assignments
	//*******************
	async fn create_assignment(
		&self,
		account_id: AccountId,
		node_id: NodeId,
		kind: AssignmentKind,
		granted_by: Option<AccountId>,
	) -> ClResult<()> {
		membership::create_assignment(&self.db, account_id, node_id, kind, granted_by).await
	}

	async fn delete_assignment(
		&self,
		account_id: AccountId,
		node_id: NodeId,
		kind: AssignmentKind,
	) -> ClResult<()> {
		membership::delete_assignment(&self.db, account_id, node_id, kind).await
	}

	async fn list_assignments_in(
		&self,
		account_id: AccountId,
		node_ids: &[NodeId],
	) -> ClResult<Vec<NodeAdminAssignment>> {
		membership::list_assignments_in(&self.db, account_id, node_ids).await
	}

	async fn list_node_assignments(&self, node_id: NodeId) -> ClResult<Vec<NodeAdminAssignment>> {
		membership::list_node_assignments(&self.db, node_id).await
	}

	// Invite codes
	//**************
	async fn create_invite(&self, data: CreateInviteData<'_>) -> ClResult<InviteCode> {
		invite::create(&self.db, data).await
	}

	async fn read_invite(&self, code: &str) -> ClResult<InviteCode> {
		invite::read(&self.db, code).await
	}

	async fn redeem_invite(
		&self,
		code: &str,
		account_id: AccountId,
		now: Timestamp,
	) -> ClResult<Membership> {
		invite::redeem(&self.db, code, account_id, now).await
	}
}

// vim: ts=4
