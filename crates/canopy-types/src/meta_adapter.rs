//! Adapter that stores community tree metadata: accounts, nodes, memberships,
//! admin assignments and invite codes.
//!
//! Error contract for implementations:
//! - a missing record is `Error::NotFound`
//! - a transient failure (busy database, pool timeout, I/O) is
//!   `Error::ServiceUnavailable`, so callers can tell it apart from a denial
//! - anything else is `Error::DbError`

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Debug;

use crate::community::{
	Account, AssignmentKind, CommunityNode, GlobalRole, InviteCode, Membership, MembershipRole,
	MembershipStatus, NodeAdminAssignment,
};
use crate::prelude::*;

pub struct CreateAccountData<'a> {
	pub id_tag: &'a str,
	pub name: &'a str,
	pub role: GlobalRole,
}

pub struct CreateNodeData<'a> {
	pub parent_id: Option<NodeId>,
	pub name: &'a str,
	pub is_public: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNodeData {
	#[serde(default)]
	pub name: Patch<String>,
	#[serde(default)]
	pub is_public: Patch<bool>,
	#[serde(default)]
	pub is_active: Patch<bool>,
}

pub struct CreateInviteData<'a> {
	pub code: &'a str,
	pub node_id: NodeId,
	pub max_uses: u32,
	pub expires_at: Option<Timestamp>,
	pub created_by: AccountId,
}

#[async_trait]
pub trait MetaAdapter: Debug + Send + Sync {
	// Accounts
	//**********
	async fn create_account(&self, data: CreateAccountData<'_>) -> ClResult<AccountId>;
	async fn read_account(&self, account_id: AccountId) -> ClResult<Account>;
	async fn update_account_role(&self, account_id: AccountId, role: GlobalRole) -> ClResult<()>;

	// Community tree
	//****************
	/// Creates a node; its materialized path is computed in the same transaction.
	async fn create_node(&self, data: CreateNodeData<'_>) -> ClResult<CommunityNode>;
	/// Reads a node regardless of its active flag
	async fn read_node(&self, node_id: NodeId) -> ClResult<CommunityNode>;
	/// Batch read; ids with no record are silently skipped
	async fn read_nodes(&self, node_ids: &[NodeId]) -> ClResult<Vec<CommunityNode>>;
	async fn list_children(&self, node_id: NodeId) -> ClResult<Vec<CommunityNode>>;
	/// The node and every descendant, shallowest first
	async fn list_subtree(&self, node_id: NodeId) -> ClResult<Vec<CommunityNode>>;
	async fn update_node(&self, node_id: NodeId, data: &UpdateNodeData) -> ClResult<()>;
	/// Moves a node under a new parent (`None` makes it a root) and rewrites
	/// the paths of the whole subtree atomically.
	async fn reparent_node(&self, node_id: NodeId, new_parent_id: Option<NodeId>) -> ClResult<()>;

	// Memberships
	//*************
	async fn create_membership(
		&self,
		account_id: AccountId,
		node_id: NodeId,
		role: MembershipRole,
		status: MembershipStatus,
	) -> ClResult<()>;
	async fn read_membership(
		&self,
		account_id: AccountId,
		node_id: NodeId,
	) -> ClResult<Option<Membership>>;
	async fn delete_membership(&self, account_id: AccountId, node_id: NodeId) -> ClResult<()>;
	/// Memberships of `account_id` on any of `node_ids`
	async fn list_memberships_in(
		&self,
		account_id: AccountId,
		node_ids: &[NodeId],
	) -> ClResult<Vec<Membership>>;
	async fn list_members(&self, node_id: NodeId) -> ClResult<Vec<Membership>>;

	// Admin assignments
	//*******************
	async fn create_assignment(
		&self,
		account_id: AccountId,
		node_id: NodeId,
		kind: AssignmentKind,
		granted_by: Option<AccountId>,
	) -> ClResult<()>;
	async fn delete_assignment(
		&self,
		account_id: AccountId,
		node_id: NodeId,
		kind: AssignmentKind,
	) -> ClResult<()>;
	/// Assignments held by `account_id` on any of `node_ids`
	async fn list_assignments_in(
		&self,
		account_id: AccountId,
		node_ids: &[NodeId],
	) -> ClResult<Vec<NodeAdminAssignment>>;
	async fn list_node_assignments(&self, node_id: NodeId) -> ClResult<Vec<NodeAdminAssignment>>;

	// Invite codes
	//**************
	async fn create_invite(&self, data: CreateInviteData<'_>) -> ClResult<InviteCode>;
	async fn read_invite(&self, code: &str) -> ClResult<InviteCode>;
	/// Consumes one use of the code and stores an active membership for
	/// `account_id` on the invite's node, atomically.
	///
	/// An expired or used up code is `Error::NotFound`, an active member gets
	/// `Error::Conflict` and a banned one `Error::PermissionDenied`. Nothing
	/// is consumed on error.
	async fn redeem_invite(
		&self,
		code: &str,
		account_id: AccountId,
		now: Timestamp,
	) -> ClResult<Membership>;
}

// vim: ts=4
