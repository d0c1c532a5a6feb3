//! Hierarchical permission resolver
//!
//! `resolve(account, node, permission)` answers allow or deny. The first
//! matching rule wins:
//!
//! 1. global bypass (developer, super admin)
//! 2. an eligible admin assignment on the node itself
//! 3. an eligible admin assignment on any ancestor of the node
//! 4. per-permission rules:
//!    - `read`: the node and all its ancestors are public, or the account is a
//!      direct member, or the node is public and the account is a member of an
//!      ancestor with no private node in between
//!    - `write`: direct member only
//!    - `moderate`, `admin`, `invite`: nothing beyond rules 2 and 3
//! 5. deny
//!
//! A missing account or node denies. Transient store failures are returned as
//! errors. Node activity is not considered here: callers hide inactive nodes
//! from anyone without a privileged grant (`tree::screen_inactive`).
//!
//! Loading and deciding are split: `load_facts` performs a fixed number of
//! batched lookups, `decide` is a pure function over the loaded facts.

use serde::Serialize;
use std::sync::Arc;

use canopy_types::community::{CommunityNode, Permission};
use canopy_types::meta_adapter::MetaAdapter;

use crate::membership;
use crate::prelude::*;
use crate::roles::{self, PrivilegeTier};
use crate::tree;

// Grant //
//*******//
/// The rule that allowed an access
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grant {
	GlobalBypass,
	NodeAdmin,
	AncestorAdmin,
	DirectMember,
	PublicNode,
	/// Read on a public node allowed only through membership of an ancestor
	ParentMemberLimited,
}

impl Grant {
	pub fn as_str(&self) -> &'static str {
		match self {
			Grant::GlobalBypass => "global_bypass",
			Grant::NodeAdmin => "node_admin",
			Grant::AncestorAdmin => "ancestor_admin",
			Grant::DirectMember => "direct_member",
			Grant::PublicNode => "public_node",
			Grant::ParentMemberLimited => "parent_member_limited",
		}
	}

	/// Limited grants see a redacted view of the node
	pub fn is_limited(&self) -> bool {
		*self == Grant::ParentMemberLimited
	}

	/// Grants that can see and manage inactive nodes
	pub fn is_privileged(&self) -> bool {
		matches!(self, Grant::GlobalBypass | Grant::NodeAdmin | Grant::AncestorAdmin)
	}
}

impl std::fmt::Display for Grant {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

// Access //
//********//
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
	Allow(Grant),
	Deny,
}

impl Access {
	pub fn is_allowed(&self) -> bool {
		matches!(self, Access::Allow(_))
	}

	pub fn grant(&self) -> Option<Grant> {
		match self {
			Access::Allow(grant) => Some(*grant),
			Access::Deny => None,
		}
	}
}

// AccessFacts //
//*************//
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AncestorFacts {
	pub node_id: NodeId,
	pub is_public: bool,
	/// Active membership of the account on this ancestor
	pub is_member: bool,
}

/// What the resolver knows about one (account, node) pair
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessFacts {
	pub tier: PrivilegeTier,
	pub node_id: NodeId,
	pub node_public: bool,
	/// Ancestors root first; `None` if the node's path is corrupt
	pub ancestors: Option<Vec<AncestorFacts>>,
	pub admin_on_node: bool,
	pub admin_on_ancestor: bool,
	pub direct_member: bool,
}

impl AccessFacts {
	/// Facts for a node whose relations were not loaded
	fn bare(tier: PrivilegeTier, node: &CommunityNode) -> Self {
		AccessFacts {
			tier,
			node_id: node.node_id,
			node_public: node.is_public,
			ancestors: Some(Vec::new()),
			admin_on_node: false,
			admin_on_ancestor: false,
			direct_member: false,
		}
	}
}

/// Pure precedence evaluation
pub fn decide(facts: &AccessFacts, permission: Permission) -> Access {
	if facts.tier.is_bypass() {
		return Access::Allow(Grant::GlobalBypass);
	}
	if facts.admin_on_node {
		return Access::Allow(Grant::NodeAdmin);
	}
	if facts.admin_on_ancestor {
		return Access::Allow(Grant::AncestorAdmin);
	}

	match permission {
		Permission::Read => decide_read(facts),
		Permission::Write if facts.direct_member => Access::Allow(Grant::DirectMember),
		Permission::Write | Permission::Moderate | Permission::Admin | Permission::Invite => {
			Access::Deny
		}
	}
}

fn decide_read(facts: &AccessFacts) -> Access {
	if facts.direct_member {
		return Access::Allow(Grant::DirectMember);
	}
	if !facts.node_public {
		return Access::Deny;
	}
	let Some(ancestors) = &facts.ancestors else {
		// Unknown ancestry: only direct membership counts
		return Access::Deny;
	};

	if ancestors.iter().all(|a| a.is_public) {
		return Access::Allow(Grant::PublicNode);
	}

	// Walk upwards; a private node ends the leak for everything above it
	for ancestor in ancestors.iter().rev() {
		if ancestor.is_member {
			return Access::Allow(Grant::ParentMemberLimited);
		}
		if !ancestor.is_public {
			break;
		}
	}
	Access::Deny
}

/// NotFound becomes `None`, everything else passes through
fn found<T>(res: ClResult<T>) -> ClResult<Option<T>> {
	match res {
		Ok(value) => Ok(Some(value)),
		Err(Error::NotFound) => Ok(None),
		Err(err) => Err(err),
	}
}

// PermissionResolver //
//********************//
#[derive(Clone)]
pub struct PermissionResolver {
	meta: Arc<dyn MetaAdapter>,
}

impl PermissionResolver {
	pub fn new(meta: Arc<dyn MetaAdapter>) -> Self {
		Self { meta }
	}

	/// Decide whether `account_id` holds `permission` on `node_id`
	pub async fn resolve(
		&self,
		account_id: AccountId,
		node_id: NodeId,
		permission: Permission,
	) -> ClResult<Access> {
		let Some(facts) = self.load_facts(account_id, node_id).await? else {
			debug!(subject = %account_id, community = %node_id, permission = %permission, "Account or community not found, denying");
			return Ok(Access::Deny);
		};

		let access = decide(&facts, permission);
		debug!(
			subject = %account_id,
			community = %node_id,
			permission = %permission,
			grant = ?access.grant(),
			"Permission resolved"
		);
		Ok(access)
	}

	/// The verdict for every permission tier, in `Permission::ALL` order
	pub async fn resolve_all(
		&self,
		account_id: AccountId,
		node_id: NodeId,
	) -> ClResult<Vec<(Permission, Access)>> {
		let facts = self.load_facts(account_id, node_id).await?;

		Ok(Permission::ALL
			.iter()
			.map(|perm| (*perm, facts.as_ref().map_or(Access::Deny, |f| decide(f, *perm))))
			.collect())
	}

	/// Load the facts for one (account, node) pair.
	///
	/// Returns `None` if the account or the node does not exist.
	pub async fn load_facts(
		&self,
		account_id: AccountId,
		node_id: NodeId,
	) -> ClResult<Option<AccessFacts>> {
		let Some(account) = found(self.meta.read_account(account_id).await)? else {
			return Ok(None);
		};
		let Some(node) = found(self.meta.read_node(node_id).await)? else {
			return Ok(None);
		};

		let tier = roles::classify(&account);
		if tier.is_bypass() {
			return Ok(Some(AccessFacts::bare(tier, &node)));
		}

		let ancestor_ids = tree::ancestor_ids(&node);
		let ancestor_slice = ancestor_ids.as_deref().unwrap_or_default();
		let mut scope: Vec<NodeId> = ancestor_slice.to_vec();
		scope.push(node.node_id);

		let (assignments, member_of, ancestor_nodes) = tokio::try_join!(
			self.meta.list_assignments_in(account_id, &scope),
			membership::active_memberships_in(self.meta.as_ref(), account_id, &scope),
			self.meta.read_nodes(ancestor_slice),
		)?;

		let mut admin_on_node = false;
		let mut admin_on_ancestor = false;
		for assignment in assignments.iter().filter(|a| tier.is_eligible_for(a.kind)) {
			if assignment.node_id == node.node_id {
				admin_on_node = true;
			} else {
				admin_on_ancestor = true;
			}
		}

		let ancestors = ancestor_ids.map(|ids| {
			ids.into_iter()
				.map(|id| {
					let is_public = match ancestor_nodes.iter().find(|n| n.node_id == id) {
						Some(ancestor) => ancestor.is_public,
						None => {
							warn!(community = %node.node_id, ancestor = %id, "Ancestor in path does not exist");
							false
						}
					};
					AncestorFacts { node_id: id, is_public, is_member: member_of.contains(&id) }
				})
				.collect()
		});

		Ok(Some(AccessFacts {
			tier,
			node_id: node.node_id,
			node_public: node.is_public,
			ancestors,
			admin_on_node,
			admin_on_ancestor,
			direct_member: member_of.contains(&node.node_id),
		}))
	}
}

impl std::fmt::Debug for PermissionResolver {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PermissionResolver").finish_non_exhaustive()
	}
}


// vim: ts=4
