//! Membership checks
//!
//! `is_direct_member` and `is_ancestor_member` answer for a single
//! (account, node) pair. The resolver loads a whole ancestor chain at once
//! through `active_memberships_in`, which applies the same activity rule.

use std::collections::HashSet;

use canopy_types::meta_adapter::MetaAdapter;

use crate::prelude::*;

/// True if the account holds an active membership on exactly `node_id`
pub async fn is_direct_member(
	meta: &dyn MetaAdapter,
	account_id: AccountId,
	node_id: NodeId,
) -> ClResult<bool> {
	Ok(meta.read_membership(account_id, node_id).await?.is_some_and(|m| m.is_active()))
}

/// Same lookup as `is_direct_member`, asked about an ancestor of the node
/// being resolved
pub async fn is_ancestor_member(
	meta: &dyn MetaAdapter,
	account_id: AccountId,
	ancestor_id: NodeId,
) -> ClResult<bool> {
	is_direct_member(meta, account_id, ancestor_id).await
}

/// The nodes of `scope` the account is an active member of, in one query
pub async fn active_memberships_in(
	meta: &dyn MetaAdapter,
	account_id: AccountId,
	scope: &[NodeId],
) -> ClResult<HashSet<NodeId>> {
	let memberships = meta.list_memberships_in(account_id, scope).await?;
	Ok(memberships.iter().filter(|m| m.is_active()).map(|m| m.node_id).collect())
}

// vim: ts=4
