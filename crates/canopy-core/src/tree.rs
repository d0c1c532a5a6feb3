//! Community tree helpers on top of the metadata adapter

use canopy_types::community::CommunityNode;
use canopy_types::meta_adapter::MetaAdapter;

use crate::prelude::*;
use crate::resolver::Access;

/// Ancestor ids of a node, root first.
///
/// A path that cannot be parsed, or that disagrees with the parent pointer,
/// is an integrity fault: it is logged and yields `None`, and callers must
/// then treat the node as having no trustworthy ancestry.
pub fn ancestor_ids(node: &CommunityNode) -> Option<Vec<NodeId>> {
	match node.ancestor_ids() {
		Ok(ids) => Some(ids),
		Err(err) => {
			warn!(community = %node.node_id, path = %node.path, error = %err, "Corrupt materialized path");
			None
		}
	}
}

/// Read a node as seen by a caller. Inactive nodes are not found unless the
/// caller is privileged.
pub async fn read_visible_node(
	meta: &dyn MetaAdapter,
	node_id: NodeId,
	privileged: bool,
) -> ClResult<CommunityNode> {
	let node = meta.read_node(node_id).await?;
	if !privileged && !node.is_accessible() {
		debug!(community = %node_id, "Inactive community hidden");
		return Err(Error::NotFound);
	}
	Ok(node)
}

/// Deny access to an inactive node unless the grant is privileged
pub fn screen_inactive(node: &CommunityNode, access: Access) -> Access {
	match access {
		Access::Allow(grant) if !node.is_accessible() && !grant.is_privileged() => Access::Deny,
		access => access,
	}
}

/// True if `node` lies in the subtree rooted at `root` (inclusive)
pub fn is_in_subtree(node: &CommunityNode, root: &CommunityNode) -> bool {
	canopy_types::tree::is_within(&node.path, &root.path)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: u32, parent: Option<u32>, path: &str) -> CommunityNode {
		CommunityNode {
			node_id: NodeId(id),
			parent_id: parent.map(NodeId),
			path: path.into(),
			name: "n".into(),
			is_public: true,
			is_active: true,
			created_at: Timestamp(0),
		}
	}

	#[test]
	fn test_ancestor_ids() {
		assert_eq!(ancestor_ids(&node(3, Some(2), "1/2/3")), Some(vec![NodeId(1), NodeId(2)]));
		assert_eq!(ancestor_ids(&node(1, None, "1")), Some(vec![]));
		assert_eq!(ancestor_ids(&node(3, Some(2), "1/x/3")), None);
		assert_eq!(ancestor_ids(&node(3, Some(2), "")), None);
	}

	#[test]
	fn test_screen_inactive() {
		use crate::resolver::Grant;

		let mut n = node(2, Some(1), "1/2");
		let member = Access::Allow(Grant::DirectMember);
		let admin = Access::Allow(Grant::AncestorAdmin);
		assert_eq!(screen_inactive(&n, member), member);

		n.is_active = false;
		assert_eq!(screen_inactive(&n, member), Access::Deny);
		assert_eq!(screen_inactive(&n, Access::Allow(Grant::PublicNode)), Access::Deny);
		assert_eq!(screen_inactive(&n, admin), admin);
		assert_eq!(screen_inactive(&n, Access::Deny), Access::Deny);
	}

	#[test]
	fn test_is_in_subtree() {
		let root = node(1, None, "1");
		let child = node(12, Some(1), "1/12");
		let lookalike = node(10, None, "10");
		assert!(is_in_subtree(&child, &root));
		assert!(is_in_subtree(&root, &root));
		assert!(!is_in_subtree(&lookalike, &root));
		assert!(!is_in_subtree(&root, &child));
	}
}

// vim: ts=4
