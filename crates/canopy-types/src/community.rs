//! Community tree records: accounts, nodes, memberships, admin assignments
//! and invite codes.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::prelude::*;
use crate::tree::{self, PathError};

// Permission //
//************//
/// Permission tier requested on a community node
///
/// Tiers are evaluated independently, not as a total order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
	Read,
	Write,
	Moderate,
	Admin,
	Invite,
}

impl Permission {
	pub const ALL: [Permission; 5] = [
		Permission::Read,
		Permission::Write,
		Permission::Moderate,
		Permission::Admin,
		Permission::Invite,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			Permission::Read => "read",
			Permission::Write => "write",
			Permission::Moderate => "moderate",
			Permission::Admin => "admin",
			Permission::Invite => "invite",
		}
	}
}

impl std::fmt::Display for Permission {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for Permission {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"read" => Ok(Permission::Read),
			"write" => Ok(Permission::Write),
			"moderate" => Ok(Permission::Moderate),
			"admin" => Ok(Permission::Admin),
			"invite" => Ok(Permission::Invite),
			_ => Err(Error::ValidationError(format!("unknown permission '{}'", s))),
		}
	}
}

// GlobalRole //
//************//
/// Account-wide role. Raw stored values are mapped into this enum by the
/// role classifier only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalRole {
	User,
	SubCommunityAdmin,
	CommunityAdmin,
	Developer,
	SuperAdmin,
}

impl GlobalRole {
	/// Value written to the store
	pub fn as_str(&self) -> &'static str {
		match self {
			GlobalRole::User => "user",
			GlobalRole::SubCommunityAdmin => "sub_community_admin",
			GlobalRole::CommunityAdmin => "community_admin",
			GlobalRole::Developer => "developer",
			GlobalRole::SuperAdmin => "super_admin",
		}
	}
}

// Account //
//*********//
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
	#[serde(rename = "id")]
	pub account_id: AccountId,
	pub id_tag: Box<str>,
	pub name: Box<str>,
	/// Raw stored global role, see the role classifier
	pub role: Box<str>,
	pub created_at: Timestamp,
}

// CommunityNode //
//***************//
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityNode {
	#[serde(rename = "id")]
	pub node_id: NodeId,
	pub parent_id: Option<NodeId>,
	/// Materialized path, root first, inclusive of this node
	pub path: Box<str>,
	pub name: Box<str>,
	pub is_public: bool,
	pub is_active: bool,
	pub created_at: Timestamp,
}

impl CommunityNode {
	pub fn is_root(&self) -> bool {
		self.parent_id.is_none()
	}

	/// Inactive (soft-deleted) nodes are hidden from non-privileged callers.
	pub fn is_accessible(&self) -> bool {
		self.is_active
	}

	/// Ancestor ids, root first, parsed from the materialized path
	pub fn ancestor_ids(&self) -> Result<Vec<NodeId>, PathError> {
		let ancestors = tree::ancestor_ids(self.node_id, &self.path)?;
		if ancestors.last() != self.parent_id.as_ref() {
			// Parent pointer and path disagree: the path is stale
			return match (ancestors.last(), self.parent_id) {
				(Some(found), Some(expected)) => {
					Err(PathError::SelfMismatch { expected, found: *found })
				}
				_ => Err(PathError::Empty),
			};
		}
		Ok(ancestors)
	}
}

// Membership //
//************//
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipRole {
	Member,
	Admin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
	Active,
	Pending,
	Banned,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
	pub account_id: AccountId,
	pub node_id: NodeId,
	pub role: MembershipRole,
	pub status: MembershipStatus,
	pub created_at: Timestamp,
}

impl Membership {
	/// Only active memberships grant anything
	pub fn is_active(&self) -> bool {
		self.status == MembershipStatus::Active
	}
}

// NodeAdminAssignment //
//*********************//
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentKind {
	SubCommunityAdmin,
	CommunityAdmin,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAdminAssignment {
	pub account_id: AccountId,
	pub node_id: NodeId,
	pub kind: AssignmentKind,
	pub granted_by: Option<AccountId>,
	pub created_at: Timestamp,
}

// InviteCode //
//************//
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteCode {
	pub code: Box<str>,
	pub node_id: NodeId,
	pub max_uses: u32,
	pub used_count: u32,
	pub expires_at: Option<Timestamp>,
	pub created_by: AccountId,
	pub created_at: Timestamp,
}

impl InviteCode {
	pub fn is_usable(&self, now: Timestamp) -> bool {
		self.used_count < self.max_uses && self.expires_at.is_none_or(|exp| exp > now)
	}
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
	fn test_permission_parse() {
		for perm in Permission::ALL {
			assert_eq!(perm.as_str().parse::<Permission>().unwrap(), perm);
		}
		assert!("owner".parse::<Permission>().is_err());
	}

	#[test]
	fn test_node_ancestor_ids() {
		assert!(node(1, None, "1").ancestor_ids().unwrap().is_empty());
		assert_eq!(node(9, Some(4), "1/4/9").ancestor_ids().unwrap(), vec![NodeId(1), NodeId(4)]);
	}

	#[test]
	fn test_node_stale_path_detected() {
		// Parent was changed to 2 but the path still points below 4
		assert!(node(9, Some(2), "1/4/9").ancestor_ids().is_err());
		// Root with a path that claims ancestors
		assert!(node(9, None, "1/9").ancestor_ids().is_err());
		assert!(node(9, Some(4), "").ancestor_ids().is_err());
	}

	#[test]
	fn test_invite_usable() {
		let mut invite = InviteCode {
			code: "abc".into(),
			node_id: NodeId(1),
			max_uses: 2,
			used_count: 1,
			expires_at: Some(Timestamp(100)),
			created_by: AccountId(1),
			created_at: Timestamp(0),
		};
		assert!(invite.is_usable(Timestamp(50)));
		assert!(!invite.is_usable(Timestamp(100)));
		invite.used_count = 2;
		assert!(!invite.is_usable(Timestamp(50)));
		invite.used_count = 0;
		invite.expires_at = None;
		assert!(invite.is_usable(Timestamp(i64::MAX)));
	}
}

// vim: ts=4
