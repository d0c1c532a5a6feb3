//! Role classifier
//!
//! The only place where raw stored account roles are turned into
//! `GlobalRole` values, and where global roles are turned into the privilege
//! tier the resolver short-circuits on.

use canopy_types::community::{Account, AssignmentKind, GlobalRole};

use crate::prelude::*;

/// Privilege tier derived from an account's global role
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrivilegeTier {
	/// Developers and super admins: every node-level check is skipped
	BypassAll,
	CommunityAdminEligible,
	SubCommunityAdminEligible,
	Ordinary,
}

impl PrivilegeTier {
	/// Whether an admin assignment of `kind` counts for an account of this tier
	pub fn is_eligible_for(&self, kind: AssignmentKind) -> bool {
		matches!(
			(self, kind),
			(PrivilegeTier::BypassAll, _)
				| (PrivilegeTier::CommunityAdminEligible, AssignmentKind::CommunityAdmin)
				| (PrivilegeTier::SubCommunityAdminEligible, AssignmentKind::SubCommunityAdmin)
		)
	}

	pub fn is_bypass(&self) -> bool {
		*self == PrivilegeTier::BypassAll
	}
}

/// Map a raw stored role into the closed role set
pub fn parse_global_role(raw: &str) -> Option<GlobalRole> {
	match raw.trim() {
		"user" => Some(GlobalRole::User),
		"sub_community_admin" => Some(GlobalRole::SubCommunityAdmin),
		"community_admin" => Some(GlobalRole::CommunityAdmin),
		"developer" => Some(GlobalRole::Developer),
		"super_admin" => Some(GlobalRole::SuperAdmin),
		_ => None,
	}
}

pub fn global_role(account: &Account) -> GlobalRole {
	parse_global_role(&account.role).unwrap_or_else(|| {
		warn!(subject = %account.account_id, role = %account.role, "Unknown global role, treating as ordinary user");
		GlobalRole::User
	})
}

pub fn tier_of(role: GlobalRole) -> PrivilegeTier {
	match role {
		GlobalRole::Developer | GlobalRole::SuperAdmin => PrivilegeTier::BypassAll,
		GlobalRole::CommunityAdmin => PrivilegeTier::CommunityAdminEligible,
		GlobalRole::SubCommunityAdmin => PrivilegeTier::SubCommunityAdminEligible,
		GlobalRole::User => PrivilegeTier::Ordinary,
	}
}

/// Classify an account into its privilege tier
pub fn classify(account: &Account) -> PrivilegeTier {
	tier_of(global_role(account))
}


// vim: ts=4
