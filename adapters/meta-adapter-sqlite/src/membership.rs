//! Membership and admin assignment operations

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::utils::*;
use canopy::community::{
	AssignmentKind, Membership, MembershipRole, MembershipStatus, NodeAdminAssignment,
};
use canopy::prelude::*;

pub(crate) fn role_code(role: MembershipRole) -> &'static str {
	match role {
		MembershipRole::Member => "M",
		MembershipRole::Admin => "A",
	}
}

pub(crate) fn status_code(status: MembershipStatus) -> &'static str {
	match status {
		MembershipStatus::Active => "A",
		MembershipStatus::Pending => "P",
		MembershipStatus::Banned => "B",
	}
}

fn kind_code(kind: AssignmentKind) -> &'static str {
	match kind {
		AssignmentKind::SubCommunityAdmin => "S",
		AssignmentKind::CommunityAdmin => "C",
	}
}

fn decode_err(column: &str, value: &str) -> sqlx::Error {
	sqlx::Error::Decode(format!("invalid {} code '{}'", column, value).into())
}

pub(crate) fn membership_from_row(row: &SqliteRow) -> Result<Membership, sqlx::Error> {
	let role: &str = row.try_get("role")?;
	let status: &str = row.try_get("status")?;
	Ok(Membership {
		account_id: AccountId(row.try_get("account_id")?),
		node_id: NodeId(row.try_get("node_id")?),
		role: match role {
			"M" => MembershipRole::Member,
			"A" => MembershipRole::Admin,
			other => return Err(decode_err("role", other)),
		},
		status: match status {
			"A" => MembershipStatus::Active,
			"P" => MembershipStatus::Pending,
			"B" => MembershipStatus::Banned,
			other => return Err(decode_err("status", other)),
		},
		created_at: Timestamp(row.try_get("created_at")?),
	})
}

fn assignment_from_row(row: &SqliteRow) -> Result<NodeAdminAssignment, sqlx::Error> {
	let kind: &str = row.try_get("kind")?;
	Ok(NodeAdminAssignment {
		account_id: AccountId(row.try_get("account_id")?),
		node_id: NodeId(row.try_get("node_id")?),
		kind: match kind {
			"S" => AssignmentKind::SubCommunityAdmin,
			"C" => AssignmentKind::CommunityAdmin,
			other => return Err(decode_err("kind", other)),
		},
		granted_by: row.try_get::<Option<u32>, _>("granted_by")?.map(AccountId),
		created_at: Timestamp(row.try_get("created_at")?),
	})
}

// Memberships
//*************

/// Create or replace the membership of an account on a node
pub(crate) async fn create(
	db: &SqlitePool,
	account_id: AccountId,
	node_id: NodeId,
	role: MembershipRole,
	status: MembershipStatus,
) -> ClResult<()> {
	sqlx::query(
		"INSERT INTO memberships (account_id, node_id, role, status, created_at)
		VALUES (?, ?, ?, ?, unixepoch())
		ON CONFLICT(account_id, node_id) DO UPDATE SET role = excluded.role, status = excluded.status",
	)
	.bind(account_id.0)
	.bind(node_id.0)
	.bind(role_code(role))
	.bind(status_code(status))
	.execute(db)
	.await
	.map_err(db_err)?;

	info!(subject = %account_id, community = %node_id, role = ?role, status = ?status, "Membership stored");
	Ok(())
}

pub(crate) async fn read(
	db: &SqlitePool,
	account_id: AccountId,
	node_id: NodeId,
) -> ClResult<Option<Membership>> {
	let res = sqlx::query(
		"SELECT account_id, node_id, role, status, created_at FROM memberships
		WHERE account_id = ? AND node_id = ?",
	)
	.bind(account_id.0)
	.bind(node_id.0)
	.fetch_optional(db)
	.await;

	map_opt(res, membership_from_row)
}

pub(crate) async fn delete(db: &SqlitePool, account_id: AccountId, node_id: NodeId) -> ClResult<()> {
	let res = sqlx::query("DELETE FROM memberships WHERE account_id = ? AND node_id = ?")
		.bind(account_id.0)
		.bind(node_id.0)
		.execute(db)
		.await
		.map_err(db_err)?;

	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	info!(subject = %account_id, community = %node_id, "Membership removed");
	Ok(())
}

pub(crate) async fn list_in(
	db: &SqlitePool,
	account_id: AccountId,
	node_ids: &[NodeId],
) -> ClResult<Vec<Membership>> {
	if node_ids.is_empty() {
		return Ok(Vec::new());
	}

	let mut query = sqlx::QueryBuilder::new(
		"SELECT account_id, node_id, role, status, created_at FROM memberships WHERE account_id=",
	);
	query.push_bind(account_id.0).push(" AND node_id IN ");
	query = push_in(query, node_ids);

	let rows = query.build().fetch_all(db).await.map_err(db_err)?;
	collect_res(rows.iter().map(membership_from_row))
}

pub(crate) async fn list_members(db: &SqlitePool, node_id: NodeId) -> ClResult<Vec<Membership>> {
	let rows = sqlx::query(
		"SELECT account_id, node_id, role, status, created_at FROM memberships
		WHERE node_id = ? ORDER BY created_at, account_id",
	)
	.bind(node_id.0)
	.fetch_all(db)
	.await
	.map_err(db_err)?;

	collect_res(rows.iter().map(membership_from_row))
}

// Admin assignments
//*******************

/// Create an admin assignment (idempotent)
pub(crate) async fn create_assignment(
	db: &SqlitePool,
	account_id: AccountId,
	node_id: NodeId,
	kind: AssignmentKind,
	granted_by: Option<AccountId>,
) -> ClResult<()> {
	sqlx::query(
		"INSERT OR IGNORE INTO admin_assignments (account_id, node_id, kind, granted_by, created_at)
		VALUES (?, ?, ?, ?, unixepoch())",
	)
	.bind(account_id.0)
	.bind(node_id.0)
	.bind(kind_code(kind))
	.bind(granted_by.map(|id| id.0))
	.execute(db)
	.await
	.map_err(db_err)?;

	info!(subject = %account_id, community = %node_id, kind = ?kind, granted_by = ?granted_by, "Admin assignment stored");
	Ok(())
}

pub(crate) async fn delete_assignment(
	db: &SqlitePool,
	account_id: AccountId,
	node_id: NodeId,
	kind: AssignmentKind,
) -> ClResult<()> {
	let res = sqlx::query(
		"DELETE FROM admin_assignments WHERE account_id = ? AND node_id = ? AND kind = ?",
	)
	.bind(account_id.0)
	.bind(node_id.0)
	.bind(kind_code(kind))
	.execute(db)
	.await
	.map_err(db_err)?;

	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	info!(subject = %account_id, community = %node_id, kind = ?kind, "Admin assignment removed");
	Ok(())
}

pub(crate) async fn list_assignments_in(
	db: &SqlitePool,
	account_id: AccountId,
	node_ids: &[NodeId],
) -> ClResult<Vec<NodeAdminAssignment>> {
	if node_ids.is_empty() {
		return Ok(Vec::new());
	}

	let mut query = sqlx::QueryBuilder::new(
		"SELECT account_id, node_id, kind, granted_by, created_at FROM admin_assignments WHERE account_id=",
	);
	query.push_bind(account_id.0).push(" AND node_id IN ");
	query = push_in(query, node_ids);

	let rows = query.build().fetch_all(db).await.map_err(db_err)?;
	collect_res(rows.iter().map(assignment_from_row))
}

pub(crate) async fn list_node_assignments(
	db: &SqlitePool,
	node_id: NodeId,
) -> ClResult<Vec<NodeAdminAssignment>> {
	let rows = sqlx::query(
		"SELECT account_id, node_id, kind, granted_by, created_at FROM admin_assignments
		WHERE node_id = ? ORDER BY created_at, account_id",
	)
	.bind(node_id.0)
	.fetch_all(db)
	.await
	.map_err(db_err)?;

	collect_res(rows.iter().map(assignment_from_row))
}

// vim: ts=4
