//! Invite code operations

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::membership::{membership_from_row, role_code, status_code};
use crate::utils::*;
use canopy::community::{InviteCode, Membership, MembershipRole, MembershipStatus};
use canopy::meta_adapter::CreateInviteData;
use canopy::prelude::*;

const INVITE_COLUMNS: &str =
	"code, node_id, max_uses, used_count, expires_at, created_by, created_at";

fn invite_from_row(row: &SqliteRow) -> Result<InviteCode, sqlx::Error> {
	Ok(InviteCode {
		code: row.try_get("code")?,
		node_id: NodeId(row.try_get("node_id")?),
		max_uses: row.try_get("max_uses")?,
		used_count: row.try_get("used_count")?,
		expires_at: row.try_get::<Option<i64>, _>("expires_at")?.map(Timestamp),
		created_by: AccountId(row.try_get("created_by")?),
		created_at: Timestamp(row.try_get("created_at")?),
	})
}

pub(crate) async fn create(db: &SqlitePool, data: CreateInviteData<'_>) -> ClResult<InviteCode> {
	sqlx::query(
		"INSERT INTO invites (code, node_id, max_uses, used_count, expires_at, created_by, created_at)
		VALUES (?, ?, ?, 0, ?, ?, unixepoch())",
	)
	.bind(data.code)
	.bind(data.node_id.0)
	.bind(data.max_uses)
	.bind(data.expires_at.map(|ts| ts.0))
	.bind(data.created_by.0)
	.execute(db)
	.await
	.map_err(db_err)?;

	info!(community = %data.node_id, created_by = %data.created_by, max_uses = data.max_uses, "Invite created");
	read(db, data.code).await
}

pub(crate) async fn read(db: &SqlitePool, code: &str) -> ClResult<InviteCode> {
	let res = sqlx::query(&format!("SELECT {} FROM invites WHERE code = ?", INVITE_COLUMNS))
		.bind(code)
		.fetch_one(db)
		.await;

	map_res(res, invite_from_row)
}

/// Consume one use of an invite code and make `account_id` an active member
/// of its community.
///
/// Everything happens in one transaction: a rejected membership gives the
/// use back.
pub(crate) async fn redeem(
	db: &SqlitePool,
	code: &str,
	account_id: AccountId,
	now: Timestamp,
) -> ClResult<Membership> {
	let mut tx = db.begin().await.map_err(db_err)?;

	// The guard in the WHERE clause keeps concurrent redemptions within max_uses
	let node_id: Option<u32> = sqlx::query_scalar(
		"UPDATE invites SET used_count = used_count + 1
		WHERE code = ? AND used_count < max_uses AND (expires_at IS NULL OR expires_at > ?)
		RETURNING node_id",
	)
	.bind(code)
	.bind(now.0)
	.fetch_optional(&mut *tx)
	.await
	.map_err(db_err)?;
	let Some(node_id) = node_id.map(NodeId) else {
		debug!("Invite code not usable");
		return Err(Error::NotFound);
	};

	let status: Option<String> =
		sqlx::query_scalar("SELECT status FROM memberships WHERE account_id = ? AND node_id = ?")
			.bind(account_id.0)
			.bind(node_id.0)
			.fetch_optional(&mut *tx)
			.await
			.map_err(db_err)?;
	if status.as_deref() == Some(status_code(MembershipStatus::Active)) {
		return Err(Error::Conflict("already a member".into()));
	}

	// A pending membership is promoted, a banned one is left alone
	let res = sqlx::query(
		"INSERT INTO memberships (account_id, node_id, role, status, created_at)
		VALUES (?, ?, ?, ?, unixepoch())
		ON CONFLICT(account_id, node_id) DO UPDATE SET status = excluded.status
		WHERE memberships.status <> ?",
	)
	.bind(account_id.0)
	.bind(node_id.0)
	.bind(role_code(MembershipRole::Member))
	.bind(status_code(MembershipStatus::Active))
	.bind(status_code(MembershipStatus::Banned))
	.execute(&mut *tx)
	.await
	.map_err(db_err)?;
	if res.rows_affected() == 0 {
		warn!(subject = %account_id, community = %node_id, "Banned account tried to redeem invite");
		return Err(Error::PermissionDenied);
	}

	let row = sqlx::query(
		"SELECT account_id, node_id, role, status, created_at FROM memberships
		WHERE account_id = ? AND node_id = ?",
	)
	.bind(account_id.0)
	.bind(node_id.0)
	.fetch_one(&mut *tx)
	.await;
	let membership = map_res(row, membership_from_row)?;

	tx.commit().await.map_err(db_err)?;

	info!(subject = %account_id, community = %node_id, "Invite redeemed");
	Ok(membership)
}

// vim: ts=4
