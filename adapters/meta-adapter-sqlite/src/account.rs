//! Account management operations

use sqlx::{Row, SqlitePool};

use crate::utils::*;
use canopy::community::{Account, GlobalRole};
use canopy::meta_adapter::CreateAccountData;
use canopy::prelude::*;

/// Create a new account
pub(crate) async fn create(db: &SqlitePool, data: CreateAccountData<'_>) -> ClResult<AccountId> {
	let res = sqlx::query(
		"INSERT INTO accounts (id_tag, name, role, created_at) VALUES (?, ?, ?, unixepoch())",
	)
	.bind(data.id_tag)
	.bind(data.name)
	.bind(data.role.as_str())
	.execute(db)
	.await
	.map_err(db_err)?;

	let account_id = AccountId(rowid_to_u32(res.last_insert_rowid())?);
	info!(account = %account_id, id_tag = %data.id_tag, role = data.role.as_str(), "Account created");
	Ok(account_id)
}

/// Read a single account by ID
pub(crate) async fn read(db: &SqlitePool, account_id: AccountId) -> ClResult<Account> {
	let res = sqlx::query(
		"SELECT account_id, id_tag, name, role, created_at FROM accounts WHERE account_id = ?",
	)
	.bind(account_id.0)
	.fetch_one(db)
	.await;

	map_res(res, |row| {
		Ok(Account {
			account_id: AccountId(row.try_get("account_id")?),
			id_tag: row.try_get("id_tag")?,
			name: row.try_get("name")?,
			role: row.try_get("role")?,
			created_at: Timestamp(row.try_get("created_at")?),
		})
	})
}

/// Change an account's global role
pub(crate) async fn update_role(
	db: &SqlitePool,
	account_id: AccountId,
	role: GlobalRole,
) -> ClResult<()> {
	let res = sqlx::query("UPDATE accounts SET role = ? WHERE account_id = ?")
		.bind(role.as_str())
		.bind(account_id.0)
		.execute(db)
		.await
		.map_err(db_err)?;

	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	info!(account = %account_id, role = role.as_str(), "Account role updated");
	Ok(())
}

// vim: ts=4
