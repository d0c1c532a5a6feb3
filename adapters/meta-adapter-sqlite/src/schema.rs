//! Database schema initialization and migrations
//!
//! This module handles creating tables, indexes, and running migrations
//! to ensure the database schema is up to date.

use sqlx::{Sqlite, SqlitePool, Transaction};

/// Get the current database version from globals table
async fn get_db_version(tx: &mut Transaction<'_, Sqlite>) -> i64 {
	sqlx::query_scalar::<_, String>("SELECT value FROM globals WHERE key = 'db_version'")
		.fetch_optional(&mut **tx)
		.await
		.ok()
		.flatten()
		.and_then(|v| v.parse().ok())
		.unwrap_or(0)
}

/// Set the database version in globals table
async fn set_db_version(tx: &mut Transaction<'_, Sqlite>, version: i64) -> Result<(), sqlx::Error> {
	sqlx::query("INSERT OR REPLACE INTO globals (key, value) VALUES ('db_version', ?)")
		.bind(version.to_string())
		.execute(&mut **tx)
		.await?;
	Ok(())
}

// Current schema version - update this when adding new migrations
const CURRENT_DB_VERSION: i64 = 1;

/// Initialize the database schema with all required tables and indexes
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS globals (
			key text NOT NULL,
			value text,
			PRIMARY KEY(key)
	)",
	)
	.execute(&mut *tx)
	.await?;

	let version = get_db_version(&mut tx).await;

	/***********/
	/* Init DB */
	/***********/

	// Accounts
	//**********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS accounts (
		account_id integer PRIMARY KEY AUTOINCREMENT,
		id_tag text NOT NULL,
		name text NOT NULL,
		role text NOT NULL DEFAULT 'user',
		created_at INTEGER DEFAULT (unixepoch())
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_accounts_id_tag ON accounts (id_tag)")
		.execute(&mut *tx)
		.await?;

	// Community tree
	//****************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS nodes (
		node_id integer PRIMARY KEY AUTOINCREMENT,
		parent_id integer,
		path text NOT NULL,
		name text NOT NULL,
		public boolean NOT NULL DEFAULT 0,
		active boolean NOT NULL DEFAULT 1,
		created_at INTEGER DEFAULT (unixepoch())
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_nodes_parent ON nodes (parent_id)")
		.execute(&mut *tx)
		.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_nodes_path ON nodes (path)")
		.execute(&mut *tx)
		.await?;

	// Memberships
	//*************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS memberships (
		account_id integer NOT NULL,
		node_id integer NOT NULL,
		role char(1) NOT NULL,
		status char(1) NOT NULL,
		created_at INTEGER DEFAULT (unixepoch()),
		PRIMARY KEY(account_id, node_id)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_memberships_node ON memberships (node_id)")
		.execute(&mut *tx)
		.await?;

	// Admin assignments
	//*******************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS admin_assignments (
		account_id integer NOT NULL,
		node_id integer NOT NULL,
		kind char(1) NOT NULL,
		granted_by integer,
		created_at INTEGER DEFAULT (unixepoch()),
		PRIMARY KEY(account_id, node_id, kind)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_admin_assignments_node ON admin_assignments (node_id)",
	)
	.execute(&mut *tx)
	.await?;

	// Invites
	//*********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS invites (
		code text NOT NULL,
		node_id integer NOT NULL,
		max_uses integer NOT NULL DEFAULT 1,
		used_count integer NOT NULL DEFAULT 0,
		expires_at INTEGER,
		created_by integer NOT NULL,
		created_at INTEGER DEFAULT (unixepoch()),
		PRIMARY KEY(code)
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query("CREATE INDEX IF NOT EXISTS idx_invites_node ON invites (node_id)")
		.execute(&mut *tx)
		.await?;

	if version < CURRENT_DB_VERSION {
		set_db_version(&mut tx, CURRENT_DB_VERSION).await?;
	}

	tx.commit().await?;

	Ok(())
}

// vim: ts=4
