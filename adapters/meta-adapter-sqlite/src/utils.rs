//! Shared utilities for the SQLite adapter
//!
//! Helper functions, macros, and error mapping used across all domain
//! modules.

use canopy::prelude::*;
use sqlx::sqlite::SqliteRow;

/// Simple helper for Patch fields - applies field to query with proper binding
/// Returns true if field was added (for tracking has_updates)
macro_rules! push_patch {
	($query:expr, $has_updates:expr, $field:literal, $patch:expr) => {{
		match $patch {
			Patch::Undefined => $has_updates,
			Patch::Null => {
				if $has_updates {
					$query.push(", ");
				}
				$query.push(concat!($field, "=NULL"));
				true
			}
			Patch::Value(v) => {
				if $has_updates {
					$query.push(", ");
				}
				$query.push(concat!($field, "=")).push_bind(v.clone());
				true
			}
		}
	}};
}

pub(crate) use push_patch;

/// Log database errors
pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

// SQLite primary result codes that signal contention rather than a bad query
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Map an sqlx error into the adapter error contract
///
/// Contention and connectivity problems become `ServiceUnavailable` so the
/// caller can retry instead of treating them as a denial.
pub(crate) fn db_err(err: sqlx::Error) -> Error {
	match &err {
		sqlx::Error::RowNotFound => Error::NotFound,
		sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
			error!("DB unavailable: {}", err);
			Error::ServiceUnavailable(err.to_string())
		}
		sqlx::Error::Database(db_err) => {
			let primary = db_err.code().and_then(|c| c.parse::<i32>().ok()).map(|c| c & 0xff);
			if matches!(primary, Some(SQLITE_BUSY | SQLITE_LOCKED)) {
				error!("DB busy: {}", db_err);
				Error::ServiceUnavailable(db_err.to_string())
			} else if db_err.is_unique_violation() {
				Error::Conflict(db_err.message().to_string())
			} else {
				inspect(&err);
				Error::DbError
			}
		}
		_ => {
			inspect(&err);
			Error::DbError
		}
	}
}

/// Map a query result to a value using a closure
pub(crate) fn map_res<T, F>(row: Result<SqliteRow, sqlx::Error>, f: F) -> ClResult<T>
where
	F: FnOnce(&SqliteRow) -> Result<T, sqlx::Error>,
{
	match row {
		Ok(ref row) => f(row).inspect_err(inspect).map_err(|_| Error::DbError),
		Err(err) => Err(db_err(err)),
	}
}

/// Map an optional query result to an optional value
pub(crate) fn map_opt<T, F>(row: Result<Option<SqliteRow>, sqlx::Error>, f: F) -> ClResult<Option<T>>
where
	F: FnOnce(&SqliteRow) -> Result<T, sqlx::Error>,
{
	match row {
		Ok(Some(ref row)) => f(row).inspect_err(inspect).map(Some).map_err(|_| Error::DbError),
		Ok(None) => Ok(None),
		Err(err) => Err(db_err(err)),
	}
}

/// Collect result iterator into a vector
pub(crate) fn collect_res<T>(
	iter: impl Iterator<Item = Result<T, sqlx::Error>> + Unpin,
) -> ClResult<Vec<T>> {
	let mut items = Vec::new();
	for item in iter {
		items.push(item.inspect_err(inspect).map_err(|_| Error::DbError)?);
	}
	Ok(items)
}

/// Append `(?, ?, ...)` with one binding per id
pub(crate) fn push_in<'a>(
	mut query: sqlx::QueryBuilder<'a, sqlx::Sqlite>,
	values: &[NodeId],
) -> sqlx::QueryBuilder<'a, sqlx::Sqlite> {
	query.push("(");
	for (i, value) in values.iter().enumerate() {
		if i > 0 {
			query.push(", ");
		}
		query.push_bind(value.0);
	}
	query.push(")");
	query
}

/// Convert a SQLite rowid into a 32-bit id
pub(crate) fn rowid_to_u32(rowid: i64) -> ClResult<u32> {
	u32::try_from(rowid).map_err(|_| Error::Internal(format!("rowid {} out of range", rowid)))
}

// vim: ts=4
