//! Community tree operations
//!
//! Nodes carry a materialized path (`"1/4/9"`). Every write that changes the
//! shape of the tree rewrites the affected paths inside one transaction, so
//! readers never observe a half-updated ancestor chain.

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::utils::*;
use canopy::community::CommunityNode;
use canopy::meta_adapter::{CreateNodeData, UpdateNodeData};
use canopy::prelude::*;
use canopy::tree;

const NODE_COLUMNS: &str = "node_id, parent_id, path, name, public, active, created_at";

fn node_from_row(row: &SqliteRow) -> Result<CommunityNode, sqlx::Error> {
	Ok(CommunityNode {
		node_id: NodeId(row.try_get("node_id")?),
		parent_id: row.try_get::<Option<u32>, _>("parent_id")?.map(NodeId),
		path: row.try_get("path")?,
		name: row.try_get("name")?,
		is_public: row.try_get("public")?,
		is_active: row.try_get("active")?,
		created_at: Timestamp(row.try_get("created_at")?),
	})
}

/// Create a node below `parent_id` (or a root node)
pub(crate) async fn create(db: &SqlitePool, data: CreateNodeData<'_>) -> ClResult<CommunityNode> {
	let mut tx = db.begin().await.map_err(db_err)?;

	let parent_path: Option<Box<str>> = match data.parent_id {
		Some(parent_id) => Some(
			sqlx::query_scalar("SELECT path FROM nodes WHERE node_id = ?")
				.bind(parent_id.0)
				.fetch_one(&mut *tx)
				.await
				.map_err(db_err)?,
		),
		None => None,
	};

	let res = sqlx::query(
		"INSERT INTO nodes (parent_id, path, name, public, active, created_at)
		VALUES (?, '', ?, ?, 1, unixepoch())",
	)
	.bind(data.parent_id.map(|id| id.0))
	.bind(data.name)
	.bind(data.is_public)
	.execute(&mut *tx)
	.await
	.map_err(db_err)?;
	let node_id = NodeId(rowid_to_u32(res.last_insert_rowid())?);

	let path = tree::child_path(parent_path.as_deref(), node_id);
	sqlx::query("UPDATE nodes SET path = ? WHERE node_id = ?")
		.bind(&path)
		.bind(node_id.0)
		.execute(&mut *tx)
		.await
		.map_err(db_err)?;

	let row = sqlx::query(&format!("SELECT {} FROM nodes WHERE node_id = ?", NODE_COLUMNS))
		.bind(node_id.0)
		.fetch_one(&mut *tx)
		.await;
	let node = map_res(row, node_from_row)?;

	tx.commit().await.map_err(db_err)?;

	info!(community = %node_id, parent = ?data.parent_id, path = %path, "Community node created");
	Ok(node)
}

/// Read a single node by ID
pub(crate) async fn read(db: &SqlitePool, node_id: NodeId) -> ClResult<CommunityNode> {
	let res = sqlx::query(&format!("SELECT {} FROM nodes WHERE node_id = ?", NODE_COLUMNS))
		.bind(node_id.0)
		.fetch_one(db)
		.await;

	map_res(res, node_from_row)
}

/// Read several nodes at once
pub(crate) async fn read_many(db: &SqlitePool, node_ids: &[NodeId]) -> ClResult<Vec<CommunityNode>> {
	if node_ids.is_empty() {
		return Ok(Vec::new());
	}

	let mut query = sqlx::QueryBuilder::new(format!(
		"SELECT {} FROM nodes WHERE node_id IN ",
		NODE_COLUMNS
	));
	query = push_in(query, node_ids);

	let rows = query.build().fetch_all(db).await.map_err(db_err)?;
	collect_res(rows.iter().map(node_from_row))
}

/// List the direct children of a node
pub(crate) async fn list_children(db: &SqlitePool, node_id: NodeId) -> ClResult<Vec<CommunityNode>> {
	let rows = sqlx::query(&format!(
		"SELECT {} FROM nodes WHERE parent_id = ? ORDER BY name, node_id",
		NODE_COLUMNS
	))
	.bind(node_id.0)
	.fetch_all(db)
	.await
	.map_err(db_err)?;

	collect_res(rows.iter().map(node_from_row))
}

/// List a node and all of its descendants, shallowest first
pub(crate) async fn list_subtree(db: &SqlitePool, node_id: NodeId) -> ClResult<Vec<CommunityNode>> {
	let root = read(db, node_id).await?;

	let rows = sqlx::query(&format!(
		"SELECT {} FROM nodes WHERE node_id = ? OR path LIKE ? ORDER BY length(path), node_id",
		NODE_COLUMNS
	))
	.bind(node_id.0)
	.bind(format!("{}{}%", root.path, tree::PATH_SEPARATOR))
	.fetch_all(db)
	.await
	.map_err(db_err)?;

	collect_res(rows.iter().map(node_from_row))
}

/// Update name and flags of a node
pub(crate) async fn update(db: &SqlitePool, node_id: NodeId, data: &UpdateNodeData) -> ClResult<()> {
	if matches!(data.name, Patch::Null)
		|| matches!(data.is_public, Patch::Null)
		|| matches!(data.is_active, Patch::Null)
	{
		return Err(Error::ValidationError("node fields cannot be null".into()));
	}

	let mut query = sqlx::QueryBuilder::new("UPDATE nodes SET ");
	let mut has_updates = false;

	has_updates = push_patch!(query, has_updates, "name", &data.name);
	has_updates = push_patch!(query, has_updates, "public", &data.is_public);
	has_updates = push_patch!(query, has_updates, "active", &data.is_active);

	if !has_updates {
		// Nothing to update, but the node must exist
		read(db, node_id).await?;
		return Ok(());
	}

	query.push(" WHERE node_id=").push_bind(node_id.0);

	let res = query.build().execute(db).await.map_err(db_err)?;
	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}

	info!(community = %node_id, "Community node updated");
	Ok(())
}

/// Move a node (and its whole subtree) under a new parent
pub(crate) async fn reparent(
	db: &SqlitePool,
	node_id: NodeId,
	new_parent_id: Option<NodeId>,
) -> ClResult<()> {
	let mut tx = db.begin().await.map_err(db_err)?;

	let old_path: Box<str> = sqlx::query_scalar("SELECT path FROM nodes WHERE node_id = ?")
		.bind(node_id.0)
		.fetch_one(&mut *tx)
		.await
		.map_err(db_err)?;

	let parent_path: Option<Box<str>> = match new_parent_id {
		Some(parent_id) => {
			let parent_path: Box<str> =
				sqlx::query_scalar("SELECT path FROM nodes WHERE node_id = ?")
					.bind(parent_id.0)
					.fetch_one(&mut *tx)
					.await
					.map_err(db_err)?;
			if tree::is_within(&parent_path, &old_path) {
				return Err(Error::ValidationError(
					"cannot move a community under itself or its descendants".into(),
				));
			}
			Some(parent_path)
		}
		None => None,
	};

	let new_path = tree::child_path(parent_path.as_deref(), node_id);

	sqlx::query("UPDATE nodes SET parent_id = ? WHERE node_id = ?")
		.bind(new_parent_id.map(|id| id.0))
		.bind(node_id.0)
		.execute(&mut *tx)
		.await
		.map_err(db_err)?;

	// Rewrite the prefix of the node and every descendant in one statement
	let res = sqlx::query(
		"UPDATE nodes SET path = ?1 || substr(path, ?2) WHERE node_id = ?3 OR path LIKE ?4",
	)
	.bind(&new_path)
	.bind(i64::try_from(old_path.len() + 1).unwrap_or(i64::MAX))
	.bind(node_id.0)
	.bind(format!("{}{}%", old_path, tree::PATH_SEPARATOR))
	.execute(&mut *tx)
	.await
	.map_err(db_err)?;

	tx.commit().await.map_err(db_err)?;

	info!(
		community = %node_id,
		new_parent = ?new_parent_id,
		old_path = %old_path,
		new_path = %new_path,
		rewritten = res.rows_affected(),
		"Community node reparented"
	);
	Ok(())
}

// vim: ts=4
