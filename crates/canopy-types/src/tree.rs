//! Materialized path codec
//!
//! A node's path lists every id from the root down to the node itself,
//! separated by `/` (e.g. `"1/4/9"`). The invariant kept by the store is
//! `path(node) == path(parent) + "/" + id`, and `path(root) == id`.

use crate::types::NodeId;

pub const PATH_SEPARATOR: char = '/';

/// Reasons a stored path cannot be trusted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
	Empty,
	InvalidSegment(Box<str>),
	/// The last segment does not name the node the path belongs to
	SelfMismatch { expected: NodeId, found: NodeId },
	/// An id appears twice, which would make the node its own ancestor
	Cycle(NodeId),
}

impl std::fmt::Display for PathError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			PathError::Empty => write!(f, "empty path"),
			PathError::InvalidSegment(seg) => write!(f, "invalid path segment '{}'", seg),
			PathError::SelfMismatch { expected, found } => {
				write!(f, "path ends in {} but belongs to node {}", found, expected)
			}
			PathError::Cycle(id) => write!(f, "node {} appears twice in path", id),
		}
	}
}

impl std::error::Error for PathError {}

/// Parse a materialized path into ids, root first
pub fn parse_path(path: &str) -> Result<Vec<NodeId>, PathError> {
	let path = path.trim();
	if path.is_empty() {
		return Err(PathError::Empty);
	}

	let mut ids: Vec<NodeId> = Vec::new();
	for seg in path.split(PATH_SEPARATOR) {
		let id = seg.parse::<NodeId>().map_err(|_| PathError::InvalidSegment(seg.into()))?;
		if ids.contains(&id) {
			return Err(PathError::Cycle(id));
		}
		ids.push(id);
	}
	Ok(ids)
}

/// Path of a node given its parent's path (`None` for root nodes)
pub fn child_path(parent_path: Option<&str>, id: NodeId) -> String {
	match parent_path {
		Some(parent) => format!("{}{}{}", parent, PATH_SEPARATOR, id),
		None => id.to_string(),
	}
}

/// Ancestor ids of `node_id` (root first, excluding the node itself)
pub fn ancestor_ids(node_id: NodeId, path: &str) -> Result<Vec<NodeId>, PathError> {
	let mut ids = parse_path(path)?;
	match ids.pop() {
		Some(last) if last == node_id => Ok(ids),
		Some(last) => Err(PathError::SelfMismatch { expected: node_id, found: last }),
		None => Err(PathError::Empty),
	}
}

/// True if `path` lies inside the subtree whose root has path `prefix`
pub fn is_within(path: &str, prefix: &str) -> bool {
	path == prefix
		|| path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with(PATH_SEPARATOR))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_path() {
		let ids = parse_path(" 1/4/9 ").unwrap();
		assert_eq!(ids, vec![NodeId(1), NodeId(4), NodeId(9)]);
	}

	#[test]
	fn test_parse_malformed() {
		assert_eq!(parse_path(""), Err(PathError::Empty));
		assert_eq!(parse_path("1//4"), Err(PathError::InvalidSegment("".into())));
		assert_eq!(parse_path("1/x"), Err(PathError::InvalidSegment("x".into())));
		assert_eq!(parse_path("1/4/1"), Err(PathError::Cycle(NodeId(1))));
	}

	#[test]
	fn test_child_path() {
		assert_eq!(child_path(None, NodeId(3)), "3");
		assert_eq!(child_path(Some("1/3"), NodeId(7)), "1/3/7");
	}

	#[test]
	fn test_ancestor_ids() {
		assert_eq!(ancestor_ids(NodeId(9), "1/4/9").unwrap(), vec![NodeId(1), NodeId(4)]);
		assert!(ancestor_ids(NodeId(1), "1").unwrap().is_empty());
		assert_eq!(
			ancestor_ids(NodeId(8), "1/4/9"),
			Err(PathError::SelfMismatch { expected: NodeId(8), found: NodeId(9) })
		);
	}

	#[test]
	fn test_is_within() {
		assert!(is_within("1/4", "1/4"));
		assert!(is_within("1/4/9", "1/4"));
		assert!(!is_within("1/40", "1/4"));
		assert!(!is_within("1", "1/4"));
	}
}

// vim: ts=4
