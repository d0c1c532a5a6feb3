//! Common test utilities for the HTTP API
//!
//! Builds the full router on a temporary SQLite store and sends requests to
//! it in-process.

#![allow(dead_code)]

use axum::{
	Router,
	body::Body,
	http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use canopy::community::{AssignmentKind, GlobalRole, MembershipRole, MembershipStatus};
use canopy::meta_adapter::{CreateAccountData, CreateNodeData};
use canopy::types::{AccountId, NodeId, Timestamp};
use canopy::{App, AppBuilder, routes};
use canopy_core::auth::AccessClaims;
use canopy_meta_adapter_sqlite::MetaAdapterSqlite;

pub const JWT_SECRET: &str = "api-test-secret";

pub struct TestApp {
	pub app: App,
	pub router: Router,
	_temp_dir: TempDir,
}

pub async fn setup() -> TestApp {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter =
		MetaAdapterSqlite::new(temp_dir.path()).await.expect("Failed to create adapter");

	let mut builder = AppBuilder::new();
	builder.jwt_secret(JWT_SECRET).meta_adapter(Arc::new(adapter));
	let app = builder.build().expect("Should build app");
	let router = routes::init(app.clone());

	TestApp { app, router, _temp_dir: temp_dir }
}

impl TestApp {
	pub async fn account(&self, id_tag: &str, role: GlobalRole) -> AccountId {
		self.app
			.meta_adapter
			.create_account(CreateAccountData { id_tag, name: id_tag, role })
			.await
			.expect("Should create account")
	}

	pub async fn node(&self, parent_id: Option<NodeId>, name: &str, is_public: bool) -> NodeId {
		self.app
			.meta_adapter
			.create_node(CreateNodeData { parent_id, name, is_public })
			.await
			.expect("Should create node")
			.node_id
	}

	pub async fn join(&self, account_id: AccountId, node_id: NodeId) {
		self.app
			.meta_adapter
			.create_membership(account_id, node_id, MembershipRole::Member, MembershipStatus::Active)
			.await
			.expect("Should join");
	}

	pub async fn ban(&self, account_id: AccountId, node_id: NodeId) {
		self.app
			.meta_adapter
			.create_membership(account_id, node_id, MembershipRole::Member, MembershipStatus::Banned)
			.await
			.expect("Should ban");
	}

	pub async fn assign(&self, account_id: AccountId, node_id: NodeId, kind: AssignmentKind) {
		self.app
			.meta_adapter
			.create_assignment(account_id, node_id, kind, None)
			.await
			.expect("Should assign");
	}

	/// Send a request as `account_id` and return the status and body
	/// (`Value::Null` for an empty body)
	pub async fn call(
		&self,
		method: &str,
		uri: &str,
		account_id: Option<AccountId>,
		body: Option<Value>,
	) -> (StatusCode, Value) {
		let mut builder = Request::builder().method(method).uri(uri);
		if let Some(account_id) = account_id {
			builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(account_id)));
		}
		let req = match body {
			Some(body) => builder
				.header(header::CONTENT_TYPE, "application/json")
				.body(Body::from(body.to_string()))
				.expect("request"),
			None => builder.body(Body::empty()).expect("request"),
		};

		let res = self.router.clone().oneshot(req).await.expect("Router should respond");
		let status = res.status();
		let bytes = res.into_body().collect().await.expect("body").to_bytes();
		let json = if bytes.is_empty() {
			Value::Null
		} else {
			// Extractor rejections come back as plain text
			serde_json::from_slice(&bytes)
				.unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
		};
		(status, json)
	}
}

pub fn token(account_id: AccountId) -> String {
	let exp = u64::try_from(Timestamp::now().add_seconds(3600).0).expect("positive timestamp");
	encode(
		&Header::new(Algorithm::HS256),
		&AccessClaims { sub: account_id.to_string(), exp },
		&EncodingKey::from_secret(JWT_SECRET.as_bytes()),
	)
	.expect("Should encode token")
}

// vim: ts=4
