//! App state type

use jsonwebtoken::DecodingKey;
use std::sync::Arc;

use crate::resolver::PermissionResolver;
use canopy_types::meta_adapter::MetaAdapter;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub opts: AppBuilderOpts,
	pub resolver: PermissionResolver,
	/// Key used to verify bearer tokens (HS256)
	pub jwt_key: DecodingKey,

	pub meta_adapter: Arc<dyn MetaAdapter>,
}

impl AppState {
	pub fn new(opts: AppBuilderOpts, meta_adapter: Arc<dyn MetaAdapter>) -> App {
		let jwt_key = DecodingKey::from_secret(opts.jwt_secret.as_bytes());
		Arc::new(AppState {
			resolver: PermissionResolver::new(meta_adapter.clone()),
			jwt_key,
			opts,
			meta_adapter,
		})
	}
}

pub type App = Arc<AppState>;

pub struct AppBuilderOpts {
	pub listen: Box<str>,
	pub jwt_secret: Box<str>,
	/// Largest JSON body the payload permission check will buffer
	pub max_payload_size: usize,
}

impl std::fmt::Debug for AppBuilderOpts {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AppBuilderOpts")
			.field("listen", &self.listen)
			.field("jwt_secret", &"<redacted>")
			.field("max_payload_size", &self.max_payload_size)
			.finish()
	}
}

impl Default for AppBuilderOpts {
	fn default() -> Self {
		AppBuilderOpts {
			listen: "127.0.0.1:8080".into(),
			jwt_secret: "".into(),
			max_payload_size: 64 * 1024,
		}
	}
}

// vim: ts=4
