//! App builder - constructs and runs the Canopy application

use std::sync::Arc;

use crate::meta_adapter::MetaAdapter;
use crate::prelude::*;
use crate::routes;
pub use canopy_core::app::{App, AppBuilderOpts, AppState, VERSION};

pub struct AppBuilder {
	opts: AppBuilderOpts,
	meta_adapter: Option<Arc<dyn MetaAdapter>>,
}

impl AppBuilder {
	pub fn new() -> Self {
		AppBuilder { opts: AppBuilderOpts::default(), meta_adapter: None }
	}

	// Opts
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}
	pub fn jwt_secret(&mut self, jwt_secret: impl Into<Box<str>>) -> &mut Self {
		self.opts.jwt_secret = jwt_secret.into();
		self
	}
	pub fn max_payload_size(&mut self, max_payload_size: usize) -> &mut Self {
		self.opts.max_payload_size = max_payload_size;
		self
	}

	// Adapters
	pub fn meta_adapter(&mut self, meta_adapter: Arc<dyn MetaAdapter>) -> &mut Self {
		self.meta_adapter = Some(meta_adapter);
		self
	}

	/// Validate the configuration and create the app state
	pub fn build(self) -> ClResult<App> {
		let Some(meta_adapter) = self.meta_adapter else {
			error!("FATAL: No meta adapter configured");
			return Err(Error::Internal("No meta adapter configured".to_string()));
		};
		if self.opts.jwt_secret.is_empty() {
			error!("FATAL: No JWT secret configured");
			return Err(Error::Internal("No JWT secret configured".to_string()));
		}

		Ok(AppState::new(self.opts, meta_adapter))
	}

	pub async fn run(self) -> ClResult<()> {
		tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.init();

		info!("Canopy V{}", VERSION);

		let app = self.build()?;
		let router = routes::init(app.clone());

		let listener = tokio::net::TcpListener::bind(app.opts.listen.as_ref()).await?;
		info!("Listening on {}", app.opts.listen);
		axum::serve(listener, router).await?;

		Ok(())
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
