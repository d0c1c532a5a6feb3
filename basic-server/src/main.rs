use std::{env, path, sync::Arc};

use canopy::error::{ClResult, Error};
use canopy_meta_adapter_sqlite::MetaAdapterSqlite;

pub struct Config {
	pub listen: String,
	pub db_dir: path::PathBuf,
	pub jwt_secret: String,
}

impl Config {
	fn from_env() -> ClResult<Self> {
		Ok(Config {
			listen: env::var("LISTEN").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
			db_dir: path::PathBuf::from(env::var("DB_DIR").unwrap_or_else(|_| "./data".to_string())),
			jwt_secret: env::var("JWT_SECRET")
				.map_err(|_| Error::Internal("JWT_SECRET is not set".to_string()))?,
		})
	}
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ClResult<()> {
	let config = Config::from_env()?;

	let meta_adapter = Arc::new(MetaAdapterSqlite::new(&config.db_dir).await?);

	let mut builder = canopy::AppBuilder::new();
	builder.listen(config.listen).jwt_secret(config.jwt_secret).meta_adapter(meta_adapter);
	builder.run().await
}

// vim: ts=4
