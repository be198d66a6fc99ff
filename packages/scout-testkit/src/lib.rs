mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr};

use qdrant_client::Qdrant;
use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use uuid::Uuid;

const ADMIN_DATABASE: &str = "postgres";

/// A throwaway Postgres database plus the Qdrant collections named through it.
///
/// Nothing is dropped implicitly; tests call [`TestDatabase::cleanup`] when they finish.
pub struct TestDatabase {
	name: String,
	dsn: String,
	admin_options: PgConnectOptions,
	collections: Vec<String>,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base_options = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::Message(format!("Failed to parse SCOUT_PG_DSN: {err}.")))?;
		let admin_options = base_options.clone().database(ADMIN_DATABASE);
		let mut admin_conn = PgConnection::connect_with(&admin_options).await?;
		let name = format!("scout_test_{}", Uuid::new_v4().simple());

		admin_conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str()).await?;

		let dsn = base_options.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, admin_options, collections: Vec::new() })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	/// Returns a collection name unique to this database and deletes it on cleanup.
	pub fn collection_name(&mut self, prefix: &str) -> String {
		let collection = format!("{prefix}_{}", self.name);

		self.collections.push(collection.clone());

		collection
	}

	pub async fn cleanup(self) -> Result<()> {
		if !self.collections.is_empty() {
			let qdrant_url = env_qdrant_url().ok_or_else(|| {
				Error::Message("SCOUT_QDRANT_URL is required to delete test collections.".into())
			})?;
			let client = Qdrant::from_url(&qdrant_url).build()?;

			for collection in &self.collections {
				client.delete_collection(collection.clone()).await?;
			}
		}

		let mut admin_conn = PgConnection::connect_with(&self.admin_options).await?;

		admin_conn
			.execute(format!(r#"DROP DATABASE IF EXISTS "{}" WITH (FORCE)"#, self.name).as_str())
			.await?;

		Ok(())
	}
}

pub fn env_dsn() -> Option<String> {
	env::var("SCOUT_PG_DSN").ok()
}

pub fn env_qdrant_url() -> Option<String> {
	env::var("SCOUT_QDRANT_URL").ok()
}
