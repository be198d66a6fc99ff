use std::sync::Arc;

use scout_service::ScoutService;
use scout_storage::{db::Db, qdrant::QdrantStore};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<ScoutService>,
}
impl AppState {
	pub async fn new(config: scout_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let qdrant = QdrantStore::new(&config.storage.qdrant)?;

		if qdrant.ensure_collection().await? {
			tracing::info!(collection = %qdrant.collection, "Created component collection.");
		}

		Ok(Self::from_service(ScoutService::new(config, db, qdrant)))
	}

	pub fn from_service(service: ScoutService) -> Self {
		Self { service: Arc::new(service) }
	}
}
