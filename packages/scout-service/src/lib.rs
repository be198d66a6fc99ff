pub mod admin;
pub mod index;
pub mod store;
pub mod suggestions;

mod error;

pub use admin::RebuildReport;
pub use error::{ConsistencyFault, Error, Result};
pub use index::{QdrantComponentIndex, highlight};
pub use store::PgResolutionStore;
pub use suggestions::{
	ComponentHit, ComponentHitsPerQualifier, ComponentIndexQuery, ComponentRecord,
	OrganizationRecord, QualifierSuggestions, SuggestionItem, SuggestionsResponse, aggregate,
	assemble,
};

use std::{
	collections::{HashMap, HashSet},
	future::Future,
	pin::Pin,
	sync::Arc,
};

use uuid::Uuid;

use scout_config::Config;
use scout_storage::{db::Db, qdrant::QdrantStore};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Full-text index over components.
pub trait ComponentIndex
where
	Self: Send + Sync,
{
	/// Returns one rank-ordered group per qualifier that has at least one match, in the order
	/// the qualifiers were requested, with at most `query.limit` hits per group.
	fn search<'a>(
		&'a self,
		query: &'a ComponentIndexQuery,
	) -> BoxFuture<'a, Result<Vec<ComponentHitsPerQualifier>>>;
}

/// Authoritative source of component and organization records.
///
/// Both lookups are best-effort bulk reads: unknown ids are left out of the returned map.
pub trait ResolutionStore
where
	Self: Send + Sync,
{
	fn components_by_ids<'a>(
		&'a self,
		component_ids: &'a HashSet<Uuid>,
	) -> BoxFuture<'a, Result<HashMap<Uuid, ComponentRecord>>>;

	fn organizations_by_ids<'a>(
		&'a self,
		organization_ids: &'a HashSet<Uuid>,
	) -> BoxFuture<'a, Result<HashMap<Uuid, OrganizationRecord>>>;
}

#[derive(Clone)]
pub struct Collaborators {
	pub index: Arc<dyn ComponentIndex>,
	pub store: Arc<dyn ResolutionStore>,
}
impl Collaborators {
	pub fn new(index: Arc<dyn ComponentIndex>, store: Arc<dyn ResolutionStore>) -> Self {
		Self { index, store }
	}
}

pub struct ScoutService {
	pub cfg: Config,
	pub db: Db,
	pub qdrant: Arc<QdrantStore>,
	pub collaborators: Collaborators,
}
impl ScoutService {
	pub fn new(cfg: Config, db: Db, qdrant: QdrantStore) -> Self {
		let qdrant = Arc::new(qdrant);
		let collaborators = Collaborators::new(
			Arc::new(QdrantComponentIndex::new(qdrant.clone())),
			Arc::new(PgResolutionStore::new(db.pool.clone())),
		);

		Self { cfg, db, qdrant, collaborators }
	}

	pub fn with_collaborators(
		cfg: Config,
		db: Db,
		qdrant: QdrantStore,
		collaborators: Collaborators,
	) -> Self {
		Self { cfg, db, qdrant: Arc::new(qdrant), collaborators }
	}

	/// Grouped component suggestions for `query`.
	pub async fn suggestions(&self, query: &str) -> Result<SuggestionsResponse> {
		aggregate(self.collaborators.index.as_ref(), self.collaborators.store.as_ref(), query).await
	}
}
