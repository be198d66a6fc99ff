pub const BM25_VECTOR_NAME: &str = "bm25";
pub const BM25_MODEL: &str = "qdrant/bm25";

/// Payload fields written for every indexed component.
pub const FIELD_QUALIFIER: &str = "qualifier";
pub const FIELD_NAME: &str = "name";
pub const FIELD_KEY: &str = "key";
pub const FIELD_SEARCH_TEXT: &str = "search_text";
pub const FIELD_ORGANIZATION_ID: &str = "organization_id";
/// Id of the rebuild run that last wrote the point.
pub const FIELD_REBUILD_ID: &str = "rebuild_id";

use qdrant_client::qdrant::{
	CreateCollectionBuilder, CreateFieldIndexCollectionBuilder, FieldType, Modifier,
	SparseVectorParamsBuilder, SparseVectorsConfigBuilder, TextIndexParamsBuilder, TokenizerType,
};

use crate::Result;

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
}
impl QdrantStore {
	pub fn new(cfg: &scout_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone() })
	}

	/// Creates the component collection and its payload indexes when they do not exist yet.
	pub async fn ensure_collection(&self) -> Result<bool> {
		if self.client.collection_exists(&self.collection).await? {
			return Ok(false);
		}

		let mut sparse = SparseVectorsConfigBuilder::default();

		sparse.add_named_vector_params(
			BM25_VECTOR_NAME,
			SparseVectorParamsBuilder::default().modifier(Modifier::Idf),
		);

		self.client
			.create_collection(
				CreateCollectionBuilder::new(self.collection.clone()).sparse_vectors_config(sparse),
			)
			.await?;

		for field in [FIELD_QUALIFIER, FIELD_ORGANIZATION_ID, FIELD_REBUILD_ID] {
			self.client
				.create_field_index(
					CreateFieldIndexCollectionBuilder::new(
						self.collection.clone(),
						field,
						FieldType::Keyword,
					)
					.wait(true),
				)
				.await?;
		}

		self.client
			.create_field_index(
				CreateFieldIndexCollectionBuilder::new(
					self.collection.clone(),
					FIELD_SEARCH_TEXT,
					FieldType::Text,
				)
				.field_index_params(
					TextIndexParamsBuilder::new(TokenizerType::Prefix).lowercase(true),
				)
				.wait(true),
			)
			.await?;

		Ok(true)
	}
}
