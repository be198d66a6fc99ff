use std::collections::HashMap;

use qdrant_client::{
	client::Payload,
	qdrant::{
		Condition, CountPointsBuilder, DeletePointsBuilder, Document, Filter, PointStruct,
		UpsertPointsBuilder, Value, Vector,
	},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scout_domain::{Qualifier, SUGGESTION_QUALIFIERS};
use scout_storage::{
	models::ComponentRow,
	qdrant::{
		BM25_MODEL, BM25_VECTOR_NAME, FIELD_KEY, FIELD_NAME, FIELD_ORGANIZATION_ID,
		FIELD_QUALIFIER, FIELD_REBUILD_ID, FIELD_SEARCH_TEXT,
	},
	queries,
};

use crate::{ComponentRecord, Result, ScoutService};

const REBUILD_BATCH_SIZE: i64 = 256;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuildReport {
	pub indexed_count: u64,
	pub skipped_count: u64,
	/// Points removed because no indexable component backs them anymore.
	pub pruned_count: u64,
}

impl ScoutService {
	/// Re-indexes every enabled component of a suggestion qualifier from Postgres into Qdrant,
	/// then deletes every point this run did not write.
	pub async fn rebuild_index(&self) -> Result<RebuildReport> {
		if self.qdrant.ensure_collection().await? {
			tracing::info!(collection = %self.qdrant.collection, "Created component collection.");
		}

		let qualifiers = SUGGESTION_QUALIFIERS
			.iter()
			.map(|qualifier| qualifier.as_str().to_string())
			.collect::<Vec<_>>();
		let rebuild_id = Uuid::new_v4();
		let mut report = RebuildReport::default();
		let mut after = None;

		loop {
			let page =
				queries::list_indexable_components(&self.db, &qualifiers, after, REBUILD_BATCH_SIZE)
					.await?;
			let Some(last) = page.last() else {
				break;
			};

			after = Some(last.component_id);

			let mut points = Vec::with_capacity(page.len());

			for row in page {
				let component_id = row.component_id;

				match build_point(row, rebuild_id) {
					Some(point) => points.push(point),
					None => {
						tracing::warn!(%component_id, "Skipping component that cannot be indexed.");

						report.skipped_count += 1;
					},
				}
			}

			if points.is_empty() {
				continue;
			}

			let count = points.len() as u64;
			let upsert = UpsertPointsBuilder::new(self.qdrant.collection.clone(), points).wait(true);

			self.qdrant.client.upsert_points(upsert).await.map_err(scout_storage::Error::from)?;

			report.indexed_count += count;
		}

		report.pruned_count = self.prune_stale_points(rebuild_id).await?;

		tracing::info!(
			%rebuild_id,
			indexed_count = report.indexed_count,
			skipped_count = report.skipped_count,
			pruned_count = report.pruned_count,
			"Component index rebuild finished."
		);

		Ok(report)
	}

	async fn prune_stale_points(&self, rebuild_id: Uuid) -> Result<u64> {
		let stale = stale_filter(rebuild_id);
		let count_request =
			CountPointsBuilder::new(self.qdrant.collection.clone()).filter(stale.clone()).exact(true);
		let count = self
			.qdrant
			.client
			.count(count_request)
			.await
			.map_err(scout_storage::Error::from)?
			.result
			.map(|result| result.count)
			.unwrap_or_default();

		if count == 0 {
			return Ok(0);
		}

		let delete =
			DeletePointsBuilder::new(self.qdrant.collection.clone()).points(stale).wait(true);

		self.qdrant.client.delete_points(delete).await.map_err(scout_storage::Error::from)?;

		Ok(count)
	}
}

/// Points not written by `rebuild_id`.
fn stale_filter(rebuild_id: Uuid) -> Filter {
	Filter::must_not([Condition::matches(FIELD_REBUILD_ID, rebuild_id.to_string())])
}

fn build_point(row: ComponentRow, rebuild_id: Uuid) -> Option<PointStruct> {
	let record = ComponentRecord::try_from(row).ok()?;

	if record.name.trim().is_empty() {
		return None;
	}

	let search_text = search_text(&record);
	let mut payload = HashMap::new();

	payload
		.insert(FIELD_QUALIFIER.to_string(), Value::from(record.qualifier.as_str().to_string()));
	payload.insert(FIELD_NAME.to_string(), Value::from(record.display_name().to_string()));
	payload.insert(FIELD_KEY.to_string(), Value::from(record.key.clone()));
	payload.insert(
		FIELD_ORGANIZATION_ID.to_string(),
		Value::from(record.organization_id.to_string()),
	);
	payload.insert(FIELD_SEARCH_TEXT.to_string(), Value::from(search_text.clone()));
	payload.insert(FIELD_REBUILD_ID.to_string(), Value::from(rebuild_id.to_string()));

	let mut vectors = HashMap::new();

	vectors.insert(
		BM25_VECTOR_NAME.to_string(),
		Vector::from(Document::new(search_text, BM25_MODEL)),
	);

	Some(PointStruct::new(record.component_id.to_string(), vectors, Payload::from(payload)))
}

/// Text matched by the index: the display name plus the key, so both are searchable.
fn search_text(record: &ComponentRecord) -> String {
	match record.qualifier {
		Qualifier::File | Qualifier::UnitTestFile | Qualifier::Directory =>
			format!("{} {}", record.display_name(), record.key.replace([':', '/'], " ")),
		_ => format!("{} {}", record.display_name(), record.key),
	}
}

#[cfg(test)]
mod tests {
	use uuid::Uuid;

	use scout_domain::Qualifier;

	use qdrant_client::qdrant::{condition::ConditionOneOf, r#match::MatchValue, value::Kind};
	use time::OffsetDateTime;

	use scout_storage::models::ComponentRow;

	use super::{build_point, search_text, stale_filter};
	use crate::ComponentRecord;

	#[test]
	fn file_keys_are_split_into_path_segments() {
		let record = ComponentRecord {
			component_id: Uuid::new_v4(),
			organization_id: Uuid::new_v4(),
			key: "sonar:src/main/App.xoo".to_string(),
			name: "App.xoo".to_string(),
			long_name: Some("src/main/App.xoo".to_string()),
			qualifier: Qualifier::File,
		};

		assert_eq!(search_text(&record), "src/main/App.xoo sonar src main App.xoo");
	}

	#[test]
	fn project_keys_are_kept_whole() {
		let record = ComponentRecord {
			component_id: Uuid::new_v4(),
			organization_id: Uuid::new_v4(),
			key: "org.sonar:sonar".to_string(),
			name: "SonarQube".to_string(),
			long_name: None,
			qualifier: Qualifier::Project,
		};

		assert_eq!(search_text(&record), "SonarQube org.sonar:sonar");
	}

	#[test]
	fn points_carry_the_rebuild_id() {
		let rebuild_id = Uuid::new_v4();
		let now = OffsetDateTime::now_utc();
		let row = ComponentRow {
			component_id: Uuid::new_v4(),
			organization_id: Uuid::new_v4(),
			key: "sonar".to_string(),
			name: "Sonar".to_string(),
			long_name: None,
			qualifier: "TRK".to_string(),
			enabled: true,
			created_at: now,
			updated_at: now,
		};
		let point = build_point(row, rebuild_id).expect("Expected a point.");

		let stamped = point.payload.get("rebuild_id").and_then(|value| match &value.kind {
			Some(Kind::StringValue(text)) => Some(text.clone()),
			_ => None,
		});

		assert_eq!(stamped, Some(rebuild_id.to_string()));
	}

	#[test]
	fn stale_filter_matches_points_of_other_runs() {
		let rebuild_id = Uuid::new_v4();
		let filter = stale_filter(rebuild_id);

		assert!(filter.must.is_empty());
		assert_eq!(filter.must_not.len(), 1);

		let Some(ConditionOneOf::Field(field)) = &filter.must_not[0].condition_one_of else {
			panic!("Expected a field condition.");
		};

		assert_eq!(field.key, "rebuild_id");
		assert_eq!(
			field.r#match.as_ref().and_then(|m| m.match_value.clone()),
			Some(MatchValue::Keyword(rebuild_id.to_string()))
		);
	}
}
