use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scout_domain::{Qualifier, RESULTS_PER_QUALIFIER, SUGGESTION_QUALIFIERS, validate_query};
use scout_storage::models::{ComponentRow, OrganizationRow};

use crate::{ComponentIndex, ConsistencyFault, Error, ResolutionStore, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentIndexQuery {
	pub text: String,
	pub qualifiers: Vec<Qualifier>,
	pub limit: usize,
}
impl ComponentIndexQuery {
	/// The fixed query shape used by the suggestion lookup.
	pub fn suggestions(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			qualifiers: SUGGESTION_QUALIFIERS.to_vec(),
			limit: RESULTS_PER_QUALIFIER,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentHit {
	pub component_id: Uuid,
	/// Name with matched characters wrapped in markup. Already HTML-escaped.
	pub highlighted_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentHitsPerQualifier {
	pub qualifier: Qualifier,
	pub hits: Vec<ComponentHit>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRecord {
	pub component_id: Uuid,
	pub organization_id: Uuid,
	pub key: String,
	pub name: String,
	pub long_name: Option<String>,
	pub qualifier: Qualifier,
}
impl ComponentRecord {
	pub fn display_name(&self) -> &str {
		self.long_name.as_deref().filter(|name| !name.is_empty()).unwrap_or(&self.name)
	}
}
impl TryFrom<ComponentRow> for ComponentRecord {
	type Error = Error;

	fn try_from(row: ComponentRow) -> Result<Self> {
		let qualifier = row.qualifier.parse::<Qualifier>().map_err(|err| Error::Storage {
			message: format!("Component {} has an invalid qualifier: {err}", row.component_id),
		})?;

		Ok(Self {
			component_id: row.component_id,
			organization_id: row.organization_id,
			key: row.key,
			name: row.name,
			long_name: row.long_name,
			qualifier,
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationRecord {
	pub organization_id: Uuid,
	pub key: String,
	pub name: String,
}
impl From<OrganizationRow> for OrganizationRecord {
	fn from(row: OrganizationRow) -> Self {
		Self { organization_id: row.organization_id, key: row.key, name: row.name }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionItem {
	pub organization: String,
	pub key: String,
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub highlighted_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifierSuggestions {
	pub q: Qualifier,
	pub items: Vec<SuggestionItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionsResponse {
	pub results: Vec<QualifierSuggestions>,
}

/// Runs one suggestion lookup: one index search, then one bulk component read and one bulk
/// organization read, however many hits the index returns.
pub async fn aggregate(
	index: &dyn ComponentIndex,
	store: &dyn ResolutionStore,
	raw_query: &str,
) -> Result<SuggestionsResponse> {
	let text = validate_query(raw_query)?;
	let query = ComponentIndexQuery::suggestions(text);
	let groups = index.search(&query).await?;
	let component_ids: HashSet<Uuid> =
		groups.iter().flat_map(|group| group.hits.iter()).map(|hit| hit.component_id).collect();

	tracing::debug!(
		group_count = groups.len(),
		component_count = component_ids.len(),
		"Component index returned suggestion hits."
	);

	if component_ids.is_empty() {
		return Ok(SuggestionsResponse::default());
	}

	let components = store.components_by_ids(&component_ids).await?;
	let organization_ids: HashSet<Uuid> =
		components.values().map(|component| component.organization_id).collect();
	let organizations = store.organizations_by_ids(&organization_ids).await?;

	assemble(groups, &components, &organizations).inspect_err(|err| {
		if let Error::Consistency(fault) = err {
			tracing::error!(error = %fault, "Component index and store are out of sync.");
		}
	})
}

/// Joins index hits with their component and organization records, keeping group and rank
/// order. Any hit that cannot be resolved fails the whole call.
pub fn assemble(
	groups: Vec<ComponentHitsPerQualifier>,
	components: &HashMap<Uuid, ComponentRecord>,
	organizations: &HashMap<Uuid, OrganizationRecord>,
) -> Result<SuggestionsResponse> {
	let mut results = Vec::with_capacity(groups.len());

	for group in groups {
		if group.hits.is_empty() {
			continue;
		}

		let mut items = Vec::with_capacity(group.hits.len());

		for hit in group.hits {
			items.push(create_item(group.qualifier, hit, components, organizations)?);
		}

		results.push(QualifierSuggestions { q: group.qualifier, items });
	}

	Ok(SuggestionsResponse { results })
}

fn create_item(
	qualifier: Qualifier,
	hit: ComponentHit,
	components: &HashMap<Uuid, ComponentRecord>,
	organizations: &HashMap<Uuid, OrganizationRecord>,
) -> Result<SuggestionItem> {
	let component = components.get(&hit.component_id).ok_or(
		ConsistencyFault::ComponentNotFound { component_id: hit.component_id, qualifier },
	)?;
	let organization = organizations.get(&component.organization_id).ok_or(
		ConsistencyFault::OrganizationNotFound {
			organization_id: component.organization_id,
			component_id: component.component_id,
		},
	)?;

	Ok(SuggestionItem {
		organization: organization.key.clone(),
		key: component.key.clone(),
		name: component.display_name().to_string(),
		highlighted_text: hit.highlighted_text,
	})
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use uuid::Uuid;

	use scout_domain::Qualifier;

	use super::{
		ComponentHit, ComponentHitsPerQualifier, ComponentRecord, OrganizationRecord, assemble,
	};
	use crate::{ConsistencyFault, Error};

	fn record(organization_id: Uuid, key: &str, long_name: Option<&str>) -> ComponentRecord {
		ComponentRecord {
			component_id: Uuid::new_v4(),
			organization_id,
			key: key.to_string(),
			name: key.to_string(),
			long_name: long_name.map(str::to_string),
			qualifier: Qualifier::Project,
		}
	}

	#[test]
	fn display_name_prefers_non_empty_long_name() {
		let org = Uuid::new_v4();

		assert_eq!(record(org, "a", Some("Alpha Project")).display_name(), "Alpha Project");
		assert_eq!(record(org, "a", Some("")).display_name(), "a");
		assert_eq!(record(org, "a", None).display_name(), "a");
	}

	#[test]
	fn empty_groups_are_skipped() {
		let groups = vec![ComponentHitsPerQualifier { qualifier: Qualifier::File, hits: vec![] }];
		let response =
			assemble(groups, &HashMap::new(), &HashMap::new()).expect("Assembly must succeed.");

		assert!(response.results.is_empty());
	}

	#[test]
	fn missing_organization_is_a_consistency_fault() {
		let org = Uuid::new_v4();
		let component = record(org, "sonar", None);
		let component_id = component.component_id;
		let groups = vec![ComponentHitsPerQualifier {
			qualifier: Qualifier::Project,
			hits: vec![ComponentHit { component_id, highlighted_text: None }],
		}];
		let components = HashMap::from([(component_id, component)]);
		let organizations: HashMap<Uuid, OrganizationRecord> = HashMap::new();
		let err = assemble(groups, &components, &organizations).expect_err("Expected a fault.");

		assert!(matches!(
			err,
			Error::Consistency(ConsistencyFault::OrganizationNotFound { organization_id, .. })
				if organization_id == org
		));
	}
}
