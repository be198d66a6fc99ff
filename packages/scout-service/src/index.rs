use std::{collections::HashMap, sync::Arc};

use qdrant_client::qdrant::{
	Condition, Document, Filter, PointId, Query, QueryPointsBuilder, ScrollPointsBuilder, Value,
	point_id::PointIdOptions, value::Kind,
};
use uuid::Uuid;

use scout_domain::Qualifier;
use scout_storage::qdrant::{
	BM25_MODEL, BM25_VECTOR_NAME, FIELD_NAME, FIELD_QUALIFIER, FIELD_SEARCH_TEXT, QdrantStore,
};

use crate::{
	BoxFuture, ComponentHit, ComponentHitsPerQualifier, ComponentIndex, ComponentIndexQuery, Error,
	Result,
};

const MARK_OPEN: &str = "<mark>";
const MARK_CLOSE: &str = "</mark>";

/// [`ComponentIndex`] backed by the Qdrant component collection.
pub struct QdrantComponentIndex {
	store: Arc<QdrantStore>,
}
impl QdrantComponentIndex {
	pub fn new(store: Arc<QdrantStore>) -> Self {
		Self { store }
	}

	/// BM25-ranked hits first. A partial word shares no BM25 token with the indexed text, so
	/// the remaining slots are filled from the prefix-filtered points the ranking missed.
	async fn search_qualifier(
		&self,
		query: &ComponentIndexQuery,
		qualifier: Qualifier,
	) -> Result<Vec<ComponentHit>> {
		let request = QueryPointsBuilder::new(self.store.collection.clone())
			.query(Query::new_nearest(Document::new(query.text.clone(), BM25_MODEL)))
			.using(BM25_VECTOR_NAME)
			.filter(match_filter(qualifier, &query.text, &[]))
			.with_payload(true)
			.limit(query.limit as u64);
		let response = self
			.store
			.client
			.query(request)
			.await
			.map_err(|err| Error::Index { message: err.to_string() })?;
		let ranked = response
			.result
			.iter()
			.map(|point| hit_from_point(point.id.as_ref(), &point.payload, &query.text))
			.collect::<Result<Vec<_>>>()?;

		if ranked.len() >= query.limit {
			return Ok(ranked);
		}

		let seen = ranked.iter().map(|hit| hit.component_id).collect::<Vec<_>>();
		let scroll = ScrollPointsBuilder::new(self.store.collection.clone())
			.filter(match_filter(qualifier, &query.text, &seen))
			.with_payload(true)
			.limit((query.limit - ranked.len()) as u32);
		let response = self
			.store
			.client
			.scroll(scroll)
			.await
			.map_err(|err| Error::Index { message: err.to_string() })?;
		let filler = response
			.result
			.iter()
			.map(|point| hit_from_point(point.id.as_ref(), &point.payload, &query.text))
			.collect::<Result<Vec<_>>>()?;

		Ok(merge_hits(ranked, filler, query.limit))
	}
}
impl ComponentIndex for QdrantComponentIndex {
	fn search<'a>(
		&'a self,
		query: &'a ComponentIndexQuery,
	) -> BoxFuture<'a, Result<Vec<ComponentHitsPerQualifier>>> {
		Box::pin(async move {
			let mut groups = Vec::new();

			for &qualifier in &query.qualifiers {
				let mut hits = self.search_qualifier(query, qualifier).await?;

				hits.truncate(query.limit);

				if !hits.is_empty() {
					groups.push(ComponentHitsPerQualifier { qualifier, hits });
				}
			}

			Ok(groups)
		})
	}
}

/// HTML-escapes `name` and wraps every case-insensitive occurrence of a query term in
/// `<mark>` tags. Returns `None` when no term occurs in the name.
pub fn highlight(name: &str, query: &str) -> Option<String> {
	let mut terms = query
		.split_whitespace()
		.map(|term| term.chars().collect::<Vec<_>>())
		.collect::<Vec<_>>();

	// Longest term first so overlapping terms mark the widest span.
	terms.sort_by(|a, b| b.len().cmp(&a.len()));

	if terms.is_empty() {
		return None;
	}

	let chars = name.chars().collect::<Vec<_>>();
	let mut out = String::with_capacity(name.len() + MARK_OPEN.len() + MARK_CLOSE.len());
	let mut matched = false;
	let mut idx = 0;

	while idx < chars.len() {
		let Some(term) = terms.iter().find(|term| matches_at(&chars[idx..], term)) else {
			push_escaped(&mut out, chars[idx]);

			idx += 1;

			continue;
		};
		let end = idx + term.len();

		out.push_str(MARK_OPEN);

		for &ch in &chars[idx..end] {
			push_escaped(&mut out, ch);
		}

		out.push_str(MARK_CLOSE);

		matched = true;
		idx = end;
	}

	matched.then_some(out)
}

fn matches_at(haystack: &[char], term: &[char]) -> bool {
	haystack.len() >= term.len()
		&& haystack.iter().zip(term).all(|(a, b)| a.to_lowercase().eq(b.to_lowercase()))
}

fn push_escaped(out: &mut String, ch: char) {
	match ch {
		'&' => out.push_str("&amp;"),
		'<' => out.push_str("&lt;"),
		'>' => out.push_str("&gt;"),
		'"' => out.push_str("&quot;"),
		'\'' => out.push_str("&#39;"),
		_ => out.push(ch),
	}
}

/// Points of `qualifier` whose search text matches every word of `text` as a prefix,
/// excluding `exclude`.
fn match_filter(qualifier: Qualifier, text: &str, exclude: &[Uuid]) -> Filter {
	let must_not = if exclude.is_empty() {
		Vec::new()
	} else {
		vec![Condition::has_id(exclude.iter().map(|id| PointId::from(id.to_string())))]
	};

	Filter {
		must: vec![
			Condition::matches(FIELD_QUALIFIER, qualifier.as_str().to_string()),
			Condition::matches_text(FIELD_SEARCH_TEXT, text.to_string()),
		],
		should: Vec::new(),
		must_not,
		min_should: None,
	}
}

fn merge_hits(
	ranked: Vec<ComponentHit>,
	filler: Vec<ComponentHit>,
	limit: usize,
) -> Vec<ComponentHit> {
	let mut hits = ranked;

	for hit in filler {
		if hits.len() >= limit {
			break;
		}
		if hits.iter().all(|existing| existing.component_id != hit.component_id) {
			hits.push(hit);
		}
	}

	hits.truncate(limit);

	hits
}

fn hit_from_point(
	id: Option<&PointId>,
	payload: &HashMap<String, Value>,
	query: &str,
) -> Result<ComponentHit> {
	let component_id = id.and_then(point_id_to_uuid).ok_or_else(|| Error::Index {
		message: format!("Component point has no UUID id: {id:?}."),
	})?;
	let highlighted_text =
		payload_str(payload, FIELD_NAME).and_then(|name| highlight(name, query));

	Ok(ComponentHit { component_id, highlighted_text })
}

fn point_id_to_uuid(point_id: &PointId) -> Option<Uuid> {
	match &point_id.point_id_options {
		Some(PointIdOptions::Uuid(id)) => Uuid::parse_str(id).ok(),
		_ => None,
	}
}

fn payload_str<'a>(payload: &'a HashMap<String, Value>, key: &str) -> Option<&'a str> {
	match &payload.get(key)?.kind {
		Some(Kind::StringValue(text)) => Some(text.as_str()),
		_ => None,
	}
}
