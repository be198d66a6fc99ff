use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
	Result,
	db::Db,
	models::{ComponentRow, OrganizationRow},
};

/// Loads every component whose id is in `component_ids`. Ids without a row are omitted.
pub async fn select_components_by_ids<'e, E>(
	executor: E,
	component_ids: &[Uuid],
) -> Result<Vec<ComponentRow>>
where
	E: Executor<'e, Database = Postgres>,
{
	if component_ids.is_empty() {
		return Ok(Vec::new());
	}

	let rows = sqlx::query_as::<_, ComponentRow>(
		"\
SELECT
	component_id,
	organization_id,
	key,
	name,
	long_name,
	qualifier,
	enabled,
	created_at,
	updated_at
FROM components
WHERE component_id = ANY($1)",
	)
	.bind(component_ids)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

/// Loads every organization whose id is in `organization_ids`. Ids without a row are omitted.
pub async fn select_organizations_by_ids<'e, E>(
	executor: E,
	organization_ids: &[Uuid],
) -> Result<Vec<OrganizationRow>>
where
	E: Executor<'e, Database = Postgres>,
{
	if organization_ids.is_empty() {
		return Ok(Vec::new());
	}

	let rows = sqlx::query_as::<_, OrganizationRow>(
		"\
SELECT organization_id, key, name, created_at
FROM organizations
WHERE organization_id = ANY($1)",
	)
	.bind(organization_ids)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

/// Keyset page of enabled components with one of `qualifiers`, ordered by id.
pub async fn list_indexable_components(
	db: &Db,
	qualifiers: &[String],
	after: Option<Uuid>,
	limit: i64,
) -> Result<Vec<ComponentRow>> {
	if limit <= 0 {
		return Err(crate::Error::InvalidArgument("limit must be greater than zero.".to_string()));
	}

	let rows = sqlx::query_as::<_, ComponentRow>(
		"\
SELECT
	component_id,
	organization_id,
	key,
	name,
	long_name,
	qualifier,
	enabled,
	created_at,
	updated_at
FROM components
WHERE enabled
	AND qualifier = ANY($1)
	AND ($2::uuid IS NULL OR component_id > $2)
ORDER BY component_id
LIMIT $3",
	)
	.bind(qualifiers)
	.bind(after)
	.bind(limit)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn upsert_organization(db: &Db, organization: &OrganizationRow) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO organizations (organization_id, key, name, created_at)
VALUES ($1, $2, $3, $4)
ON CONFLICT (organization_id) DO UPDATE
SET
	key = EXCLUDED.key,
	name = EXCLUDED.name",
	)
	.bind(organization.organization_id)
	.bind(organization.key.as_str())
	.bind(organization.name.as_str())
	.bind(organization.created_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn upsert_component(db: &Db, component: &ComponentRow) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO components (
	component_id,
	organization_id,
	key,
	name,
	long_name,
	qualifier,
	enabled,
	created_at,
	updated_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
ON CONFLICT (component_id) DO UPDATE
SET
	organization_id = EXCLUDED.organization_id,
	key = EXCLUDED.key,
	name = EXCLUDED.name,
	long_name = EXCLUDED.long_name,
	qualifier = EXCLUDED.qualifier,
	enabled = EXCLUDED.enabled,
	updated_at = EXCLUDED.updated_at",
	)
	.bind(component.component_id)
	.bind(component.organization_id)
	.bind(component.key.as_str())
	.bind(component.name.as_str())
	.bind(component.long_name.as_deref())
	.bind(component.qualifier.as_str())
	.bind(component.enabled)
	.bind(component.created_at)
	.bind(component.updated_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

/// Removes a component row. Used when a component is deleted from the source of truth.
pub async fn delete_component(db: &Db, component_id: Uuid) -> Result<bool> {
	let result = sqlx::query("DELETE FROM components WHERE component_id = $1")
		.bind(component_id)
		.execute(&db.pool)
		.await?;

	Ok(result.rows_affected() > 0)
}
