use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrganizationRow {
	pub organization_id: Uuid,
	pub key: String,
	pub name: String,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ComponentRow {
	pub component_id: Uuid,
	pub organization_id: Uuid,
	pub key: String,
	pub name: String,
	pub long_name: Option<String>,
	/// Short qualifier code, e.g. `TRK` or `FIL`.
	pub qualifier: String,
	pub enabled: bool,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}
