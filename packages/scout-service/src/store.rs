use std::collections::{HashMap, HashSet};

use sqlx::PgPool;
use uuid::Uuid;

use scout_storage::queries;

use crate::{BoxFuture, ComponentRecord, OrganizationRecord, ResolutionStore, Result};

/// [`ResolutionStore`] backed by Postgres.
///
/// Each bulk read checks out its own pooled connection and returns it before the read resolves.
pub struct PgResolutionStore {
	pool: PgPool,
}
impl PgResolutionStore {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}

	async fn load_components(
		&self,
		component_ids: &HashSet<Uuid>,
	) -> Result<HashMap<Uuid, ComponentRecord>> {
		if component_ids.is_empty() {
			return Ok(HashMap::new());
		}

		let ids = component_ids.iter().copied().collect::<Vec<_>>();
		let rows = {
			let mut conn = self.pool.acquire().await?;

			queries::select_components_by_ids(&mut *conn, &ids).await?
		};

		rows.into_iter()
			.map(|row| ComponentRecord::try_from(row).map(|record| (record.component_id, record)))
			.collect()
	}

	async fn load_organizations(
		&self,
		organization_ids: &HashSet<Uuid>,
	) -> Result<HashMap<Uuid, OrganizationRecord>> {
		if organization_ids.is_empty() {
			return Ok(HashMap::new());
		}

		let ids = organization_ids.iter().copied().collect::<Vec<_>>();
		let rows = {
			let mut conn = self.pool.acquire().await?;

			queries::select_organizations_by_ids(&mut *conn, &ids).await?
		};

		Ok(rows
			.into_iter()
			.map(OrganizationRecord::from)
			.map(|record| (record.organization_id, record))
			.collect())
	}
}
impl ResolutionStore for PgResolutionStore {
	fn components_by_ids<'a>(
		&'a self,
		component_ids: &'a HashSet<Uuid>,
	) -> BoxFuture<'a, Result<HashMap<Uuid, ComponentRecord>>> {
		Box::pin(self.load_components(component_ids))
	}

	fn organizations_by_ids<'a>(
		&'a self,
		organization_ids: &'a HashSet<Uuid>,
	) -> BoxFuture<'a, Result<HashMap<Uuid, OrganizationRecord>>> {
		Box::pin(self.load_organizations(organization_ids))
	}
}
