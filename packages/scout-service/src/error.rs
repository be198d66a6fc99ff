use uuid::Uuid;

use scout_domain::Qualifier;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid query: {message}")]
	InvalidQuery { message: String },
	#[error(transparent)]
	Consistency(#[from] ConsistencyFault),
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Index error: {message}")]
	Index { message: String },
}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<scout_storage::Error> for Error {
	fn from(err: scout_storage::Error) -> Self {
		match err {
			scout_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			scout_storage::Error::InvalidArgument(message) => Self::Storage { message },
			scout_storage::Error::Qdrant(inner) => Self::Index { message: inner.to_string() },
		}
	}
}

impl From<scout_domain::QueryError> for Error {
	fn from(err: scout_domain::QueryError) -> Self {
		Self::InvalidQuery { message: err.to_string() }
	}
}

/// The index and the store disagree about what exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsistencyFault {
	#[error("Component {component_id} found in index under {qualifier}, but not found in database.")]
	ComponentNotFound { component_id: Uuid, qualifier: Qualifier },
	#[error("Organization {organization_id} of component {component_id} not found.")]
	OrganizationNotFound { organization_id: Uuid, component_id: Uuid },
}
