pub mod qualifier;
pub mod query;

pub use qualifier::{Qualifier, UnknownQualifier};
pub use query::{MIN_QUERY_CHARS, QueryError, validate_query};

/// Qualifiers offered by the suggestion lookup, in the order their groups are returned.
pub const SUGGESTION_QUALIFIERS: [Qualifier; 6] = [
	Qualifier::View,
	Qualifier::SubView,
	Qualifier::Project,
	Qualifier::Module,
	Qualifier::File,
	Qualifier::UnitTestFile,
];

/// Upper bound on the number of suggestions returned for a single qualifier.
pub const RESULTS_PER_QUALIFIER: usize = 6;
