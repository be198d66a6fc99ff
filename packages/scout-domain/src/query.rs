/// Minimum number of characters a suggestion query must carry after trimming.
pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
	#[error("Query must be at least {min} characters long, got {actual}.")]
	TooShort { min: usize, actual: usize },
}

/// Returns the trimmed query, or an error when it is shorter than [`MIN_QUERY_CHARS`].
///
/// Length is counted in Unicode scalar values so that non-ASCII component names are not
/// penalized.
pub fn validate_query(raw: &str) -> Result<&str, QueryError> {
	let trimmed = raw.trim();
	let actual = trimmed.chars().count();

	if actual < MIN_QUERY_CHARS {
		return Err(QueryError::TooShort { min: MIN_QUERY_CHARS, actual });
	}

	Ok(trimmed)
}
