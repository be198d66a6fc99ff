mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Postgres, Qdrant, Security, Service, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } => Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

/// Parses, normalizes and validates a config document that is already in memory.
pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: Default::default(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in [
		("service.http_bind", &cfg.service.http_bind),
		("service.admin_bind", &cfg.service.admin_bind),
		("storage.postgres.dsn", &cfg.storage.postgres.dsn),
		("storage.qdrant.url", &cfg.storage.qdrant.url),
		("storage.qdrant.collection", &cfg.storage.qdrant.collection),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.qdrant.collection.chars().any(char::is_whitespace) {
		return Err(Error::Validation {
			message: "storage.qdrant.collection must not contain whitespace.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = types::default_log_level();
	}
	if cfg
		.security
		.admin_auth_token
		.as_deref()
		.map(|token| token.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.security.admin_auth_token = None;
	}
}
