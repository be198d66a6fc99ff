use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub qdrant: Qdrant,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
}

#[derive(Debug, Deserialize)]
pub struct Security {
	#[serde(default = "default_bind_localhost_only")]
	pub bind_localhost_only: bool,
	/// Optional. When set, admin routes require `Authorization: Bearer <token>`.
	pub admin_auth_token: Option<String>,
}
impl Default for Security {
	fn default() -> Self {
		Self { bind_localhost_only: default_bind_localhost_only(), admin_auth_token: None }
	}
}

pub(crate) fn default_log_level() -> String {
	"info".to_string()
}

fn default_bind_localhost_only() -> bool {
	true
}
