use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub taxonomy: Taxonomy,
	pub matching: Matching,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Where the oncotree diagnosis taxonomy is loaded from at startup:
/// a local tab-indented tree file or a remote JSON node list.
#[derive(Debug, Deserialize)]
pub struct Taxonomy {
	pub source: String,
	pub path: Option<String>,
	pub url: Option<String>,
	#[serde(default = "default_taxonomy_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Matching {
	/// Upper bound on concurrently evaluated trials; never above the
	/// Postgres pool size.
	pub max_concurrent_trials: u32,
	pub store_retry_attempts: u32,
	pub store_retry_base_ms: u64,
	/// Per-run deadline checked between trials and between match trees.
	pub run_deadline_secs: Option<u64>,
	/// Institution ranked first by the coordinating-center sort position.
	pub primary_coordinating_center: String,
}

fn default_taxonomy_timeout_ms() -> u64 {
	10_000
}
