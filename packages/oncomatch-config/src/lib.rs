mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Matching, Postgres, Service, Storage, Taxonomy};

use std::{fs, path::Path};

pub const TAXONOMY_SOURCE_FILE: &str = "file";
pub const TAXONOMY_SOURCE_REMOTE: &str = "remote";

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation { message: "service.log_level must be non-empty.".to_string() });
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	match cfg.taxonomy.source.as_str() {
		TAXONOMY_SOURCE_FILE =>
			if cfg.taxonomy.path.is_none() {
				return Err(Error::Validation {
					message: "taxonomy.path is required when taxonomy.source is file.".to_string(),
				});
			},
		TAXONOMY_SOURCE_REMOTE =>
			if cfg.taxonomy.url.is_none() {
				return Err(Error::Validation {
					message: "taxonomy.url is required when taxonomy.source is remote.".to_string(),
				});
			},
		_ => {
			return Err(Error::Validation {
				message: "taxonomy.source must be one of file or remote.".to_string(),
			});
		},
	}

	if cfg.taxonomy.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "taxonomy.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.matching.max_concurrent_trials == 0 {
		return Err(Error::Validation {
			message: "matching.max_concurrent_trials must be greater than zero.".to_string(),
		});
	}
	if cfg.matching.max_concurrent_trials > cfg.storage.postgres.pool_max_conns {
		return Err(Error::Validation {
			message: "matching.max_concurrent_trials must not exceed storage.postgres.pool_max_conns."
				.to_string(),
		});
	}
	if cfg.matching.store_retry_attempts == 0 {
		return Err(Error::Validation {
			message: "matching.store_retry_attempts must be greater than zero.".to_string(),
		});
	}
	if let Some(deadline) = cfg.matching.run_deadline_secs
		&& deadline == 0
	{
		return Err(Error::Validation {
			message: "matching.run_deadline_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.matching.primary_coordinating_center.trim().is_empty() {
		return Err(Error::Validation {
			message: "matching.primary_coordinating_center must be non-empty.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.taxonomy.path.as_deref().map(|path| path.trim().is_empty()).unwrap_or(false) {
		cfg.taxonomy.path = None;
	}
	if cfg.taxonomy.url.as_deref().map(|url| url.trim().is_empty()).unwrap_or(false) {
		cfg.taxonomy.url = None;
	}
}
