use oncomatch_config::{Config, validate};

fn base_toml() -> String {
	r#"
[service]
log_level = "info"

[storage.postgres]
dsn = "postgres://localhost/oncomatch"
pool_max_conns = 8

[taxonomy]
source = "file"
path = "data/tumor_tree.txt"

[matching]
max_concurrent_trials = 4
store_retry_attempts = 3
store_retry_base_ms = 500
primary_coordinating_center = "Dana-Farber Cancer Institute"
"#
	.to_string()
}

fn parse(raw: &str) -> Config {
	toml::from_str(raw).expect("config parses")
}

#[test]
fn accepts_a_complete_config() {
	let cfg = parse(&base_toml());

	assert!(validate(&cfg).is_ok());
	assert_eq!(cfg.taxonomy.timeout_ms, 10_000);
}

#[test]
fn rejects_an_empty_dsn() {
	let raw = base_toml().replace("postgres://localhost/oncomatch", "");
	let cfg = parse(&raw);

	assert!(validate(&cfg).is_err());
}

#[test]
fn rejects_an_unknown_taxonomy_source() {
	let raw = base_toml().replace("source = \"file\"", "source = \"ftp\"");
	let cfg = parse(&raw);

	assert!(validate(&cfg).is_err());
}

#[test]
fn rejects_a_file_source_without_a_path() {
	let raw = base_toml().replace("path = \"data/tumor_tree.txt\"", "");
	let cfg = parse(&raw);

	assert!(validate(&cfg).is_err());
}

#[test]
fn rejects_concurrency_above_the_pool_size() {
	let raw = base_toml().replace("max_concurrent_trials = 4", "max_concurrent_trials = 16");
	let cfg = parse(&raw);

	assert!(validate(&cfg).is_err());
}

#[test]
fn rejects_a_zero_deadline() {
	// [matching] is the last section, so the appended key lands inside it.
	let raw = format!("{}\nrun_deadline_secs = 0\n", base_toml());
	let cfg = parse(&raw);

	assert!(validate(&cfg).is_err());
}
