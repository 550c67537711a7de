use time::macros::date;

use oncomatch_config::Postgres;
use oncomatch_domain::{
	sample::SampleDocument,
	trial_match::{MatchReasons, TrialMatchDocument},
};
use oncomatch_storage::{db::Db, queries, run_lock::RunLock};
use oncomatch_testkit::TestDatabase;

fn sample(sample_id: &str) -> SampleDocument {
	SampleDocument {
		sample_id: sample_id.to_string(),
		mrn: "702146".to_string(),
		vital_status: "alive".to_string(),
		birth_date: date!(1980 - 06 - 15),
		oncotree_primary_diagnosis_name: "Melanoma".to_string(),
		gender: None,
		mutations: Vec::new(),
		cnvs: Vec::new(),
		svs: Vec::new(),
		wild_type_genes: Vec::new(),
		low_coverage: Vec::new(),
		mmr_status: None,
		ms_status: None,
		tobacco_status: None,
		tmz_status: None,
		pol_e_status: None,
		apobec_status: None,
		uva_status: None,
	}
}

fn trial_match(sample_id: &str, protocol_no: &str, sort_order: i64) -> TrialMatchDocument {
	TrialMatchDocument {
		sample_id: sample_id.to_string(),
		trial_protocol_no: protocol_no.to_string(),
		mrn: "702146".to_string(),
		vital_status: "alive".to_string(),
		trial_accrual_status: "open".to_string(),
		sort_order,
		match_reasons: MatchReasons {
			trial_level: "step".to_string(),
			trial_step_code: Some("1".to_string()),
			trial_arm_code: None,
			trial_dose_code: None,
			coordinating_center: None,
			mutations: Vec::new(),
			cnvs: Vec::new(),
			svs: Vec::new(),
			wildtypes: Vec::new(),
			signatures: Vec::new(),
			low_coverage: Vec::new(),
			diagnosis: None,
			diagnosis_level: None,
			birth_date: None,
			age: None,
			gender: None,
		},
		genomic_exclusion_reasons: Vec::new(),
		clinical_exclusion_reasons: Vec::new(),
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set ONCOMATCH_PG_DSN to run."]
async fn db_connects_and_bootstraps() {
	let Some(base_dsn) = oncomatch_testkit::env_dsn() else {
		eprintln!("Skipping db_connects_and_bootstraps; set ONCOMATCH_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 2 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	for table in ["samples", "trials", "trial_match", "trial_match_stage"] {
		let count: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM information_schema.tables WHERE table_name = $1",
		)
		.bind(table)
		.fetch_one(&db.pool)
		.await
		.expect("Failed to query schema tables.");

		assert_eq!(count, 1, "missing table {table}");
	}

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set ONCOMATCH_PG_DSN to run."]
async fn sample_round_trip_preserves_the_document() {
	let Some(base_dsn) = oncomatch_testkit::env_dsn() else {
		eprintln!("Skipping sample_round_trip_preserves_the_document; set ONCOMATCH_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 2 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let expected = sample("DEV-01");

	queries::upsert_sample(&db, &expected).await.expect("Failed to upsert sample.");

	let samples = queries::fetch_samples(&db).await.expect("Failed to fetch samples.");

	assert_eq!(samples, vec![expected]);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set ONCOMATCH_PG_DSN to run."]
async fn replace_swaps_the_full_trial_match_set() {
	let Some(base_dsn) = oncomatch_testkit::env_dsn() else {
		eprintln!("Skipping replace_swaps_the_full_trial_match_set; set ONCOMATCH_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 2 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let first = vec![trial_match("DEV-01", "17-251", 0)];
	let written =
		queries::replace_trial_matches(&db, &first).await.expect("Failed to replace matches.");

	assert_eq!(written, 1);

	let second = vec![trial_match("DEV-02", "18-301", 0), trial_match("DEV-03", "18-301", 1)];
	let written =
		queries::replace_trial_matches(&db, &second).await.expect("Failed to replace matches.");

	assert_eq!(written, 2);

	let live = queries::fetch_trial_matches(&db).await.expect("Failed to fetch matches.");

	assert_eq!(live, second);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set ONCOMATCH_PG_DSN to run."]
async fn run_lock_is_single_flight() {
	let Some(base_dsn) = oncomatch_testkit::env_dsn() else {
		eprintln!("Skipping run_lock_is_single_flight; set ONCOMATCH_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 3 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let lock = RunLock::acquire(&db).await.expect("Failed to acquire run lock.");

	assert!(matches!(RunLock::acquire(&db).await, Err(oncomatch_storage::Error::RunActive)));

	lock.release().await.expect("Failed to release run lock.");

	let lock = RunLock::acquire(&db).await.expect("Failed to re-acquire run lock.");

	lock.release().await.expect("Failed to release run lock.");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
