use serde_json::Value;
use sqlx::QueryBuilder;
use uuid::Uuid;

use oncomatch_domain::{
	sample::SampleDocument, trial::TrialDocument, trial_match::TrialMatchDocument,
};

use crate::{Result, db::Db, models::{SampleRow, TrialMatchRow, TrialRow}};

// Postgres limits a statement to 65535 bind parameters; five per row.
const INSERT_CHUNK_ROWS: usize = 1_000;

/// All samples, ordered by sample id for deterministic query execution.
pub async fn fetch_samples(db: &Db) -> Result<Vec<SampleDocument>> {
	let rows: Vec<SampleRow> =
		sqlx::query_as("SELECT sample_id, doc FROM samples ORDER BY sample_id")
			.fetch_all(&db.pool)
			.await?;
	let mut samples = Vec::with_capacity(rows.len());

	for row in rows {
		samples.push(serde_json::from_value(row.doc)?);
	}

	Ok(samples)
}

/// All trials, ordered by protocol number.
pub async fn fetch_trials(db: &Db) -> Result<Vec<TrialDocument>> {
	let rows: Vec<TrialRow> =
		sqlx::query_as("SELECT protocol_no, doc FROM trials ORDER BY protocol_no")
			.fetch_all(&db.pool)
			.await?;
	let mut trials = Vec::with_capacity(rows.len());

	for row in rows {
		trials.push(serde_json::from_value(row.doc)?);
	}

	Ok(trials)
}

pub async fn upsert_sample(db: &Db, sample: &SampleDocument) -> Result<()> {
	let doc = serde_json::to_value(sample)?;

	sqlx::query(
		"\
INSERT INTO samples (sample_id, mrn, vital_status, doc)
VALUES ($1, $2, $3, $4)
ON CONFLICT (sample_id) DO UPDATE
SET
	mrn = EXCLUDED.mrn,
	vital_status = EXCLUDED.vital_status,
	doc = EXCLUDED.doc,
	updated_at = now()",
	)
	.bind(sample.sample_id.as_str())
	.bind(sample.mrn.as_str())
	.bind(sample.vital_status.as_str())
	.bind(doc)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn upsert_trial(db: &Db, trial: &TrialDocument) -> Result<()> {
	let doc = serde_json::to_value(trial)?;

	sqlx::query(
		"\
INSERT INTO trials (protocol_no, nct_id, doc)
VALUES ($1, $2, $3)
ON CONFLICT (protocol_no) DO UPDATE
SET
	nct_id = EXCLUDED.nct_id,
	doc = EXCLUDED.doc,
	updated_at = now()",
	)
	.bind(trial.protocol_no.as_str())
	.bind(trial.nct_id.as_deref())
	.bind(doc)
	.execute(&db.pool)
	.await?;

	Ok(())
}

/// Replace the live trial-match set with this run's documents: fill the
/// stage table first, then swap stage into live inside one transaction so
/// readers never observe a partial result.
pub async fn replace_trial_matches(db: &Db, docs: &[TrialMatchDocument]) -> Result<u64> {
	stage_trial_matches(db, docs).await?;

	let mut tx = db.pool.begin().await?;

	sqlx::query("DELETE FROM trial_match").execute(&mut *tx).await?;
	sqlx::query(
		"\
INSERT INTO trial_match (match_id, sample_id, protocol_no, sort_order, doc, created_at)
SELECT match_id, sample_id, protocol_no, sort_order, doc, created_at
FROM trial_match_stage",
	)
	.execute(&mut *tx)
	.await?;

	let count: i64 =
		sqlx::query_scalar("SELECT count(*) FROM trial_match").fetch_one(&mut *tx).await?;

	tx.commit().await?;

	Ok(count as u64)
}

async fn stage_trial_matches(db: &Db, docs: &[TrialMatchDocument]) -> Result<()> {
	let mut encoded = Vec::with_capacity(docs.len());

	for doc in docs {
		let value: Value = serde_json::to_value(doc)?;

		encoded.push((doc, value));
	}

	let mut tx = db.pool.begin().await?;

	sqlx::query("DELETE FROM trial_match_stage").execute(&mut *tx).await?;

	for chunk in encoded.chunks(INSERT_CHUNK_ROWS) {
		let mut builder = QueryBuilder::new(
			"INSERT INTO trial_match_stage (match_id, sample_id, protocol_no, sort_order, doc) ",
		);

		builder.push_values(chunk, |mut b, (doc, value)| {
			b.push_bind(Uuid::new_v4())
				.push_bind(doc.sample_id.as_str())
				.push_bind(doc.trial_protocol_no.as_str())
				.push_bind(doc.sort_order)
				.push_bind(value.clone());
		});
		builder.build().execute(&mut *tx).await?;
	}

	tx.commit().await?;

	Ok(())
}

/// The live trial-match set in display order.
pub async fn fetch_trial_matches(db: &Db) -> Result<Vec<TrialMatchDocument>> {
	let rows: Vec<TrialMatchRow> = sqlx::query_as(
		"\
SELECT match_id, sample_id, protocol_no, sort_order, doc
FROM trial_match
ORDER BY sort_order, sample_id, protocol_no",
	)
	.fetch_all(&db.pool)
	.await?;
	let mut docs = Vec::with_capacity(rows.len());

	for row in rows {
		docs.push(serde_json::from_value(row.doc)?);
	}

	Ok(docs)
}
