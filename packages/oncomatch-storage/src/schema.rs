/// Rendered DDL for the patient, trial, and trial-match tables. Documents are
/// stored as JSONB with the identity and sort columns lifted out for
/// indexing; `trial_match_stage` receives each run's ranked output before the
/// atomic swap into `trial_match`.
pub fn render_schema() -> String {
	"\
CREATE TABLE IF NOT EXISTS samples (
	sample_id TEXT PRIMARY KEY,
	mrn TEXT NOT NULL,
	vital_status TEXT NOT NULL,
	doc JSONB NOT NULL,
	updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS trials (
	protocol_no TEXT PRIMARY KEY,
	nct_id TEXT,
	doc JSONB NOT NULL,
	updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS trial_match (
	match_id UUID PRIMARY KEY,
	sample_id TEXT NOT NULL,
	protocol_no TEXT NOT NULL,
	sort_order BIGINT NOT NULL,
	doc JSONB NOT NULL,
	created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS idx_trial_match_sample ON trial_match (sample_id);

CREATE INDEX IF NOT EXISTS idx_trial_match_sort ON trial_match (sort_order);

CREATE TABLE IF NOT EXISTS trial_match_stage (
	match_id UUID PRIMARY KEY,
	sample_id TEXT NOT NULL,
	protocol_no TEXT NOT NULL,
	sort_order BIGINT NOT NULL,
	doc JSONB NOT NULL,
	created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)"
	.to_string()
}
