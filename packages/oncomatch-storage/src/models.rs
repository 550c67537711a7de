use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct SampleRow {
	pub sample_id: String,
	pub doc: Value,
}

#[derive(Debug, sqlx::FromRow)]
pub struct TrialRow {
	pub protocol_no: String,
	pub doc: Value,
}

#[derive(Debug, sqlx::FromRow)]
pub struct TrialMatchRow {
	pub match_id: Uuid,
	pub sample_id: String,
	pub protocol_no: String,
	pub sort_order: i64,
	pub doc: Value,
}
