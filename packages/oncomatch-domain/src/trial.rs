use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const TRIAL_STATUS_OPEN_TEXT: &str = "open to accrual";
pub const ACCRUAL_STATUS_OPEN: &str = "open";
pub const ACCRUAL_STATUS_CLOSED: &str = "closed";

pub const TRIAL_LEVEL_STEP: &str = "step";
pub const TRIAL_LEVEL_ARM: &str = "arm";
pub const TRIAL_LEVEL_DOSE: &str = "dose";

/// A trial document as stored in the trial store. Match trees can hang off
/// the step, arm, or dose level of the treatment hierarchy; each level's
/// `match` key holds a one-element array with the tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrialDocument {
	pub protocol_no: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub nct_id: Option<String>,
	#[serde(default)]
	pub treatment_list: TreatmentList,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub summary: Option<TrialSummary>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TreatmentList {
	#[serde(default)]
	pub step: Vec<TrialStep>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrialStep {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub step_code: Option<String>,
	#[serde(rename = "match", default, skip_serializing_if = "Vec::is_empty")]
	pub match_trees: Vec<Value>,
	#[serde(default)]
	pub arm: Vec<TrialArm>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrialArm {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub arm_code: Option<String>,
	#[serde(rename = "match", default, skip_serializing_if = "Vec::is_empty")]
	pub match_trees: Vec<Value>,
	#[serde(default)]
	pub dose_level: Vec<TrialDose>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrialDose {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub level_code: Option<String>,
	#[serde(rename = "match", default, skip_serializing_if = "Vec::is_empty")]
	pub match_trees: Vec<Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TrialSummary {
	#[serde(default)]
	pub status: Vec<TrialStatusEntry>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub coordinating_center: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrialStatusEntry {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<String>,
}

impl TrialDocument {
	/// Accrual status for this run's matches: closed unless the summary's
	/// first status entry reads "open to accrual" (case-insensitive). Trials
	/// without a summary status default to open.
	pub fn accrual_status(&self) -> &'static str {
		let status = self
			.summary
			.as_ref()
			.and_then(|summary| summary.status.first())
			.and_then(|entry| entry.value.as_deref());

		match status {
			Some(text) if !text.eq_ignore_ascii_case(TRIAL_STATUS_OPEN_TEXT) => {
				ACCRUAL_STATUS_CLOSED
			},
			_ => ACCRUAL_STATUS_OPEN,
		}
	}

	pub fn coordinating_center(&self) -> Option<&str> {
		self.summary.as_ref().and_then(|summary| summary.coordinating_center.as_deref())
	}
}
