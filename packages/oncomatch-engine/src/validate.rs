use oncomatch_domain::{
	sample::{VITAL_STATUS_ALIVE, VITAL_STATUS_DECEASED},
	trial::{
		ACCRUAL_STATUS_CLOSED, ACCRUAL_STATUS_OPEN, TRIAL_LEVEL_ARM, TRIAL_LEVEL_DOSE,
		TRIAL_LEVEL_STEP,
	},
	trial_match::{SORT_ORDER_UNRANKED, TrialMatchDocument},
};

use crate::{Error, Result};

/// Structural validation of an output document before persist. Failures are
/// fatal for the trial being processed, not for the run.
pub fn validate_document(doc: &TrialMatchDocument) -> Result<()> {
	if doc.sample_id.trim().is_empty() {
		return Err(invalid("sampleId must be non-empty"));
	}
	if doc.trial_protocol_no.trim().is_empty() {
		return Err(invalid("trialProtocolNo must be non-empty"));
	}
	if doc.mrn.trim().is_empty() {
		return Err(invalid("mrn must be non-empty"));
	}
	if ![VITAL_STATUS_ALIVE, VITAL_STATUS_DECEASED].contains(&doc.vital_status.as_str()) {
		return Err(invalid("vitalStatus must be alive or deceased"));
	}
	if ![ACCRUAL_STATUS_OPEN, ACCRUAL_STATUS_CLOSED].contains(&doc.trial_accrual_status.as_str())
	{
		return Err(invalid("trialAccrualStatus must be open or closed"));
	}
	if ![TRIAL_LEVEL_STEP, TRIAL_LEVEL_ARM, TRIAL_LEVEL_DOSE]
		.contains(&doc.match_reasons.trial_level.as_str())
	{
		return Err(invalid("trialLevel must be step, arm, or dose"));
	}
	if doc.sort_order < SORT_ORDER_UNRANKED {
		return Err(invalid("sortOrder must be the unranked sentinel or non-negative"));
	}

	for entry in &doc.match_reasons.mutations {
		if entry.mutation.hugo_symbol.trim().is_empty() {
			return Err(invalid("matched mutations must carry a hugoSymbol"));
		}
	}

	Ok(())
}

fn invalid(message: &str) -> Error {
	Error::Validation { message: message.to_string() }
}

#[cfg(test)]
mod tests {
	use oncomatch_domain::trial_match::MatchReasons;

	use super::*;

	fn doc() -> TrialMatchDocument {
		TrialMatchDocument {
			sample_id: "S1".to_string(),
			trial_protocol_no: "17-251".to_string(),
			mrn: "702146".to_string(),
			vital_status: "alive".to_string(),
			trial_accrual_status: "open".to_string(),
			sort_order: 0,
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

	#[test]
	fn accepts_a_well_formed_document() {
		assert!(validate_document(&doc()).is_ok());
	}

	#[test]
	fn rejects_unknown_statuses_and_levels() {
		let mut bad_vital = doc();

		bad_vital.vital_status = "unknown".to_string();

		assert!(validate_document(&bad_vital).is_err());

		let mut bad_accrual = doc();

		bad_accrual.trial_accrual_status = "paused".to_string();

		assert!(validate_document(&bad_accrual).is_err());

		let mut bad_level = doc();

		bad_level.match_reasons.trial_level = "cohort".to_string();

		assert!(validate_document(&bad_level).is_err());
	}

	#[test]
	fn rejects_an_empty_sample_id() {
		let mut bad = doc();

		bad.sample_id = " ".to_string();

		assert!(validate_document(&bad).is_err());
	}
}
