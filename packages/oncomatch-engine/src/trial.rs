use serde_json::Value;

use oncomatch_domain::{
	trial::{TRIAL_LEVEL_ARM, TRIAL_LEVEL_DOSE, TRIAL_LEVEL_STEP, TrialDocument},
	trial_match::{MatchReasons, TrialMatchDocument},
};

use crate::record::MatchRecord;

/// One match tree pulled from a trial, with the identity of the treatment
/// level it hangs off.
#[derive(Clone, Debug)]
pub struct MatchTreeContext {
	pub protocol_no: String,
	pub accrual_status: String,
	pub trial_level: String,
	pub step_code: Option<String>,
	pub arm_code: Option<String>,
	pub dose_code: Option<String>,
	pub coordinating_center: Option<String>,
	pub tree: Value,
}
impl MatchTreeContext {
	/// Compact step/arm/dose label for run logging.
	pub fn tree_code(&self) -> String {
		[&self.step_code, &self.arm_code, &self.dose_code]
			.into_iter()
			.flatten()
			.cloned()
			.collect::<Vec<_>>()
			.join(".")
	}
}

/// Walk the treatment hierarchy and pull out every match tree. Trees can
/// hang off step, arm, or dose levels; each level contributes its code and
/// the first tree of its `match` array, as curated.
pub fn extract_match_trees(trial: &TrialDocument) -> Vec<MatchTreeContext> {
	let accrual_status = trial.accrual_status().to_string();
	let coordinating_center = trial.coordinating_center().map(str::to_string);
	let mut contexts = Vec::new();
	let context = |level: &str,
	               step: Option<&str>,
	               arm: Option<&str>,
	               dose: Option<&str>,
	               tree: &Value| MatchTreeContext {
		protocol_no: trial.protocol_no.clone(),
		accrual_status: accrual_status.clone(),
		trial_level: level.to_string(),
		step_code: step.map(str::to_string),
		arm_code: arm.map(str::to_string),
		dose_code: dose.map(str::to_string),
		coordinating_center: coordinating_center.clone(),
		tree: tree.clone(),
	};

	for step in &trial.treatment_list.step {
		let step_code = step.step_code.as_deref();

		if let Some(tree) = step.match_trees.first() {
			contexts.push(context(TRIAL_LEVEL_STEP, step_code, None, None, tree));
		}

		for arm in &step.arm {
			let arm_code = arm.arm_code.as_deref();

			if let Some(tree) = arm.match_trees.first() {
				contexts.push(context(TRIAL_LEVEL_ARM, step_code, arm_code, None, tree));
			}

			for dose in &arm.dose_level {
				if let Some(tree) = dose.match_trees.first() {
					contexts.push(context(
						TRIAL_LEVEL_DOSE,
						step_code,
						arm_code,
						dose.level_code.as_deref(),
						tree,
					));
				}
			}
		}
	}

	contexts
}

/// Turn a match tree's root result into trial-match documents, stamping the
/// trial identity onto each record. Sort order is assigned later by the
/// ranker.
pub fn create_trial_match_documents(
	records: Vec<MatchRecord>,
	context: &MatchTreeContext,
) -> Vec<TrialMatchDocument> {
	records
		.into_iter()
		.map(|record| {
			let signatures = record.signature_reasons();

			TrialMatchDocument {
				sample_id: record.sample_id,
				trial_protocol_no: context.protocol_no.clone(),
				mrn: record.mrn,
				vital_status: record.vital_status,
				trial_accrual_status: context.accrual_status.clone(),
				sort_order: 0,
				match_reasons: MatchReasons {
					trial_level: context.trial_level.clone(),
					trial_step_code: context.step_code.clone(),
					trial_arm_code: context.arm_code.clone(),
					trial_dose_code: context.dose_code.clone(),
					coordinating_center: context.coordinating_center.clone(),
					mutations: record.mutations,
					cnvs: record.cnvs,
					svs: record.svs,
					wildtypes: record.wildtypes,
					signatures,
					low_coverage: record.low_coverage,
					diagnosis: record.diagnosis,
					diagnosis_level: record.diagnosis_level.map(|level| level.as_str().to_string()),
					birth_date: record.birth_date,
					age: record.age,
					gender: record.gender,
				},
				genomic_exclusion_reasons: record.genomic_exclusion_reasons,
				clinical_exclusion_reasons: record.clinical_exclusion_reasons,
			}
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn trial() -> TrialDocument {
		serde_json::from_value(json!({
			"protocol_no": "17-251",
			"treatment_list": {
				"step": [
					{
						"step_code": "1",
						"match": [ { "genomic": { "hugo_symbol": "BRAF" } } ],
						"arm": [
							{
								"arm_code": "A",
								"match": [ { "genomic": { "hugo_symbol": "KRAS" } } ],
								"dose_level": [
									{
										"level_code": "A1",
										"match": [ { "genomic": { "hugo_symbol": "EGFR" } } ]
									}
								]
							},
							{ "arm_code": "B", "dose_level": [] }
						]
					}
				]
			},
			"summary": {
				"status": [ { "value": "open to accrual" } ],
				"coordinating_center": "Dana-Farber Cancer Institute"
			}
		}))
		.expect("trial deserializes")
	}

	#[test]
	fn trees_are_extracted_from_every_level_that_carries_one() {
		let contexts = extract_match_trees(&trial());
		let levels: Vec<&str> = contexts.iter().map(|c| c.trial_level.as_str()).collect();

		assert_eq!(levels, vec!["step", "arm", "dose"]);
		assert_eq!(contexts[1].arm_code.as_deref(), Some("A"));
		assert_eq!(contexts[2].dose_code.as_deref(), Some("A1"));
		assert_eq!(contexts[2].tree_code(), "1.A.A1");
		assert!(contexts.iter().all(|c| c.accrual_status == "open"));
	}

	#[test]
	fn arms_without_trees_contribute_nothing() {
		let contexts = extract_match_trees(&trial());

		assert!(!contexts.iter().any(|c| c.arm_code.as_deref() == Some("B")));
	}
}
