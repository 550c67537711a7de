use serde_json::json;
use time::macros::date;

use oncomatch_domain::{
	criteria::MatchLevel,
	sample::{Mutation, SampleDocument},
	tree::{Graph, NodeType, ROOT_ID},
	trial::{ACCRUAL_STATUS_CLOSED, ACCRUAL_STATUS_OPEN, TrialDocument},
	trial_match::MatchedMutation,
};

#[test]
fn sample_documents_use_the_store_field_names() {
	let raw = json!({
		"sampleId": "DEV-01",
		"mrn": "702146",
		"vitalStatus": "alive",
		"birthDate": "1980-06-15",
		"oncotreePrimaryDiagnosisName": "Lung Adenocarcinoma",
		"gender": "Female",
		"mutations": [
			{ "hugoSymbol": "BRAF", "proteinChange": "p.V600E", "tier": 1 }
		],
		"polEStatus": "Yes"
	});
	let sample: SampleDocument = serde_json::from_value(raw).expect("deserializes");

	assert_eq!(sample.sample_id, "DEV-01");
	assert_eq!(sample.birth_date, date!(1980 - 06 - 15));
	assert_eq!(sample.mutations[0].protein_change.as_deref(), Some("p.V600E"));
	assert_eq!(sample.pol_e_status.as_deref(), Some("Yes"));

	let round = serde_json::to_value(&sample).expect("serializes");

	assert_eq!(round["birthDate"], "1980-06-15");
	assert_eq!(round["mutations"][0]["hugoSymbol"], "BRAF");
	assert_eq!(round["polEStatus"], "Yes");
	assert!(round.get("cnvs").is_some());
}

#[test]
fn matched_mutations_flatten_the_entry_and_carry_the_level() {
	let matched = MatchedMutation {
		mutation: Mutation {
			hugo_symbol: "BRAF".to_string(),
			protein_change: Some("p.V600E".to_string()),
			reference_residue: None,
			transcript_exon: None,
			variant_classification: None,
			tier: Some(1),
			allele_fraction: None,
		},
		level: Some(MatchLevel::Variant),
		inclusion_criteria: true,
	};
	let raw = serde_json::to_value(&matched).expect("serializes");

	assert_eq!(raw["hugoSymbol"], "BRAF");
	assert_eq!(raw["level"], "variant");
	assert_eq!(raw["inclusionCriteria"], true);
}

#[test]
fn trials_default_to_open_and_close_on_other_status_text() {
	let open: TrialDocument = serde_json::from_value(json!({
		"protocol_no": "17-251",
		"summary": { "status": [ { "value": "Open to Accrual" } ] }
	}))
	.expect("deserializes");
	let closed: TrialDocument = serde_json::from_value(json!({
		"protocol_no": "17-252",
		"summary": { "status": [ { "value": "Closed to Accrual" } ] }
	}))
	.expect("deserializes");
	let missing: TrialDocument =
		serde_json::from_value(json!({ "protocol_no": "17-253" })).expect("deserializes");

	assert_eq!(open.accrual_status(), ACCRUAL_STATUS_OPEN);
	assert_eq!(closed.accrual_status(), ACCRUAL_STATUS_CLOSED);
	assert_eq!(missing.accrual_status(), ACCRUAL_STATUS_OPEN);
}

#[test]
fn trial_treatment_hierarchy_parses_nested_match_trees() {
	let trial: TrialDocument = serde_json::from_value(json!({
		"protocol_no": "17-251",
		"nct_id": "NCT02296125",
		"treatment_list": {
			"step": [
				{
					"step_code": "1",
					"match": [ { "genomic": { "hugo_symbol": "BRAF" } } ],
					"arm": [
						{
							"arm_code": "A",
							"dose_level": [
								{
									"level_code": "A1",
									"match": [ { "clinical": { "oncotree_primary_diagnosis": "Melanoma" } } ]
								}
							]
						}
					]
				}
			]
		}
	}))
	.expect("deserializes");
	let step = &trial.treatment_list.step[0];

	assert_eq!(step.match_trees.len(), 1);
	assert_eq!(step.arm[0].dose_level[0].level_code.as_deref(), Some("A1"));
	assert_eq!(step.arm[0].dose_level[0].match_trees.len(), 1);
}

#[test]
fn graph_ids_are_contiguous_from_the_root() {
	let tree = json!({
		"or": [
			{ "genomic": { "hugo_symbol": "BRAF" } },
			{ "and": [
				{ "genomic": { "hugo_symbol": "KRAS" } },
				{ "clinical": { "oncotree_primary_diagnosis": "Melanoma" } },
			] },
		]
	});
	let graph = Graph::build(&tree).expect("builds");

	assert_eq!(graph.len(), 5);
	assert_eq!(graph.node(ROOT_ID).node_type, NodeType::Or);
	// Post-order: BRAF leaf, then the nested and-branch, then the root.
	assert_eq!(graph.post_order(), vec![2, 4, 5, 3, 1]);
}
