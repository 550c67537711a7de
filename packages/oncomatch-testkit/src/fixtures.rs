//! Builders for the documents the engine tests exercise.

use serde_json::{Value, json};
use time::{Date, macros::date};

use oncomatch_domain::{
	sample::{Cnv, Mutation, SampleDocument, Sv, WildTypeGene},
	taxonomy::DiagnosisTaxonomy,
	trial::TrialDocument,
};

/// A minimal tumor taxonomy covering the diagnoses used across the test
/// suites, with Blood and Lymph forming the liquid group.
pub struct FixtureTaxonomy;
impl FixtureTaxonomy {
	const EDGES: [(&'static str, Option<&'static str>); 10] = [
		("Tissue", None),
		("Lung", Some("Tissue")),
		("Lung Adenocarcinoma", Some("Lung")),
		("Small Cell Lung Cancer", Some("Lung")),
		("Skin", Some("Tissue")),
		("Melanoma", Some("Skin")),
		("Blood", Some("Tissue")),
		("Leukemia", Some("Blood")),
		("Lymph", Some("Tissue")),
		("Hodgkin Lymphoma", Some("Lymph")),
	];

	fn descendants(root: &str) -> Vec<String> {
		let mut out = vec![root.to_string()];
		let mut frontier = vec![root];

		while let Some(current) = frontier.pop() {
			for (name, parent) in Self::EDGES {
				if parent == Some(current) {
					out.push(name.to_string());
					frontier.push(name);
				}
			}
		}

		out.sort();
		out.dedup();

		out
	}
}
impl DiagnosisTaxonomy for FixtureTaxonomy {
	fn expand(&self, diagnosis: &str) -> Vec<String> {
		if Self::EDGES.iter().any(|(name, _)| *name == diagnosis) {
			Self::descendants(diagnosis)
		} else {
			vec![diagnosis.to_string()]
		}
	}

	fn liquid_diagnoses(&self) -> Vec<String> {
		let mut out = Self::descendants("Blood");

		out.extend(Self::descendants("Lymph"));
		out.sort();
		out.dedup();

		out
	}

	fn all_diagnoses(&self) -> Vec<String> {
		let mut out: Vec<String> = Self::EDGES.iter().map(|(name, _)| name.to_string()).collect();

		out.sort();

		out
	}
}

pub fn sample(sample_id: &str, diagnosis: &str) -> SampleDocument {
	SampleDocument {
		sample_id: sample_id.to_string(),
		mrn: format!("MRN-{sample_id}"),
		vital_status: "alive".to_string(),
		birth_date: date!(1980 - 06 - 15),
		oncotree_primary_diagnosis_name: diagnosis.to_string(),
		gender: Some("Female".to_string()),
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

pub fn with_birth_date(mut sample: SampleDocument, birth_date: Date) -> SampleDocument {
	sample.birth_date = birth_date;

	sample
}

pub fn mutation(gene: &str, protein_change: &str, tier: Option<i64>) -> Mutation {
	Mutation {
		hugo_symbol: gene.to_string(),
		protein_change: Some(protein_change.to_string()),
		reference_residue: None,
		transcript_exon: None,
		variant_classification: Some("Missense_Mutation".to_string()),
		tier,
		allele_fraction: None,
	}
}

pub fn cnv(gene: &str, call: &str) -> Cnv {
	Cnv {
		hugo_symbol: gene.to_string(),
		cnv_call: Some(call.to_string()),
		cytoband: None,
		copy_count: None,
	}
}

pub fn sv(comment: &str) -> Sv {
	Sv { structural_variant_comment: Some(comment.to_string()) }
}

pub fn wild_type(gene: &str) -> WildTypeGene {
	WildTypeGene { hugo_symbol: gene.to_string() }
}

/// A trial with one step-level match tree.
pub fn trial(protocol_no: &str, tree: Value) -> TrialDocument {
	trial_with_center(protocol_no, tree, "Dana-Farber Cancer Institute")
}

pub fn trial_with_center(protocol_no: &str, tree: Value, center: &str) -> TrialDocument {
	serde_json::from_value(json!({
		"protocol_no": protocol_no,
		"nct_id": "NCT00000000",
		"treatment_list": {
			"step": [
				{ "step_code": "1", "match": [tree], "arm": [] }
			]
		},
		"summary": {
			"status": [ { "value": "Open to Accrual" } ],
			"coordinating_center": center
		}
	}))
	.expect("fixture trial deserializes")
}

pub fn closed_trial(protocol_no: &str, tree: Value) -> TrialDocument {
	serde_json::from_value(json!({
		"protocol_no": protocol_no,
		"treatment_list": {
			"step": [
				{ "step_code": "1", "match": [tree], "arm": [] }
			]
		},
		"summary": {
			"status": [ { "value": "Closed to Accrual" } ],
			"coordinating_center": "Dana-Farber Cancer Institute"
		}
	}))
	.expect("fixture trial deserializes")
}
