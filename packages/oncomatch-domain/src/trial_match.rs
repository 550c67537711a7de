use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
	criteria::MatchLevel,
	date_serde,
	sample::{Cnv, LowCoverage, Mutation, Sv, WildTypeGene},
};

/// Sort order assigned to documents whose (sample, protocol) group has no
/// member in the ranking computation subset.
pub const SORT_ORDER_UNRANKED: i64 = -1;

/// One trial-match output document: a sample matched against one match tree
/// of one trial, with the accumulated reasons for the match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialMatchDocument {
	pub sample_id: String,
	pub trial_protocol_no: String,
	pub mrn: String,
	pub vital_status: String,
	pub trial_accrual_status: String,
	pub sort_order: i64,
	pub match_reasons: MatchReasons,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub genomic_exclusion_reasons: Vec<GenomicExclusionReason>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub clinical_exclusion_reasons: Vec<ClinicalExclusionReason>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReasons {
	pub trial_level: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub trial_step_code: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub trial_arm_code: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub trial_dose_code: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub coordinating_center: Option<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub mutations: Vec<MatchedMutation>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub cnvs: Vec<Cnv>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub svs: Vec<Sv>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub wildtypes: Vec<WildTypeGene>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub signatures: Vec<SignatureReason>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub low_coverage: Vec<LowCoverage>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub diagnosis: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub diagnosis_level: Option<String>,
	#[serde(default, with = "date_serde::option", skip_serializing_if = "Option::is_none")]
	pub birth_date: Option<Date>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub age: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gender: Option<String>,
}

/// A matched mutation entry annotated with the criterion level that hit it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedMutation {
	#[serde(flatten)]
	pub mutation: Mutation,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub level: Option<MatchLevel>,
	pub inclusion_criteria: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureReason {
	pub signature_type: String,
	pub value: String,
}

/// Synthetic reason for a genomic exclusion hit: the criterion the sample
/// lacks, never the sample's own values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenomicExclusionReason {
	pub variant_category: String,
	pub hugo_symbol: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub protein_change: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reference_residue: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub transcript_exon: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub variant_classification: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cnv_call: Option<String>,
}
impl GenomicExclusionReason {
	pub fn gene_level(variant_category: &str, hugo_symbol: &str) -> Self {
		Self {
			variant_category: variant_category.to_string(),
			hugo_symbol: hugo_symbol.to_string(),
			protein_change: None,
			reference_residue: None,
			transcript_exon: None,
			variant_classification: None,
			cnv_call: None,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalExclusionReason {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub diagnosis: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub age: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gender: Option<String>,
}
