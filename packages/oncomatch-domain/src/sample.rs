use serde::{Deserialize, Serialize};
use time::Date;

use crate::{criteria::SignatureField, date_serde};

pub const VITAL_STATUS_ALIVE: &str = "alive";
pub const VITAL_STATUS_DECEASED: &str = "deceased";

/// One patient sample as stored in the patient store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleDocument {
	pub sample_id: String,
	pub mrn: String,
	pub vital_status: String,
	#[serde(with = "date_serde")]
	pub birth_date: Date,
	pub oncotree_primary_diagnosis_name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gender: Option<String>,
	#[serde(default)]
	pub mutations: Vec<Mutation>,
	#[serde(default)]
	pub cnvs: Vec<Cnv>,
	#[serde(default)]
	pub svs: Vec<Sv>,
	#[serde(default)]
	pub wild_type_genes: Vec<WildTypeGene>,
	#[serde(default)]
	pub low_coverage: Vec<LowCoverage>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub mmr_status: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ms_status: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tobacco_status: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tmz_status: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pol_e_status: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub apobec_status: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub uva_status: Option<String>,
}
impl SampleDocument {
	pub fn signature_value(&self, field: SignatureField) -> Option<&str> {
		match field {
			SignatureField::Mmr => self.mmr_status.as_deref(),
			SignatureField::Ms => self.ms_status.as_deref(),
			SignatureField::Tobacco => self.tobacco_status.as_deref(),
			SignatureField::Tmz => self.tmz_status.as_deref(),
			SignatureField::PolE => self.pol_e_status.as_deref(),
			SignatureField::Apobec => self.apobec_status.as_deref(),
			SignatureField::Uva => self.uva_status.as_deref(),
		}
	}

	pub fn is_alive(&self) -> bool {
		self.vital_status == VITAL_STATUS_ALIVE
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mutation {
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
	pub tier: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub allele_fraction: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cnv {
	pub hugo_symbol: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cnv_call: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cytoband: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub copy_count: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sv {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub structural_variant_comment: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WildTypeGene {
	pub hugo_symbol: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowCoverage {
	pub hugo_symbol: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub coverage_type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub codon: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub exon: Option<i64>,
}
