use time::Date;

use oncomatch_domain::{
	criteria::{DiagnosisLevel, SignatureField},
	sample::{Cnv, LowCoverage, SampleDocument, Sv, WildTypeGene},
	trial_match::{
		ClinicalExclusionReason, GenomicExclusionReason, MatchedMutation, SignatureReason,
	},
};

/// One sample's annotated entry in a node's match result. Every record
/// carries the identity triple; the remaining fields accumulate as AND/OR
/// combination merges child results.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchRecord {
	pub sample_id: String,
	pub mrn: String,
	pub vital_status: String,
	pub diagnosis: Option<String>,
	pub diagnosis_level: Option<DiagnosisLevel>,
	pub birth_date: Option<Date>,
	pub age: Option<String>,
	pub gender: Option<String>,
	pub mmr_status: Option<String>,
	pub ms_status: Option<String>,
	pub tobacco_status: Option<String>,
	pub tmz_status: Option<String>,
	pub pol_e_status: Option<String>,
	pub apobec_status: Option<String>,
	pub uva_status: Option<String>,
	pub mutations: Vec<MatchedMutation>,
	pub cnvs: Vec<Cnv>,
	pub svs: Vec<Sv>,
	pub wildtypes: Vec<WildTypeGene>,
	pub low_coverage: Vec<LowCoverage>,
	pub genomic_exclusion_reasons: Vec<GenomicExclusionReason>,
	pub clinical_exclusion_reasons: Vec<ClinicalExclusionReason>,
}
impl MatchRecord {
	pub fn base(sample: &SampleDocument) -> Self {
		Self {
			sample_id: sample.sample_id.clone(),
			mrn: sample.mrn.clone(),
			vital_status: sample.vital_status.clone(),
			diagnosis: None,
			diagnosis_level: None,
			birth_date: None,
			age: None,
			gender: None,
			mmr_status: None,
			ms_status: None,
			tobacco_status: None,
			tmz_status: None,
			pol_e_status: None,
			apobec_status: None,
			uva_status: None,
			mutations: Vec::new(),
			cnvs: Vec::new(),
			svs: Vec::new(),
			wildtypes: Vec::new(),
			low_coverage: Vec::new(),
			genomic_exclusion_reasons: Vec::new(),
			clinical_exclusion_reasons: Vec::new(),
		}
	}

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

	pub fn set_signature_value(&mut self, field: SignatureField, value: String) {
		let slot = match field {
			SignatureField::Mmr => &mut self.mmr_status,
			SignatureField::Ms => &mut self.ms_status,
			SignatureField::Tobacco => &mut self.tobacco_status,
			SignatureField::Tmz => &mut self.tmz_status,
			SignatureField::PolE => &mut self.pol_e_status,
			SignatureField::Apobec => &mut self.apobec_status,
			SignatureField::Uva => &mut self.uva_status,
		};

		*slot = Some(value);
	}

	/// The set signature scalars as trial-match signature reasons, in the
	/// fixed field order.
	pub fn signature_reasons(&self) -> Vec<SignatureReason> {
		SignatureField::ALL
			.into_iter()
			.filter_map(|field| {
				self.signature_value(field).map(|value| SignatureReason {
					signature_type: field.document_key().to_string(),
					value: value.to_string(),
				})
			})
			.collect()
	}
}
