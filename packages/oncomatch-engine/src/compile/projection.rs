use oncomatch_domain::{
	criteria::{DiagnosisLevel, MatchLevel, SignatureField},
	query::{EntryCondition, VariantList},
	trial_match::{ClinicalExclusionReason, GenomicExclusionReason},
};

/// Per-leaf provenance: how matching records are annotated. Inclusion
/// projections collect the matched sub-entries; exclusion projections attach
/// a synthetic reason describing the criterion the sample lacks.
#[derive(Clone, Debug)]
pub enum Projection {
	/// Copy the queried clinical scalars from the sample onto the record.
	Clinical { diagnosis_level: DiagnosisLevel, age: Option<String>, include_gender: bool },
	ClinicalExclusion { reason: ClinicalExclusionReason },
	GenomicInclusion {
		list: VariantList,
		conditions: Vec<EntryCondition>,
		level: Option<MatchLevel>,
	},
	GenomicExclusion { reason: GenomicExclusionReason },
	Signature { field: SignatureField, value: String },
	Wildtype { gene: String },
}

/// Constructs projections for the clinical and genomic compilers.
pub struct ProjectionBuilder;
impl ProjectionBuilder {
	pub fn new() -> Self {
		Self
	}

	pub fn clinical(
		&self,
		diagnosis_level: DiagnosisLevel,
		age: Option<String>,
		include_gender: bool,
	) -> Projection {
		Projection::Clinical { diagnosis_level, age, include_gender }
	}

	pub fn clinical_exclusion(&self, reason: ClinicalExclusionReason) -> Projection {
		Projection::ClinicalExclusion { reason }
	}

	pub fn genomic_inclusion(
		&self,
		list: VariantList,
		conditions: Vec<EntryCondition>,
		level: Option<MatchLevel>,
	) -> Projection {
		Projection::GenomicInclusion { list, conditions, level }
	}

	pub fn genomic_exclusion(&self, reason: GenomicExclusionReason) -> Projection {
		Projection::GenomicExclusion { reason }
	}

	pub fn signature(&self, field: SignatureField, value: String) -> Projection {
		Projection::Signature { field, value }
	}

	pub fn wildtype(&self, gene: String) -> Projection {
		Projection::Wildtype { gene }
	}
}
impl Default for ProjectionBuilder {
	fn default() -> Self {
		Self::new()
	}
}
