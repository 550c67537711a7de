use std::collections::BTreeSet;

use serde_json::{Map, Value};
use time::Date;

use oncomatch_domain::{
	age::AgeCriterion,
	criteria::{self, DiagnosisLevel},
	query::Query,
	taxonomy::DiagnosisTaxonomy,
};

use crate::{
	Error, Result,
	compile::{CompiledLeaf, projection::ProjectionBuilder},
};

/// Compiles clinical leaves: a conjunction of diagnosis (required), age, and
/// gender criteria.
pub struct ClinicalCriteria<'a> {
	taxonomy: &'a dyn DiagnosisTaxonomy,
	today: Date,
}
impl<'a> ClinicalCriteria<'a> {
	pub fn new(taxonomy: &'a dyn DiagnosisTaxonomy, today: Date) -> Self {
		Self { taxonomy, today }
	}

	pub fn compile(
		&self,
		value: &Map<String, Value>,
		projection: &ProjectionBuilder,
	) -> Result<CompiledLeaf> {
		let raw_diagnosis = value
			.get(criteria::MT_DIAGNOSIS)
			.ok_or_else(|| Error::MissingRequiredField {
				field: criteria::MT_DIAGNOSIS.to_string(),
			})?
			.as_str()
			.ok_or_else(|| Error::UnrecognizedCriteria {
				message: format!("{} must be a string", criteria::MT_DIAGNOSIS),
			})?;
		let include = criteria::assess_inclusion(raw_diagnosis);
		let term = criteria::sanitize_exclusion(raw_diagnosis);
		let (names, diagnosis_level) = self.expand_diagnosis(term);
		let mut parts = vec![if include {
			Query::DiagnosisIn { names }
		} else {
			Query::DiagnosisNotIn { names }
		}];
		let mut age = None;

		if let Some(raw_age) = value.get(criteria::MT_AGE) {
			let raw_age = raw_age.as_str().ok_or_else(|| Error::UnrecognizedCriteria {
				message: format!("{} must be a string", criteria::MT_AGE),
			})?;
			let criterion = AgeCriterion::parse(raw_age)?;
			let threshold = criterion.birth_date_threshold(self.today)?;

			parts.push(Query::BirthDate {
				comparison: criterion.birth_date_comparison(),
				threshold,
			});

			age = Some(raw_age.to_string());
		}

		let include_gender = if let Some(raw_gender) = value.get(criteria::MT_GENDER) {
			let raw_gender = raw_gender.as_str().ok_or_else(|| Error::UnrecognizedCriteria {
				message: format!("{} must be a string", criteria::MT_GENDER),
			})?;

			parts.push(Query::GenderIs { gender: raw_gender.to_string() });

			true
		} else {
			false
		};

		Ok(CompiledLeaf {
			query: Query::And(parts),
			projection: projection.clinical(diagnosis_level, age, include_gender),
		})
	}

	/// Expand the diagnosis term into its membership set. Specific names
	/// expand to themselves plus all descendants; the group markers expand to
	/// the liquid set or its complement over all known diagnoses.
	fn expand_diagnosis(&self, term: &str) -> (BTreeSet<String>, DiagnosisLevel) {
		match term {
			criteria::ALL_LIQUID => {
				(self.taxonomy.liquid_diagnoses().into_iter().collect(), DiagnosisLevel::Liquid)
			},
			criteria::ALL_SOLID => {
				let liquid: BTreeSet<String> =
					self.taxonomy.liquid_diagnoses().into_iter().collect();
				let solid = self
					.taxonomy
					.all_diagnoses()
					.into_iter()
					.filter(|name| !liquid.contains(name))
					.collect();

				(solid, DiagnosisLevel::Solid)
			},
			_ => (self.taxonomy.expand(term).into_iter().collect(), DiagnosisLevel::Specific),
		}
	}
}
