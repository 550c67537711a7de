use oncomatch_domain::{
	criteria::MatchLevel,
	query::{self, EntryCondition, Query, VariantList},
	sample::{SampleDocument, WildTypeGene},
	trial_match::MatchedMutation,
};

use crate::{Result, SampleStore, compile::Projection, record::MatchRecord};

/// Run a compiled query against the patient store and annotate every hit
/// with its provenance. The store round-trip is the engine's only suspension
/// point; everything after it is in-memory.
pub async fn execute(
	store: &dyn SampleStore,
	query: &Query,
	projection: &Projection,
) -> Result<Vec<MatchRecord>> {
	let samples = store.find(query).await?;

	Ok(samples.iter().map(|sample| annotate(sample, projection)).collect())
}

fn annotate(sample: &SampleDocument, projection: &Projection) -> MatchRecord {
	let mut record = MatchRecord::base(sample);

	match projection {
		Projection::Clinical { diagnosis_level, age, include_gender } => {
			record.diagnosis = Some(sample.oncotree_primary_diagnosis_name.clone());
			record.diagnosis_level = Some(*diagnosis_level);

			if let Some(age) = age {
				record.age = Some(age.clone());
				record.birth_date = Some(sample.birth_date);
			}
			if *include_gender {
				record.gender = sample.gender.clone();
			}
		},
		Projection::ClinicalExclusion { reason } => {
			record.clinical_exclusion_reasons.push(reason.clone());
		},
		Projection::GenomicInclusion { list, conditions, level } => {
			collect_matched_entries(sample, &mut record, *list, conditions, *level);
		},
		Projection::GenomicExclusion { reason } => {
			record.genomic_exclusion_reasons.push(reason.clone());
		},
		Projection::Signature { field, value } => {
			record.set_signature_value(*field, value.clone());
		},
		Projection::Wildtype { gene } => {
			let mut entries: Vec<_> = sample
				.wild_type_genes
				.iter()
				.filter(|entry| entry.hugo_symbol == *gene)
				.cloned()
				.collect();

			// Surface the absence as a wild-type reason even when the panel
			// did not report the gene explicitly.
			if entries.is_empty() {
				entries.push(WildTypeGene { hugo_symbol: gene.clone() });
			}

			record.wildtypes.extend(entries);
		},
	}

	record
}

fn collect_matched_entries(
	sample: &SampleDocument,
	record: &mut MatchRecord,
	list: VariantList,
	conditions: &[EntryCondition],
	level: Option<MatchLevel>,
) {
	let indices = query::matching_indices(sample, list, conditions);

	match list {
		VariantList::Mutations => {
			for index in indices {
				record.mutations.push(MatchedMutation {
					mutation: sample.mutations[index].clone(),
					level,
					inclusion_criteria: true,
				});
			}
		},
		VariantList::Cnvs => {
			for index in indices {
				record.cnvs.push(sample.cnvs[index].clone());
			}
		},
		VariantList::Svs => {
			for index in indices {
				record.svs.push(sample.svs[index].clone());
			}
		},
		VariantList::WildTypeGenes => {
			for index in indices {
				record.wildtypes.push(sample.wild_type_genes[index].clone());
			}
		},
		VariantList::LowCoverage => {
			for index in indices {
				record.low_coverage.push(sample.low_coverage[index].clone());
			}
		},
	}
}

#[cfg(test)]
mod tests {
	use time::macros::date;

	use oncomatch_domain::{
		criteria::MatchLevel,
		query::{EntryCondition, EntryField, FieldPredicate},
		sample::Mutation,
		trial_match::GenomicExclusionReason,
	};

	use super::*;

	fn sample() -> SampleDocument {
		SampleDocument {
			sample_id: "S1".to_string(),
			mrn: "M1".to_string(),
			vital_status: "alive".to_string(),
			birth_date: date!(1980 - 01 - 01),
			oncotree_primary_diagnosis_name: "Melanoma".to_string(),
			gender: Some("Female".to_string()),
			mutations: vec![
				Mutation {
					hugo_symbol: "BRAF".to_string(),
					protein_change: Some("p.V600E".to_string()),
					reference_residue: None,
					transcript_exon: None,
					variant_classification: None,
					tier: Some(1),
					allele_fraction: None,
				},
				Mutation {
					hugo_symbol: "KRAS".to_string(),
					protein_change: Some("p.G12C".to_string()),
					reference_residue: None,
					transcript_exon: None,
					variant_classification: None,
					tier: Some(2),
					allele_fraction: None,
				},
			],
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

	#[test]
	fn inclusion_annotation_keeps_only_matched_entries() {
		let projection = Projection::GenomicInclusion {
			list: VariantList::Mutations,
			conditions: vec![EntryCondition::new(
				EntryField::HugoSymbol,
				FieldPredicate::Eq("BRAF".to_string()),
			)],
			level: Some(MatchLevel::Gene),
		};
		let record = annotate(&sample(), &projection);

		assert_eq!(record.sample_id, "S1");
		assert_eq!(record.mutations.len(), 1);
		assert_eq!(record.mutations[0].mutation.hugo_symbol, "BRAF");
		assert_eq!(record.mutations[0].level, Some(MatchLevel::Gene));
		assert!(record.mutations[0].inclusion_criteria);
	}

	#[test]
	fn exclusion_annotation_carries_the_synthetic_reason_only() {
		let projection = Projection::GenomicExclusion {
			reason: GenomicExclusionReason::gene_level("MUTATION", "NTRK1"),
		};
		let record = annotate(&sample(), &projection);

		assert!(record.mutations.is_empty());
		assert_eq!(record.genomic_exclusion_reasons.len(), 1);
		assert_eq!(record.genomic_exclusion_reasons[0].hugo_symbol, "NTRK1");
	}

	#[test]
	fn wildtype_annotation_synthesizes_an_entry_when_the_panel_lacks_one() {
		let projection = Projection::Wildtype { gene: "NRAS".to_string() };
		let record = annotate(&sample(), &projection);

		assert_eq!(record.wildtypes.len(), 1);
		assert_eq!(record.wildtypes[0].hugo_symbol, "NRAS");
	}
}
