pub mod clinical;
pub mod genomic;
pub mod projection;

pub use projection::Projection;

use time::Date;

use oncomatch_domain::{
	query::Query,
	taxonomy::DiagnosisTaxonomy,
	tree::{GraphNode, NodeType},
};

use crate::{Error, Result};

/// A leaf compiled into its query plus inclusion/exclusion provenance.
#[derive(Clone, Debug)]
pub struct CompiledLeaf {
	pub query: Query,
	pub projection: Projection,
}

/// Compiles leaf criteria into queries. The clinical, genomic, and
/// projection helpers are separate components injected here; they share no
/// state beyond what the builder passes them.
pub struct QueryBuilder<'a> {
	clinical: clinical::ClinicalCriteria<'a>,
	genomic: genomic::GenomicCriteria,
	projection: projection::ProjectionBuilder,
}
impl<'a> QueryBuilder<'a> {
	/// `today` anchors age criteria; it is captured once per run so every
	/// tree in the run sees the same evaluation date.
	pub fn new(taxonomy: &'a dyn DiagnosisTaxonomy, today: Date) -> Self {
		Self {
			clinical: clinical::ClinicalCriteria::new(taxonomy, today),
			genomic: genomic::GenomicCriteria::new(),
			projection: projection::ProjectionBuilder::new(),
		}
	}

	pub fn compile_leaf(&self, node: &GraphNode) -> Result<CompiledLeaf> {
		let value = node.value.as_ref().ok_or_else(|| Error::MalformedTree {
			message: format!("node {} has no criteria mapping", node.id),
		})?;

		match node.node_type {
			NodeType::Clinical => self.clinical.compile(value, &self.projection),
			NodeType::Genomic => self.genomic.compile(value, &self.projection),
			NodeType::And | NodeType::Or => Err(Error::MalformedTree {
				message: format!("node {} is a combinator, not a leaf", node.id),
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeSet;

	use serde_json::json;
	use time::macros::date;

	use oncomatch_domain::{
		criteria::MatchLevel,
		query::VariantList,
		sample::{Mutation, SampleDocument},
		taxonomy::DiagnosisTaxonomy,
		tree::{Graph, ROOT_ID},
	};

	use super::*;

	struct FlatTaxonomy;
	impl DiagnosisTaxonomy for FlatTaxonomy {
		fn expand(&self, diagnosis: &str) -> Vec<String> {
			match diagnosis {
				"Lung" => vec!["Lung".to_string(), "Lung Adenocarcinoma".to_string()],
				other => vec![other.to_string()],
			}
		}

		fn liquid_diagnoses(&self) -> Vec<String> {
			vec!["Hodgkin Lymphoma".to_string(), "Leukemia".to_string()]
		}

		fn all_diagnoses(&self) -> Vec<String> {
			vec![
				"Hodgkin Lymphoma".to_string(),
				"Leukemia".to_string(),
				"Lung".to_string(),
				"Lung Adenocarcinoma".to_string(),
				"Melanoma".to_string(),
			]
		}
	}

	fn builder(taxonomy: &FlatTaxonomy) -> QueryBuilder<'_> {
		QueryBuilder::new(taxonomy, date!(2026 - 06 - 15))
	}

	fn leaf(tree: serde_json::Value) -> GraphNode {
		Graph::build(&tree).expect("builds").node(ROOT_ID).clone()
	}

	fn sample(diagnosis: &str, mutations: Vec<Mutation>) -> SampleDocument {
		SampleDocument {
			sample_id: "S1".to_string(),
			mrn: "M1".to_string(),
			vital_status: "alive".to_string(),
			birth_date: date!(1980 - 01 - 01),
			oncotree_primary_diagnosis_name: diagnosis.to_string(),
			gender: Some("Female".to_string()),
			mutations,
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

	fn braf(protein_change: &str) -> Mutation {
		Mutation {
			hugo_symbol: "BRAF".to_string(),
			protein_change: Some(protein_change.to_string()),
			reference_residue: None,
			transcript_exon: None,
			variant_classification: None,
			tier: None,
			allele_fraction: None,
		}
	}

	#[test]
	fn clinical_leaves_require_a_diagnosis() {
		let taxonomy = FlatTaxonomy;
		let node = leaf(json!({ "clinical": { "age_numerical": ">=18" } }));

		assert!(matches!(
			builder(&taxonomy).compile_leaf(&node),
			Err(Error::MissingRequiredField { .. })
		));
	}

	#[test]
	fn specific_diagnoses_expand_to_descendants() {
		let taxonomy = FlatTaxonomy;
		let node = leaf(json!({ "clinical": { "oncotree_primary_diagnosis": "Lung" } }));
		let compiled = builder(&taxonomy).compile_leaf(&node).expect("compiles");
		let expected: BTreeSet<String> =
			["Lung".to_string(), "Lung Adenocarcinoma".to_string()].into_iter().collect();

		match compiled.query {
			Query::And(parts) => match &parts[0] {
				Query::DiagnosisIn { names } => assert_eq!(names, &expected),
				other => panic!("expected a membership query, got {other:?}"),
			},
			other => panic!("expected a conjunction, got {other:?}"),
		}
	}

	#[test]
	fn negated_diagnoses_compile_to_the_complement_query() {
		let taxonomy = FlatTaxonomy;
		let node = leaf(json!({ "clinical": { "oncotree_primary_diagnosis": "!Melanoma" } }));
		let compiled = builder(&taxonomy).compile_leaf(&node).expect("compiles");
		let melanoma = sample("Melanoma", Vec::new());
		let lung = sample("Lung Adenocarcinoma", Vec::new());

		assert!(!compiled.query.matches(&melanoma));
		assert!(compiled.query.matches(&lung));
		// The complement query keeps an inclusion-style projection: no
		// clinical exclusion reason is attached to surviving samples.
		assert!(matches!(compiled.projection, Projection::Clinical { .. }));
	}

	#[test]
	fn solid_marker_expands_to_the_complement_of_the_liquid_set() {
		let taxonomy = FlatTaxonomy;
		let node = leaf(json!({ "clinical": { "oncotree_primary_diagnosis": "_SOLID_" } }));
		let compiled = builder(&taxonomy).compile_leaf(&node).expect("compiles");

		assert!(compiled.query.matches(&sample("Melanoma", Vec::new())));
		assert!(!compiled.query.matches(&sample("Hodgkin Lymphoma", Vec::new())));
	}

	#[test]
	fn gene_level_criteria_compile_to_an_element_match() {
		let taxonomy = FlatTaxonomy;
		let node = leaf(json!({
			"genomic": { "hugo_symbol": "BRAF", "variant_category": "Mutation" }
		}));
		let compiled = builder(&taxonomy).compile_leaf(&node).expect("compiles");

		assert!(compiled.query.matches(&sample("Melanoma", vec![braf("p.V600E")])));
		assert!(!compiled.query.matches(&sample("Melanoma", Vec::new())));

		match compiled.projection {
			Projection::GenomicInclusion { list, level, .. } => {
				assert_eq!(list, VariantList::Mutations);
				assert_eq!(level, Some(MatchLevel::Gene));
			},
			other => panic!("expected an inclusion projection, got {other:?}"),
		}
	}

	#[test]
	fn inclusion_and_exclusion_partition_any_patient_set() {
		let taxonomy = FlatTaxonomy;
		let include = leaf(json!({
			"genomic": {
				"hugo_symbol": "BRAF",
				"variant_category": "Mutation",
				"protein_change": "p.V600E"
			}
		}));
		let exclude = leaf(json!({
			"genomic": {
				"hugo_symbol": "BRAF",
				"variant_category": "!Mutation",
				"protein_change": "p.V600E"
			}
		}));
		let b = builder(&taxonomy);
		let include = b.compile_leaf(&include).expect("compiles");
		let exclude = b.compile_leaf(&exclude).expect("compiles");
		let patients = [
			sample("Melanoma", Vec::new()),
			sample("Melanoma", vec![braf("p.V600E")]),
			sample("Melanoma", vec![braf("p.V600K")]),
			sample("Melanoma", vec![braf("p.V600E"), braf("p.V600K")]),
		];

		for patient in &patients {
			let included = include.query.matches(patient);
			let excluded = exclude.query.matches(patient);

			assert!(included != excluded, "partition violated for {patient:?}");
		}
	}

	#[test]
	fn exclusion_projection_carries_the_criterion_not_the_sample() {
		let taxonomy = FlatTaxonomy;
		let node = leaf(json!({
			"genomic": {
				"hugo_symbol": "BRAF",
				"variant_category": "!Mutation",
				"protein_change": "p.V600E"
			}
		}));
		let compiled = builder(&taxonomy).compile_leaf(&node).expect("compiles");

		match compiled.projection {
			Projection::GenomicExclusion { reason } => {
				assert_eq!(reason.variant_category, "MUTATION");
				assert_eq!(reason.hugo_symbol, "BRAF");
				assert_eq!(reason.protein_change.as_deref(), Some("p.V600E"));
			},
			other => panic!("expected an exclusion projection, got {other:?}"),
		}
	}

	#[test]
	fn wildcard_criteria_use_the_reference_residue() {
		let taxonomy = FlatTaxonomy;
		let node = leaf(json!({
			"genomic": {
				"hugo_symbol": "BRAF",
				"variant_category": "Mutation",
				"wildcard_protein_change": "p.V600"
			}
		}));
		let compiled = builder(&taxonomy).compile_leaf(&node).expect("compiles");

		assert!(compiled.query.matches(&sample("Melanoma", vec![braf("p.V600E")])));
		assert!(compiled.query.matches(&sample("Melanoma", vec![braf("p.V600D")])));
		assert!(!compiled.query.matches(&sample("Melanoma", vec![braf("p.V6001")])));

		match compiled.projection {
			Projection::GenomicInclusion { level, .. } => {
				assert_eq!(level, Some(MatchLevel::Wildcard));
			},
			other => panic!("expected an inclusion projection, got {other:?}"),
		}
	}

	#[test]
	fn exon_criteria_accept_an_optional_variant_class() {
		let taxonomy = FlatTaxonomy;
		let node = leaf(json!({
			"genomic": {
				"hugo_symbol": "EGFR",
				"variant_category": "Mutation",
				"exon": 19,
				"variant_classification": "In_Frame_Del"
			}
		}));
		let compiled = builder(&taxonomy).compile_leaf(&node).expect("compiles");
		let mut hit = sample("Melanoma", Vec::new());

		hit.mutations.push(Mutation {
			hugo_symbol: "EGFR".to_string(),
			protein_change: Some("p.E746_A750del".to_string()),
			reference_residue: None,
			transcript_exon: Some(19),
			variant_classification: Some("In_Frame_Del".to_string()),
			tier: None,
			allele_fraction: None,
		});

		let mut wrong_class = hit.clone();

		wrong_class.mutations[0].variant_classification = Some("Missense_Mutation".to_string());

		assert!(compiled.query.matches(&hit));
		assert!(!compiled.query.matches(&wrong_class));
	}

	#[test]
	fn signature_criteria_normalize_trial_vocabulary() {
		let taxonomy = FlatTaxonomy;
		let node = leaf(json!({ "genomic": { "mmr_status": "MMR-Deficient" } }));
		let compiled = builder(&taxonomy).compile_leaf(&node).expect("compiles");
		let mut hit = sample("Melanoma", Vec::new());

		hit.mmr_status = Some("Deficient".to_string());

		assert!(compiled.query.matches(&hit));
		assert!(!compiled.query.matches(&sample("Melanoma", Vec::new())));
	}

	#[test]
	fn wildtype_criteria_require_absence_from_mutations_and_cnvs() {
		let taxonomy = FlatTaxonomy;
		let node = leaf(json!({ "genomic": { "hugo_symbol": "BRAF", "wildtype": true } }));
		let compiled = builder(&taxonomy).compile_leaf(&node).expect("compiles");

		assert!(compiled.query.matches(&sample("Melanoma", Vec::new())));
		assert!(!compiled.query.matches(&sample("Melanoma", vec![braf("p.V600E")])));
	}

	#[test]
	fn unmatched_key_sets_are_rejected() {
		let taxonomy = FlatTaxonomy;
		let node = leaf(json!({ "genomic": { "cytoband": "7q34" } }));

		assert!(matches!(
			builder(&taxonomy).compile_leaf(&node),
			Err(Error::UnrecognizedCriteria { .. })
		));
	}
}
