use std::collections::BTreeSet;

use regex::Regex;
use time::Date;

use crate::{
	age::DateComparison,
	criteria::{self, SignatureField},
	sample::{Cnv, LowCoverage, Mutation, SampleDocument, Sv, WildTypeGene},
};

/// The variant-category list a per-element condition applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariantList {
	Mutations,
	Cnvs,
	Svs,
	WildTypeGenes,
	LowCoverage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryField {
	HugoSymbol,
	ProteinChange,
	ReferenceResidue,
	TranscriptExon,
	VariantClassification,
	CnvCall,
	SvComment,
}

#[derive(Clone, Debug)]
pub enum FieldPredicate {
	Eq(String),
	/// Matches differing values and absent fields alike.
	Ne(String),
	EqInt(i64),
	NeInt(i64),
	Matches(Regex),
}

#[derive(Clone, Debug)]
pub struct EntryCondition {
	pub field: EntryField,
	pub predicate: FieldPredicate,
}
impl EntryCondition {
	pub fn new(field: EntryField, predicate: FieldPredicate) -> Self {
		Self { field, predicate }
	}
}

/// A compiled leaf or combinator query, evaluated per element for
/// list-valued fields: a plain field inequality would be incorrect there.
#[derive(Clone, Debug)]
pub enum Query {
	And(Vec<Query>),
	Or(Vec<Query>),
	DiagnosisIn { names: BTreeSet<String> },
	DiagnosisNotIn { names: BTreeSet<String> },
	BirthDate { comparison: DateComparison, threshold: Date },
	GenderIs { gender: String },
	/// Some element of the list satisfies every condition.
	ElemMatch { list: VariantList, conditions: Vec<EntryCondition> },
	/// No element of the list satisfies every condition.
	NoElemMatch { list: VariantList, conditions: Vec<EntryCondition> },
	ListEmpty { list: VariantList },
	SignatureIs { field: SignatureField, value: String },
	/// The gene appears in neither the mutation nor the CNV list.
	GeneAbsent { gene: String },
}
impl Query {
	pub fn matches(&self, sample: &SampleDocument) -> bool {
		match self {
			Self::And(parts) => parts.iter().all(|part| part.matches(sample)),
			Self::Or(parts) => parts.iter().any(|part| part.matches(sample)),
			Self::DiagnosisIn { names } => {
				names.contains(&sample.oncotree_primary_diagnosis_name)
			},
			Self::DiagnosisNotIn { names } => {
				!names.contains(&sample.oncotree_primary_diagnosis_name)
			},
			Self::BirthDate { comparison, threshold } => {
				comparison.matches(sample.birth_date, *threshold)
			},
			Self::GenderIs { gender } => sample.gender.as_deref() == Some(gender.as_str()),
			Self::ElemMatch { list, conditions } => {
				!matching_indices(sample, *list, conditions).is_empty()
			},
			Self::NoElemMatch { list, conditions } => {
				matching_indices(sample, *list, conditions).is_empty()
			},
			Self::ListEmpty { list } => list_len(sample, *list) == 0,
			Self::SignatureIs { field, value } => {
				sample.signature_value(*field) == Some(value.as_str())
			},
			Self::GeneAbsent { gene } => {
				sample.mutations.iter().all(|m| m.hugo_symbol != *gene)
					&& sample.cnvs.iter().all(|c| c.hugo_symbol != *gene)
			},
		}
	}
}

pub fn list_len(sample: &SampleDocument, list: VariantList) -> usize {
	match list {
		VariantList::Mutations => sample.mutations.len(),
		VariantList::Cnvs => sample.cnvs.len(),
		VariantList::Svs => sample.svs.len(),
		VariantList::WildTypeGenes => sample.wild_type_genes.len(),
		VariantList::LowCoverage => sample.low_coverage.len(),
	}
}

/// Indices of list elements satisfying every condition, in stored order.
pub fn matching_indices(
	sample: &SampleDocument,
	list: VariantList,
	conditions: &[EntryCondition],
) -> Vec<usize> {
	(0..list_len(sample, list))
		.filter(|&index| entry_matches(sample, list, index, conditions))
		.collect()
}

fn entry_matches(
	sample: &SampleDocument,
	list: VariantList,
	index: usize,
	conditions: &[EntryCondition],
) -> bool {
	match list {
		VariantList::Mutations => {
			let entry = &sample.mutations[index];

			conditions.iter().all(|condition| mutation_condition(entry, condition))
		},
		VariantList::Cnvs => {
			let entry = &sample.cnvs[index];

			conditions.iter().all(|condition| cnv_condition(entry, condition))
		},
		VariantList::Svs => {
			let entry = &sample.svs[index];

			conditions.iter().all(|condition| sv_condition(entry, condition))
		},
		VariantList::WildTypeGenes => {
			let entry = &sample.wild_type_genes[index];

			conditions.iter().all(|condition| wild_type_condition(entry, condition))
		},
		VariantList::LowCoverage => {
			let entry = &sample.low_coverage[index];

			conditions.iter().all(|condition| low_coverage_condition(entry, condition))
		},
	}
}

fn mutation_condition(entry: &Mutation, condition: &EntryCondition) -> bool {
	match condition.field {
		EntryField::HugoSymbol => str_predicate(&condition.predicate, Some(&entry.hugo_symbol)),
		EntryField::ProteinChange => {
			str_predicate(&condition.predicate, entry.protein_change.as_deref())
		},
		EntryField::ReferenceResidue => {
			// Derive the residue from the protein change when the stored
			// field is absent.
			let residue = entry.reference_residue.clone().or_else(|| {
				entry.protein_change.as_deref().and_then(criteria::derive_reference_residue)
			});

			str_predicate(&condition.predicate, residue.as_deref())
		},
		EntryField::TranscriptExon => int_predicate(&condition.predicate, entry.transcript_exon),
		EntryField::VariantClassification => {
			str_predicate(&condition.predicate, entry.variant_classification.as_deref())
		},
		EntryField::CnvCall | EntryField::SvComment => false,
	}
}

fn cnv_condition(entry: &Cnv, condition: &EntryCondition) -> bool {
	match condition.field {
		EntryField::HugoSymbol => str_predicate(&condition.predicate, Some(&entry.hugo_symbol)),
		EntryField::CnvCall => str_predicate(&condition.predicate, entry.cnv_call.as_deref()),
		_ => false,
	}
}

fn sv_condition(entry: &Sv, condition: &EntryCondition) -> bool {
	match condition.field {
		EntryField::SvComment => {
			str_predicate(&condition.predicate, entry.structural_variant_comment.as_deref())
		},
		_ => false,
	}
}

fn wild_type_condition(entry: &WildTypeGene, condition: &EntryCondition) -> bool {
	match condition.field {
		EntryField::HugoSymbol => str_predicate(&condition.predicate, Some(&entry.hugo_symbol)),
		_ => false,
	}
}

fn low_coverage_condition(entry: &LowCoverage, condition: &EntryCondition) -> bool {
	match condition.field {
		EntryField::HugoSymbol => str_predicate(&condition.predicate, Some(&entry.hugo_symbol)),
		_ => false,
	}
}

fn str_predicate(predicate: &FieldPredicate, value: Option<&str>) -> bool {
	match predicate {
		FieldPredicate::Eq(expected) => value == Some(expected.as_str()),
		FieldPredicate::Ne(expected) => value != Some(expected.as_str()),
		FieldPredicate::Matches(pattern) => value.map(|v| pattern.is_match(v)).unwrap_or(false),
		FieldPredicate::EqInt(_) | FieldPredicate::NeInt(_) => false,
	}
}

fn int_predicate(predicate: &FieldPredicate, value: Option<i64>) -> bool {
	match predicate {
		FieldPredicate::EqInt(expected) => value == Some(*expected),
		FieldPredicate::NeInt(expected) => value != Some(*expected),
		_ => false,
	}
}
