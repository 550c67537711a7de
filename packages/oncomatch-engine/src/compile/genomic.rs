use serde_json::{Map, Value};

use oncomatch_domain::{
	criteria::{self, MatchLevel, SignatureField, VariantCategory},
	query::{EntryCondition, EntryField, FieldPredicate, Query, VariantList},
	trial_match::GenomicExclusionReason,
};

use crate::{
	Error, Result,
	compile::{CompiledLeaf, projection::ProjectionBuilder},
};

/// Compiles genomic leaves. Dispatch precedence over the present criteria
/// keys: gene-level, protein change, wildcard residue, exon, CNV call,
/// mutational signature, wildtype.
pub struct GenomicCriteria;
impl GenomicCriteria {
	pub fn new() -> Self {
		Self
	}

	pub fn compile(
		&self,
		value: &Map<String, Value>,
		projection: &ProjectionBuilder,
	) -> Result<CompiledLeaf> {
		let mut keys: Vec<&str> = value.keys().map(String::as_str).collect();

		keys.sort_unstable();

		if keys == [criteria::MT_HUGO_SYMBOL, criteria::MT_VARIANT_CATEGORY] {
			return self.gene_level(value, projection);
		}
		if value.contains_key(criteria::MT_PROTEIN_CHANGE) {
			return self.variant_level(value, projection);
		}
		if value.contains_key(criteria::MT_WC_PROTEIN_CHANGE) {
			return self.wildcard_level(value, projection);
		}
		if value.contains_key(criteria::MT_EXON) {
			return self.exon_level(value, projection);
		}
		if value.contains_key(criteria::MT_CNV_CALL) {
			return self.cnv_call(value, projection);
		}
		if let Some(field) =
			SignatureField::ALL.into_iter().find(|field| value.contains_key(field.criterion_key()))
		{
			return self.signature(value, field, projection);
		}
		if value.get(criteria::MT_WILDTYPE).and_then(Value::as_bool) == Some(true) {
			return self.wildtype(value, projection);
		}

		Err(Error::UnrecognizedCriteria {
			message: format!("genomic criteria keys {keys:?} match no known pattern"),
		})
	}

	fn gene_level(
		&self,
		value: &Map<String, Value>,
		projection: &ProjectionBuilder,
	) -> Result<CompiledLeaf> {
		let gene = required_str(value, criteria::MT_HUGO_SYMBOL)?;
		let (category, include) = parse_variant_category(value)?;

		if category == VariantCategory::Sv {
			return self.structural_variant(gene, include, projection);
		}

		let list = list_for(category);
		let conditions = vec![gene_condition(gene)];
		let (query, proj) = if include {
			(
				Query::ElemMatch { list, conditions: conditions.clone() },
				projection.genomic_inclusion(list, conditions, Some(MatchLevel::Gene)),
			)
		} else {
			(
				gene_exclusion_query(list, gene),
				projection
					.genomic_exclusion(GenomicExclusionReason::gene_level(category.as_str(), gene)),
			)
		};

		Ok(CompiledLeaf { query, projection: proj })
	}

	fn structural_variant(
		&self,
		gene: &str,
		include: bool,
		projection: &ProjectionBuilder,
	) -> Result<CompiledLeaf> {
		let pattern =
			criteria::sv_comment_regex(gene).map_err(|err| Error::UnrecognizedCriteria {
				message: format!("gene {gene:?} produced an invalid comment pattern: {err}"),
			})?;
		let conditions =
			vec![EntryCondition::new(EntryField::SvComment, FieldPredicate::Matches(pattern))];
		let list = VariantList::Svs;
		let (query, proj) = if include {
			(
				Query::ElemMatch { list, conditions: conditions.clone() },
				projection.genomic_inclusion(list, conditions, Some(MatchLevel::Gene)),
			)
		} else {
			(
				Query::Or(vec![
					Query::NoElemMatch { list, conditions },
					Query::ListEmpty { list },
				]),
				projection.genomic_exclusion(GenomicExclusionReason::gene_level(
					VariantCategory::Sv.as_str(),
					gene,
				)),
			)
		};

		Ok(CompiledLeaf { query, projection: proj })
	}

	fn variant_level(
		&self,
		value: &Map<String, Value>,
		projection: &ProjectionBuilder,
	) -> Result<CompiledLeaf> {
		let gene = required_str(value, criteria::MT_HUGO_SYMBOL)?;
		let protein_change = required_str(value, criteria::MT_PROTEIN_CHANGE)?;
		let (category, include) = parse_variant_category(value)?;
		let refinement = EntryCondition::new(
			EntryField::ProteinChange,
			FieldPredicate::Eq(protein_change.to_string()),
		);
		let mut reason = GenomicExclusionReason::gene_level(category.as_str(), gene);

		reason.protein_change = Some(protein_change.to_string());

		self.refined_mutation_leaf(
			gene,
			refinement,
			include,
			MatchLevel::Variant,
			reason,
			projection,
		)
	}

	fn wildcard_level(
		&self,
		value: &Map<String, Value>,
		projection: &ProjectionBuilder,
	) -> Result<CompiledLeaf> {
		let gene = required_str(value, criteria::MT_HUGO_SYMBOL)?;
		let residue = required_str(value, criteria::MT_WC_PROTEIN_CHANGE)?;
		let (category, include) = parse_variant_category(value)?;
		let refinement = EntryCondition::new(
			EntryField::ReferenceResidue,
			FieldPredicate::Eq(residue.to_string()),
		);
		let mut reason = GenomicExclusionReason::gene_level(category.as_str(), gene);

		reason.reference_residue = Some(residue.to_string());

		self.refined_mutation_leaf(
			gene,
			refinement,
			include,
			MatchLevel::Wildcard,
			reason,
			projection,
		)
	}

	fn exon_level(
		&self,
		value: &Map<String, Value>,
		projection: &ProjectionBuilder,
	) -> Result<CompiledLeaf> {
		let gene = required_str(value, criteria::MT_HUGO_SYMBOL)?;
		let exon = value.get(criteria::MT_EXON).and_then(Value::as_i64).ok_or_else(|| {
			Error::UnrecognizedCriteria {
				message: format!("{} must be an integer", criteria::MT_EXON),
			}
		})?;
		let (category, include) = parse_variant_category(value)?;
		let variant_class = match value.get(criteria::MT_VARIANT_CLASS) {
			Some(raw) => Some(
				raw.as_str()
					.ok_or_else(|| Error::UnrecognizedCriteria {
						message: format!("{} must be a string", criteria::MT_VARIANT_CLASS),
					})?
					.to_string(),
			),
			None => None,
		};
		let list = VariantList::Mutations;
		let mut refinement = vec![EntryCondition::new(
			EntryField::TranscriptExon,
			FieldPredicate::EqInt(exon),
		)];

		if let Some(class) = &variant_class {
			refinement.push(EntryCondition::new(
				EntryField::VariantClassification,
				FieldPredicate::Eq(class.clone()),
			));
		}

		let mut inclusion_conditions = vec![gene_condition(gene)];

		inclusion_conditions.extend(refinement.clone());

		let (query, proj) = if include {
			(
				Query::ElemMatch { list, conditions: inclusion_conditions.clone() },
				projection.genomic_inclusion(list, inclusion_conditions, Some(MatchLevel::Exon)),
			)
		} else {
			let mut reason = GenomicExclusionReason::gene_level(category.as_str(), gene);

			reason.transcript_exon = Some(exon);
			reason.variant_classification = variant_class;

			(refinement_exclusion_query(list, gene, refinement), projection.genomic_exclusion(reason))
		};

		Ok(CompiledLeaf { query, projection: proj })
	}

	fn cnv_call(
		&self,
		value: &Map<String, Value>,
		projection: &ProjectionBuilder,
	) -> Result<CompiledLeaf> {
		let gene = required_str(value, criteria::MT_HUGO_SYMBOL)?;
		let raw_call = required_str(value, criteria::MT_CNV_CALL)?;
		let (category, include) = parse_variant_category(value)?;
		let call = criteria::normalize_cnv_call(raw_call);
		let list = VariantList::Cnvs;
		let refinement =
			EntryCondition::new(EntryField::CnvCall, FieldPredicate::Eq(call.clone()));
		let conditions = vec![gene_condition(gene), refinement.clone()];
		let (query, proj) = if include {
			(
				Query::ElemMatch { list, conditions: conditions.clone() },
				projection.genomic_inclusion(list, conditions, Some(MatchLevel::Variant)),
			)
		} else {
			let mut reason = GenomicExclusionReason::gene_level(category.as_str(), gene);

			reason.cnv_call = Some(call);

			(
				refinement_exclusion_query(list, gene, vec![refinement]),
				projection.genomic_exclusion(reason),
			)
		};

		Ok(CompiledLeaf { query, projection: proj })
	}

	fn signature(
		&self,
		value: &Map<String, Value>,
		field: SignatureField,
		projection: &ProjectionBuilder,
	) -> Result<CompiledLeaf> {
		let raw = required_str(value, field.criterion_key())?;
		let normalized = criteria::normalize_signature_value(raw);

		Ok(CompiledLeaf {
			query: Query::SignatureIs { field, value: normalized.clone() },
			projection: projection.signature(field, normalized),
		})
	}

	fn wildtype(
		&self,
		value: &Map<String, Value>,
		projection: &ProjectionBuilder,
	) -> Result<CompiledLeaf> {
		let gene = required_str(value, criteria::MT_HUGO_SYMBOL)?;

		Ok(CompiledLeaf {
			query: Query::GeneAbsent { gene: gene.to_string() },
			projection: projection.wildtype(gene.to_string()),
		})
	}

	fn refined_mutation_leaf(
		&self,
		gene: &str,
		refinement: EntryCondition,
		include: bool,
		level: MatchLevel,
		reason: GenomicExclusionReason,
		projection: &ProjectionBuilder,
	) -> Result<CompiledLeaf> {
		let list = VariantList::Mutations;
		let conditions = vec![gene_condition(gene), refinement.clone()];
		let (query, proj) = if include {
			(
				Query::ElemMatch { list, conditions: conditions.clone() },
				projection.genomic_inclusion(list, conditions, Some(level)),
			)
		} else {
			(
				refinement_exclusion_query(list, gene, vec![refinement]),
				projection.genomic_exclusion(reason),
			)
		};

		Ok(CompiledLeaf { query, projection: proj })
	}
}
impl Default for GenomicCriteria {
	fn default() -> Self {
		Self::new()
	}
}

fn required_str<'v>(value: &'v Map<String, Value>, key: &str) -> Result<&'v str> {
	value
		.get(key)
		.ok_or_else(|| Error::MissingRequiredField { field: key.to_string() })?
		.as_str()
		.ok_or_else(|| Error::UnrecognizedCriteria { message: format!("{key} must be a string") })
}

/// The `(variant_category, include)` pair every genomic level starts from.
fn parse_variant_category(value: &Map<String, Value>) -> Result<(VariantCategory, bool)> {
	let raw = required_str(value, criteria::MT_VARIANT_CATEGORY)?;
	let include = criteria::assess_inclusion(raw);
	let term = criteria::sanitize_exclusion(raw);
	let category =
		criteria::normalize_variant_category(term).ok_or_else(|| Error::UnrecognizedCriteria {
			message: format!("unknown variant category {term:?}"),
		})?;

	Ok((category, include))
}

fn list_for(category: VariantCategory) -> VariantList {
	match category {
		VariantCategory::Mutation => VariantList::Mutations,
		VariantCategory::Cnv => VariantList::Cnvs,
		VariantCategory::Sv => VariantList::Svs,
		VariantCategory::Wildtype => VariantList::WildTypeGenes,
		VariantCategory::Signature | VariantCategory::LowCoverage => VariantList::LowCoverage,
	}
}

fn gene_condition(gene: &str) -> EntryCondition {
	EntryCondition::new(EntryField::HugoSymbol, FieldPredicate::Eq(gene.to_string()))
}

/// "No variant of that category for the gene": no element matches the gene,
/// or the category list is empty altogether.
fn gene_exclusion_query(list: VariantList, gene: &str) -> Query {
	Query::Or(vec![
		Query::NoElemMatch { list, conditions: vec![gene_condition(gene)] },
		Query::ListEmpty { list },
	])
}

/// Exclusion for refined criteria: either no variant of the category exists
/// for the gene, or variants exist for the gene but none satisfies the
/// refinement. Evaluated per element; a plain field inequality would not be.
fn refinement_exclusion_query(
	list: VariantList,
	gene: &str,
	refinement: Vec<EntryCondition>,
) -> Query {
	let mut full_conditions = vec![gene_condition(gene)];

	full_conditions.extend(refinement);

	Query::Or(vec![
		gene_exclusion_query(list, gene),
		Query::And(vec![
			Query::ElemMatch { list, conditions: vec![gene_condition(gene)] },
			Query::NoElemMatch { list, conditions: full_conditions },
		]),
	])
}
