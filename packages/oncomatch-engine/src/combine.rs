use std::collections::BTreeSet;

use oncomatch_domain::tree::NodeType;

use crate::{Error, Result, record::MatchRecord};

/// Merge children's result sets at an AND/OR node. AND intersects the
/// sample-id sets, OR unions them. Children are processed in their original
/// order and each child's matches in stored order; membership checks use
/// ordered sets so no output order ever depends on hash iteration.
pub fn combine(node_type: NodeType, children: &[Vec<MatchRecord>]) -> Result<Vec<MatchRecord>> {
	if children.is_empty() {
		return Err(Error::MalformedTree {
			message: "combinator node has no children to combine".to_string(),
		});
	}

	let mut result = children[0].clone();

	for child in &children[1..] {
		let child_ids: BTreeSet<&str> =
			child.iter().map(|record| record.sample_id.as_str()).collect();

		match node_type {
			NodeType::And => {
				result.retain(|record| child_ids.contains(record.sample_id.as_str()));

				for incoming in child {
					if let Some(existing) =
						result.iter_mut().find(|record| record.sample_id == incoming.sample_id)
					{
						merge(existing, incoming);
					}
				}
			},
			NodeType::Or => {
				for incoming in child {
					match result.iter_mut().find(|record| record.sample_id == incoming.sample_id)
					{
						Some(existing) => merge(existing, incoming),
						None => result.push(incoming.clone()),
					}
				}
			},
			NodeType::Clinical | NodeType::Genomic => {
				return Err(Error::MalformedTree {
					message: "leaf nodes cannot combine children".to_string(),
				});
			},
		}
	}

	Ok(result)
}

/// Scalar clinical/signature fields are copied in only if not already
/// present; list-valued fields accumulate, skipping exact duplicates.
fn merge(existing: &mut MatchRecord, incoming: &MatchRecord) {
	merge_scalar(&mut existing.diagnosis, &incoming.diagnosis);
	merge_scalar(&mut existing.diagnosis_level, &incoming.diagnosis_level);
	merge_scalar(&mut existing.birth_date, &incoming.birth_date);
	merge_scalar(&mut existing.age, &incoming.age);
	merge_scalar(&mut existing.gender, &incoming.gender);
	merge_scalar(&mut existing.mmr_status, &incoming.mmr_status);
	merge_scalar(&mut existing.ms_status, &incoming.ms_status);
	merge_scalar(&mut existing.tobacco_status, &incoming.tobacco_status);
	merge_scalar(&mut existing.tmz_status, &incoming.tmz_status);
	merge_scalar(&mut existing.pol_e_status, &incoming.pol_e_status);
	merge_scalar(&mut existing.apobec_status, &incoming.apobec_status);
	merge_scalar(&mut existing.uva_status, &incoming.uva_status);
	merge_list(&mut existing.mutations, &incoming.mutations);
	merge_list(&mut existing.cnvs, &incoming.cnvs);
	merge_list(&mut existing.svs, &incoming.svs);
	merge_list(&mut existing.wildtypes, &incoming.wildtypes);
	merge_list(&mut existing.low_coverage, &incoming.low_coverage);
	merge_list(&mut existing.genomic_exclusion_reasons, &incoming.genomic_exclusion_reasons);
	merge_list(&mut existing.clinical_exclusion_reasons, &incoming.clinical_exclusion_reasons);
}

fn merge_scalar<T>(existing: &mut Option<T>, incoming: &Option<T>)
where
	T: Clone,
{
	if existing.is_none()
		&& let Some(value) = incoming
	{
		*existing = Some(value.clone());
	}
}

fn merge_list<T>(existing: &mut Vec<T>, incoming: &[T])
where
	T: Clone + PartialEq,
{
	for entry in incoming {
		if !existing.contains(entry) {
			existing.push(entry.clone());
		}
	}
}
