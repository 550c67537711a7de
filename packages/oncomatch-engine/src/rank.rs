use std::collections::BTreeMap;

use oncomatch_domain::{
	criteria::{DiagnosisLevel, MatchLevel},
	sample::VITAL_STATUS_ALIVE,
	trial::ACCRUAL_STATUS_OPEN,
	trial_match::{SORT_ORDER_UNRANKED, TrialMatchDocument},
};

// Tier positions: signatures beat tier-1 mutations, any CNV sits between
// tier-2 and tier-3, wild-type ranks just above nothing at all.
const TIER_SIGNATURE: u8 = 0;
const TIER_ONE: u8 = 1;
const TIER_TWO: u8 = 2;
const TIER_CNV: u8 = 3;
const TIER_THREE: u8 = 4;
const TIER_FOUR: u8 = 5;
const TIER_WILDTYPE: u8 = 6;
const TIER_NONE: u8 = 7;

const MATCH_TYPE_NONE: u8 = 4;
const CANCER_TYPE_NONE: u8 = 2;

type GroupKey = (String, String);

/// The per-(sample, protocol) priority tuple. Each position keeps the best
/// (numerically lowest) value observed across that pair's documents in the
/// computation subset; the reverse-protocol rank is assigned last and is
/// unique per pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct PriorityTuple {
	tier: u8,
	match_type: u8,
	cancer_type: u8,
	coordinating_center: u8,
	reverse_protocol: u64,
}

/// Assign the final sort order across all accumulated trial-match documents.
/// Documents outside every computed (sample, protocol) group keep the
/// unranked sentinel. Running this twice on identical input yields identical
/// assignments.
pub fn add_sort_order(docs: &mut [TrialMatchDocument], primary_center: &str) {
	let mut groups: BTreeMap<GroupKey, PriorityTuple> = BTreeMap::new();

	for doc in docs.iter() {
		if !in_computation_subset(doc) {
			continue;
		}

		let key = (doc.sample_id.clone(), doc.trial_protocol_no.clone());
		let tuple = groups.entry(key).or_insert(PriorityTuple {
			tier: TIER_NONE,
			match_type: MATCH_TYPE_NONE,
			cancer_type: CANCER_TYPE_NONE,
			coordinating_center: 1,
			reverse_protocol: 0,
		});

		tuple.tier = tuple.tier.min(tier_rank(doc));
		tuple.match_type = tuple.match_type.min(match_type_rank(doc));
		tuple.cancer_type = tuple.cancer_type.min(cancer_type_rank(doc));
		tuple.coordinating_center =
			tuple.coordinating_center.min(coordinating_center_rank(doc, primary_center));
	}

	assign_reverse_protocol_ranks(&mut groups);

	// Stable ascending sort over the full tuple; the group key itself breaks
	// any remaining tie so re-runs are byte-identical.
	let mut ordered: Vec<(&GroupKey, &PriorityTuple)> = groups.iter().collect();

	ordered.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)));

	let assignments: BTreeMap<&GroupKey, i64> = ordered
		.iter()
		.enumerate()
		.map(|(position, (key, _))| (*key, position as i64))
		.collect();

	for doc in docs.iter_mut() {
		let key = (doc.sample_id.clone(), doc.trial_protocol_no.clone());

		doc.sort_order = assignments.get(&key).copied().unwrap_or(SORT_ORDER_UNRANKED);
	}
}

/// Deceased patients, closed trials, and matches whose only genomic evidence
/// is structural variants are excluded from tuple computation.
fn in_computation_subset(doc: &TrialMatchDocument) -> bool {
	doc.vital_status == VITAL_STATUS_ALIVE
		&& doc.trial_accrual_status == ACCRUAL_STATUS_OPEN
		&& !is_sv_only(doc)
}

fn is_sv_only(doc: &TrialMatchDocument) -> bool {
	let reasons = &doc.match_reasons;

	!reasons.svs.is_empty()
		&& reasons.mutations.is_empty()
		&& reasons.cnvs.is_empty()
		&& reasons.wildtypes.is_empty()
		&& reasons.signatures.is_empty()
}

fn lowest_mutation_tier(doc: &TrialMatchDocument) -> Option<i64> {
	doc.match_reasons.mutations.iter().filter_map(|entry| entry.mutation.tier).min()
}

fn tier_rank(doc: &TrialMatchDocument) -> u8 {
	let reasons = &doc.match_reasons;
	let lowest_tier = lowest_mutation_tier(doc);

	if !reasons.signatures.is_empty() {
		TIER_SIGNATURE
	} else if lowest_tier == Some(1) {
		TIER_ONE
	} else if lowest_tier == Some(2) {
		TIER_TWO
	} else if !reasons.cnvs.is_empty() {
		TIER_CNV
	} else if lowest_tier == Some(3) {
		TIER_THREE
	} else if lowest_tier == Some(4) {
		TIER_FOUR
	} else if !reasons.wildtypes.is_empty() {
		TIER_WILDTYPE
	} else {
		TIER_NONE
	}
}

fn match_type_rank(doc: &TrialMatchDocument) -> u8 {
	doc.match_reasons
		.mutations
		.iter()
		.filter_map(|entry| entry.level)
		.map(MatchLevel::rank)
		.min()
		.unwrap_or(MATCH_TYPE_NONE)
}

fn cancer_type_rank(doc: &TrialMatchDocument) -> u8 {
	match doc.match_reasons.diagnosis_level.as_deref() {
		Some(level) if level == DiagnosisLevel::Specific.as_str() => 0,
		Some(level)
			if level == DiagnosisLevel::Solid.as_str()
				|| level == DiagnosisLevel::Liquid.as_str() =>
		{
			1
		},
		_ => CANCER_TYPE_NONE,
	}
}

fn coordinating_center_rank(doc: &TrialMatchDocument, primary_center: &str) -> u8 {
	match doc.match_reasons.coordinating_center.as_deref() {
		Some(center) if center == primary_center => 0,
		_ => 1,
	}
}

/// Within each sample, distinct protocols rank by descending leading numeric
/// component: the highest protocol number gets 0. Unique per (sample,
/// protocol) pair, which fully tie-breaks the tuple.
fn assign_reverse_protocol_ranks(groups: &mut BTreeMap<GroupKey, PriorityTuple>) {
	let mut per_sample: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

	for (sample_id, protocol_no) in groups.keys() {
		per_sample.entry(sample_id.as_str()).or_default().push(protocol_no.as_str());
	}

	let mut ranks: BTreeMap<GroupKey, u64> = BTreeMap::new();

	for (sample_id, mut protocols) in per_sample {
		protocols.sort_by(|a, b| {
			leading_protocol_number(b)
				.cmp(&leading_protocol_number(a))
				.then_with(|| a.cmp(b))
		});

		for (position, protocol_no) in protocols.into_iter().enumerate() {
			ranks.insert((sample_id.to_string(), protocol_no.to_string()), position as u64);
		}
	}

	for (key, tuple) in groups.iter_mut() {
		tuple.reverse_protocol = ranks.get(key).copied().unwrap_or(0);
	}
}

fn leading_protocol_number(protocol_no: &str) -> i64 {
	protocol_no.split('-').next().and_then(|part| part.parse().ok()).unwrap_or(0)
}
