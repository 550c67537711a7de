use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// Leaf criteria keys as they appear in trial curation documents.
pub const MT_DIAGNOSIS: &str = "oncotree_primary_diagnosis";
pub const MT_AGE: &str = "age_numerical";
pub const MT_GENDER: &str = "gender";
pub const MT_HUGO_SYMBOL: &str = "hugo_symbol";
pub const MT_VARIANT_CATEGORY: &str = "variant_category";
pub const MT_PROTEIN_CHANGE: &str = "protein_change";
pub const MT_WC_PROTEIN_CHANGE: &str = "wildcard_protein_change";
pub const MT_EXON: &str = "exon";
pub const MT_VARIANT_CLASS: &str = "variant_classification";
pub const MT_CNV_CALL: &str = "cnv_call";
pub const MT_WILDTYPE: &str = "wildtype";

pub const ALL_SOLID: &str = "_SOLID_";
pub const ALL_LIQUID: &str = "_LIQUID_";

// Canonical CNV call values as stored on sample documents.
pub const CNV_CALL_HIGH_AMP: &str = "High level amplification";
pub const CNV_CALL_HOMO_DEL: &str = "Homozygous deletion";
pub const CNV_CALL_HETERO_DEL: &str = "Heterozygous deletion";
pub const CNV_CALL_GAIN: &str = "Gain";

static REFERENCE_RESIDUE_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(p\.[A-Z]\d+)[A-Za-z*]+$").expect("reference residue pattern is valid")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariantCategory {
	Mutation,
	Cnv,
	Sv,
	Signature,
	Wildtype,
	LowCoverage,
}
impl VariantCategory {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Mutation => "MUTATION",
			Self::Cnv => "CNV",
			Self::Sv => "SV",
			Self::Signature => "SIGNATURE",
			Self::Wildtype => "WILDTYPE",
			Self::LowCoverage => "LOW_COVERAGE",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureField {
	Mmr,
	Ms,
	Tobacco,
	Tmz,
	PolE,
	Apobec,
	Uva,
}
impl SignatureField {
	pub const ALL: [Self; 7] =
		[Self::Mmr, Self::Ms, Self::Tobacco, Self::Tmz, Self::PolE, Self::Apobec, Self::Uva];

	/// The leaf criteria key used in trial curation documents.
	pub fn criterion_key(self) -> &'static str {
		match self {
			Self::Mmr => "mmr_status",
			Self::Ms => "ms_status",
			Self::Tobacco => "tobacco_status",
			Self::Tmz => "tmz_status",
			Self::PolE => "pole_status",
			Self::Apobec => "apobec_status",
			Self::Uva => "uva_status",
		}
	}

	/// The scalar field name on sample and trial-match documents.
	pub fn document_key(self) -> &'static str {
		match self {
			Self::Mmr => "mmrStatus",
			Self::Ms => "msStatus",
			Self::Tobacco => "tobaccoStatus",
			Self::Tmz => "tmzStatus",
			Self::PolE => "polEStatus",
			Self::Apobec => "apobecStatus",
			Self::Uva => "uvaStatus",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchLevel {
	Variant,
	Wildcard,
	Exon,
	Gene,
}
impl MatchLevel {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Variant => "variant",
			Self::Wildcard => "wildcard",
			Self::Exon => "exon",
			Self::Gene => "gene",
		}
	}

	pub fn rank(self) -> u8 {
		match self {
			Self::Variant => 0,
			Self::Wildcard => 1,
			Self::Exon => 2,
			Self::Gene => 3,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosisLevel {
	Specific,
	Solid,
	Liquid,
}
impl DiagnosisLevel {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Specific => "specific",
			Self::Solid => "_solid_",
			Self::Liquid => "_liquid_",
		}
	}
}

/// A leading "!" marks a criterion value as exclusionary.
pub fn assess_inclusion(raw: &str) -> bool {
	!raw.starts_with('!')
}

pub fn sanitize_exclusion(raw: &str) -> &str {
	raw.strip_prefix('!').unwrap_or(raw)
}

/// Map trial curation vocabulary onto the canonical variant category.
pub fn normalize_variant_category(raw: &str) -> Option<VariantCategory> {
	match raw {
		"Mutation" | "MUTATION" => Some(VariantCategory::Mutation),
		"Copy Number Variation" | "CNV" => Some(VariantCategory::Cnv),
		"Structural Variation" | "SV" => Some(VariantCategory::Sv),
		_ => None,
	}
}

/// Map trial curation CNV call vocabulary onto the sample-side value.
/// Canonical values pass through unchanged.
pub fn normalize_cnv_call(raw: &str) -> String {
	match raw {
		"High Amplification" => CNV_CALL_HIGH_AMP.to_string(),
		"Homozygous Deletion" => CNV_CALL_HOMO_DEL.to_string(),
		"Heterozygous Deletion" => CNV_CALL_HETERO_DEL.to_string(),
		"Low Amplification" => CNV_CALL_GAIN.to_string(),
		other => other.to_string(),
	}
}

/// Map trial curation signature vocabulary onto the sample-side value.
pub fn normalize_signature_value(raw: &str) -> String {
	match raw {
		"MMR-Deficient" => "Deficient".to_string(),
		"MMR-Proficient" => "Proficient".to_string(),
		other => other.to_string(),
	}
}

/// Derive the reference residue from a missense protein change by dropping
/// its trailing amino-acid call, e.g. "p.V600E" -> "p.V600".
pub fn derive_reference_residue(protein_change: &str) -> Option<String> {
	REFERENCE_RESIDUE_RE
		.captures(protein_change)
		.and_then(|caps| caps.get(1))
		.map(|m| m.as_str().to_string())
}

/// Word-boundary gene match over free-text structural variant comments.
pub fn sv_comment_regex(gene: &str) -> Result<Regex, regex::Error> {
	let escaped = regex::escape(gene);

	Regex::new(&format!(r"(?i)(.*\W{escaped}\W.*)|(^{escaped}\W.*)|(.*\W{escaped}$)"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reference_residue_drops_trailing_call() {
		assert_eq!(derive_reference_residue("p.V600E"), Some("p.V600".to_string()));
		assert_eq!(derive_reference_residue("p.V600fs"), Some("p.V600".to_string()));
		assert_eq!(derive_reference_residue("p.V6001"), None);
		assert_eq!(derive_reference_residue("V600E"), None);
	}

	#[test]
	fn sv_regex_requires_word_boundaries() {
		let re = sv_comment_regex("BRAF").expect("regex compiles");

		assert!(re.is_match("Fusion involving BRAF and KIAA1549"));
		assert!(re.is_match("braf rearrangement detected"));
		assert!(!re.is_match("BRAFV600E comment"));
	}

	#[test]
	fn exclusion_prefix_is_assessed_and_stripped() {
		assert!(!assess_inclusion("!Melanoma"));
		assert!(assess_inclusion("Melanoma"));
		assert_eq!(sanitize_exclusion("!Melanoma"), "Melanoma");
		assert_eq!(sanitize_exclusion("Melanoma"), "Melanoma");
	}
}
