/// Boundary to the oncology diagnosis-taxonomy expansion service.
///
/// Implementations hold the full tumor-type tree in memory; all lookups are
/// synchronous. The liquid group is defined as every diagnosis under "Blood"
/// or "Lymph" (both included); the solid group is the complement over all
/// known diagnoses.
pub trait DiagnosisTaxonomy
where
	Self: Send + Sync,
{
	/// The diagnosis itself plus all of its descendants.
	fn expand(&self, diagnosis: &str) -> Vec<String>;

	fn liquid_diagnoses(&self) -> Vec<String>;

	fn all_diagnoses(&self) -> Vec<String>;
}
