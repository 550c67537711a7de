use std::{
	collections::{BTreeSet, HashMap},
	fs,
	path::Path,
};

use color_eyre::{Result, eyre};

use oncomatch_domain::taxonomy::DiagnosisTaxonomy;

const LIQUID_ROOTS: [&str; 2] = ["Blood", "Lymph"];

/// The oncotree tumor-type taxonomy held in memory: diagnosis names in an
/// arena, edges as child index lists.
#[derive(Clone, Debug, Default)]
pub struct OncoTree {
	names: Vec<String>,
	children: Vec<Vec<usize>>,
	index: HashMap<String, usize>,
}
impl OncoTree {
	/// Build the tree from (name, parent-name) pairs. Parents referenced
	/// before their own entry are created on first sight; unknown parents
	/// become roots.
	pub fn from_edges<I>(entries: I) -> Result<Self>
	where
		I: IntoIterator<Item = (String, Option<String>)>,
	{
		let mut tree = Self::default();

		for (name, parent) in entries {
			let child = tree.intern(&name)?;

			if let Some(parent) = parent {
				let parent = tree.intern(&parent)?;

				if parent != child && !tree.children[parent].contains(&child) {
					tree.children[parent].push(child);
				}
			}
		}

		Ok(tree)
	}

	pub fn len(&self) -> usize {
		self.names.len()
	}

	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}

	fn intern(&mut self, name: &str) -> Result<usize> {
		let name = name.trim();

		if name.is_empty() {
			return Err(eyre::eyre!("Diagnosis names must be non-empty."));
		}
		if let Some(&index) = self.index.get(name) {
			return Ok(index);
		}

		let index = self.names.len();

		self.names.push(name.to_string());
		self.children.push(Vec::new());
		self.index.insert(name.to_string(), index);

		Ok(index)
	}

	fn descendants_of(&self, root: usize, out: &mut BTreeSet<String>) {
		let mut stack = vec![root];

		while let Some(index) = stack.pop() {
			if !out.insert(self.names[index].clone()) {
				continue;
			}

			stack.extend(self.children[index].iter().copied());
		}
	}
}
impl DiagnosisTaxonomy for OncoTree {
	fn expand(&self, diagnosis: &str) -> Vec<String> {
		let mut out = BTreeSet::new();

		match self.index.get(diagnosis) {
			Some(&index) => self.descendants_of(index, &mut out),
			// Unknown names expand to themselves so the query still has a
			// well-defined membership set.
			None => {
				out.insert(diagnosis.to_string());
			},
		}

		out.into_iter().collect()
	}

	fn liquid_diagnoses(&self) -> Vec<String> {
		let mut out = BTreeSet::new();

		for root in LIQUID_ROOTS {
			if let Some(&index) = self.index.get(root) {
				self.descendants_of(index, &mut out);
			}
		}

		out.into_iter().collect()
	}

	fn all_diagnoses(&self) -> Vec<String> {
		let mut names: Vec<String> = self.names.clone();

		names.sort();

		names
	}
}

/// Parse a tab-indented tumor tree file: one diagnosis name per line, depth
/// given by the number of leading tabs. Blank lines and `#` comments are
/// skipped.
pub fn parse_tree_text(text: &str) -> Result<OncoTree> {
	let mut edges = Vec::new();
	// Names of the current ancestor chain, indexed by depth.
	let mut lineage: Vec<String> = Vec::new();

	for (line_no, line) in text.lines().enumerate() {
		if line.trim().is_empty() || line.trim_start().starts_with('#') {
			continue;
		}

		let depth = line.chars().take_while(|&c| c == '\t').count();
		let name = line.trim();

		if depth > lineage.len() {
			return Err(eyre::eyre!(
				"Line {} of the tumor tree skips an indentation level.",
				line_no + 1
			));
		}

		lineage.truncate(depth);

		let parent = lineage.last().cloned();

		edges.push((name.to_string(), parent));
		lineage.push(name.to_string());
	}

	let tree = OncoTree::from_edges(edges)?;

	if tree.is_empty() {
		return Err(eyre::eyre!("The tumor tree file contains no diagnoses."));
	}

	Ok(tree)
}

pub fn load_file(path: &Path) -> Result<OncoTree> {
	let text = fs::read_to_string(path)
		.map_err(|err| eyre::eyre!("Failed to read tumor tree at {path:?}: {err}."))?;

	parse_tree_text(&text)
}
