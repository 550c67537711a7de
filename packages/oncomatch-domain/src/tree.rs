use std::collections::VecDeque;

use serde_json::{Map, Value};

use crate::{Error, Result};

pub const ROOT_ID: usize = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeType {
	Clinical,
	Genomic,
	And,
	Or,
}
impl NodeType {
	pub fn from_key(key: &str) -> Result<Self> {
		match key {
			"clinical" => Ok(Self::Clinical),
			"genomic" => Ok(Self::Genomic),
			"and" => Ok(Self::And),
			"or" => Ok(Self::Or),
			other => Err(Error::MalformedTree {
				message: format!(
					"node key must be one of clinical, genomic, and, or; got {other:?}"
				),
			}),
		}
	}

	pub fn is_leaf(self) -> bool {
		matches!(self, Self::Clinical | Self::Genomic)
	}
}

#[derive(Clone, Debug)]
pub struct GraphNode {
	pub id: usize,
	pub node_type: NodeType,
	/// The leaf criteria mapping; absent for combinators.
	pub value: Option<Map<String, Value>>,
	pub children: Vec<usize>,
}

/// A match tree compiled into an arena: nodes live in a vector indexed by
/// id - 1 and edges are child id lists. The synthetic build root (id 0) is
/// dropped, so node 1 is the true root.
#[derive(Clone, Debug)]
pub struct Graph {
	nodes: Vec<GraphNode>,
}
impl Graph {
	/// Build the node graph from a match tree document. The input must be a
	/// mapping with exactly one top-level key; leaf values must be mappings
	/// and combinator values sequences of single-key mappings.
	pub fn build(tree: &Value) -> Result<Self> {
		let map = tree.as_object().ok_or_else(|| Error::MalformedTree {
			message: "match tree must be a mapping".to_string(),
		})?;

		if map.len() != 1 {
			return Err(Error::MalformedTree {
				message: format!("match tree must have exactly one top-level key, got {}", map.len()),
			});
		}

		let (key, value) = map.iter().next().ok_or_else(|| Error::MalformedTree {
			message: "match tree must have exactly one top-level key".to_string(),
		})?;
		let mut nodes = Vec::new();
		let mut next_id = ROOT_ID;
		let mut queue = VecDeque::new();

		queue.push_back((ROOT_ID, key.as_str().to_string(), value));

		while let Some((id, key, value)) = queue.pop_front() {
			let node_type = NodeType::from_key(&key)?;
			let mut node = GraphNode { id, node_type, value: None, children: Vec::new() };

			match value {
				Value::Object(criteria) => {
					if !node_type.is_leaf() {
						return Err(Error::MalformedTree {
							message: format!("{key:?} node requires a sequence of children"),
						});
					}

					node.value = Some(criteria.clone());
				},
				Value::Array(children) => {
					if node_type.is_leaf() {
						return Err(Error::MalformedTree {
							message: format!("{key:?} node requires a criteria mapping"),
						});
					}
					if children.is_empty() {
						return Err(Error::MalformedTree {
							message: format!("{key:?} node requires at least one child"),
						});
					}

					for child in children {
						let child_map =
							child.as_object().filter(|map| map.len() == 1).ok_or_else(|| {
								Error::MalformedTree {
									message: "combinator children must be single-key mappings"
										.to_string(),
								}
							})?;
						let (child_key, child_value) =
							child_map.iter().next().ok_or_else(|| Error::MalformedTree {
								message: "combinator children must be single-key mappings"
									.to_string(),
							})?;

						next_id += 1;

						node.children.push(next_id);
						queue.push_back((next_id, child_key.as_str().to_string(), child_value));
					}
				},
				_ => {
					return Err(Error::MalformedTree {
						message: format!("{key:?} node value must be a mapping or a sequence"),
					});
				},
			}

			nodes.push(node);
		}

		// Ids are assigned in enqueue order and the queue is FIFO, so nodes
		// arrive in ascending id order: the arena index is nodes[id - 1].
		Ok(Self { nodes })
	}

	pub fn node(&self, id: usize) -> &GraphNode {
		&self.nodes[id - 1]
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Deterministic post-order traversal from the root: children are visited
	/// in their original sequence order, always before their parent.
	pub fn post_order(&self) -> Vec<usize> {
		let mut order = Vec::with_capacity(self.nodes.len());
		let mut stack = vec![(ROOT_ID, false)];

		while let Some((id, expanded)) = stack.pop() {
			if expanded {
				order.push(id);

				continue;
			}

			stack.push((id, true));

			for &child in self.node(id).children.iter().rev() {
				stack.push((child, false));
			}
		}

		order
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn builds_a_leaf_only_tree() {
		let tree = json!({ "genomic": { "hugo_symbol": "BRAF" } });
		let graph = Graph::build(&tree).expect("builds");

		assert_eq!(graph.len(), 1);
		assert_eq!(graph.node(ROOT_ID).node_type, NodeType::Genomic);
		assert_eq!(graph.post_order(), vec![1]);
	}

	#[test]
	fn post_order_visits_children_before_parents_in_sequence_order() {
		let tree = json!({
			"and": [
				{ "or": [
					{ "genomic": { "hugo_symbol": "BRAF" } },
					{ "genomic": { "hugo_symbol": "KRAS" } },
				] },
				{ "clinical": { "oncotree_primary_diagnosis": "Melanoma" } },
			]
		});
		let graph = Graph::build(&tree).expect("builds");

		// Breadth-first id assignment: 1=and, 2=or, 3=clinical, 4=BRAF, 5=KRAS.
		assert_eq!(graph.post_order(), vec![4, 5, 2, 3, 1]);
		assert_eq!(graph.node(1).children, vec![2, 3]);
		assert_eq!(graph.node(2).children, vec![4, 5]);
	}

	#[test]
	fn rejects_multiple_top_level_keys() {
		let tree = json!({ "and": [], "or": [] });

		assert!(matches!(Graph::build(&tree), Err(Error::MalformedTree { .. })));
	}

	#[test]
	fn rejects_scalar_node_values() {
		let tree = json!({ "genomic": "BRAF" });

		assert!(matches!(Graph::build(&tree), Err(Error::MalformedTree { .. })));
	}

	#[test]
	fn rejects_unknown_node_keys() {
		let tree = json!({ "xor": [ { "genomic": { "hugo_symbol": "BRAF" } } ] });

		assert!(matches!(Graph::build(&tree), Err(Error::MalformedTree { .. })));
	}

	#[test]
	fn rejects_combinators_with_mapping_values() {
		let tree = json!({ "and": { "hugo_symbol": "BRAF" } });

		assert!(matches!(Graph::build(&tree), Err(Error::MalformedTree { .. })));
	}
}
