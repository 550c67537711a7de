// std
use std::time::Duration as StdDuration;

// crates.io
use color_eyre::{Result, eyre};
use reqwest::Client;
use serde::Deserialize;

use crate::oncotree::OncoTree;

#[derive(Debug, Deserialize)]
struct NodeEntry {
	name: String,
	#[serde(default)]
	parent: Option<String>,
}

/// Fetch the taxonomy as a JSON array of `{ "name": .., "parent": .. }`
/// nodes from the configured taxonomy service.
pub async fn fetch(url: &str, timeout_ms: u64) -> Result<OncoTree> {
	let client = Client::builder().timeout(StdDuration::from_millis(timeout_ms)).build()?;
	let res = client.get(url).send().await?;
	let entries: Vec<NodeEntry> = res.error_for_status()?.json().await?;

	parse_entries(entries)
}

fn parse_entries(entries: Vec<NodeEntry>) -> Result<OncoTree> {
	if entries.is_empty() {
		return Err(eyre::eyre!("Taxonomy service returned no nodes."));
	}

	OncoTree::from_edges(entries.into_iter().map(|entry| (entry.name, entry.parent)))
}
