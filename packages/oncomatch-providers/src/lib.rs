pub mod oncotree;
pub mod remote;

pub use oncotree::OncoTree;

use color_eyre::Result;

/// Load the taxonomy from the configured source. The remote source is
/// fetched once at startup; every later lookup is in-memory.
pub async fn load_taxonomy(cfg: &oncomatch_config::Taxonomy) -> Result<OncoTree> {
	match cfg.source.as_str() {
		oncomatch_config::TAXONOMY_SOURCE_FILE => {
			let path = cfg.path.as_deref().ok_or_else(|| {
				color_eyre::eyre::eyre!("taxonomy.path is required for the file source.")
			})?;

			oncotree::load_file(std::path::Path::new(path))
		},
		oncomatch_config::TAXONOMY_SOURCE_REMOTE => {
			let url = cfg.url.as_deref().ok_or_else(|| {
				color_eyre::eyre::eyre!("taxonomy.url is required for the remote source.")
			})?;

			remote::fetch(url, cfg.timeout_ms).await
		},
		other => Err(color_eyre::eyre::eyre!("Unknown taxonomy source: {other}.")),
	}
}
