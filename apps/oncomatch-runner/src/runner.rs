use std::{fs::File, io::BufWriter, path::Path, time::Duration};

use tokio::time as tokio_time;

use oncomatch_engine::{MatchService, TrialMatchStore};

/// Run matching once, or forever on the given interval. Per-run failures in
/// loop mode are logged and the next tick proceeds; in one-shot mode they
/// propagate and the process exits non-zero.
pub async fn match_loop(
	service: &MatchService,
	interval_secs: Option<u64>,
	export: Option<&Path>,
) -> color_eyre::Result<()> {
	match interval_secs {
		None => {
			run_once(service, export).await?;

			Ok(())
		},
		Some(secs) => {
			loop {
				if let Err(err) = run_once(service, export).await {
					tracing::error!(error = %err, "Matching run failed; next run continues.");
				}

				tokio_time::sleep(Duration::from_secs(secs)).await;
			}
		},
	}
}

async fn run_once(service: &MatchService, export: Option<&Path>) -> color_eyre::Result<()> {
	let summary = service.run_matching().await?;

	for skipped in &summary.trials_skipped {
		tracing::warn!(
			protocol_no = %skipped.protocol_no,
			reason = %skipped.reason,
			"Trial skipped."
		);
	}

	tracing::info!(
		trials_matched = summary.trials_matched,
		trials_skipped = summary.trials_skipped.len(),
		matches_written = summary.matches_written,
		"Run summary."
	);

	if let Some(path) = export {
		export_matches(service, path).await?;
	}

	Ok(())
}

/// Write the live trial-match set to a JSON file, in display order.
pub async fn export_matches(service: &MatchService, path: &Path) -> color_eyre::Result<()> {
	let docs = service.stores.matches.fetch_all().await?;
	let file = File::create(path)?;

	serde_json::to_writer_pretty(BufWriter::new(file), &docs)?;

	tracing::info!(count = docs.len(), path = %path.display(), "Exported trial matches.");

	Ok(())
}
