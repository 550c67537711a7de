pub mod runner;

use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use oncomatch_domain::taxonomy::DiagnosisTaxonomy;
use oncomatch_engine::{MatchService, Stores};
use oncomatch_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = oncomatch_cli::VERSION,
	rename_all = "kebab",
	styles = oncomatch_cli::styles(),
)]
pub struct Args {
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Evaluate every trial against every patient, optionally on a recurring
	/// interval, replacing the prior run's trial-match set.
	Match {
		#[arg(long, short = 'c', value_name = "FILE")]
		config: PathBuf,
		/// Re-run every N seconds instead of exiting after one run.
		#[arg(long, value_name = "SECONDS")]
		interval_secs: Option<u64>,
		/// Export the final trial-match set as JSON after each run.
		#[arg(long, value_name = "FILE")]
		export: Option<PathBuf>,
	},
	/// Export the current trial-match set as JSON.
	Export {
		#[arg(long, short = 'c', value_name = "FILE")]
		config: PathBuf,
		#[arg(long, short = 'o', value_name = "FILE")]
		out: PathBuf,
	},
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	match args.command {
		Command::Match { config, interval_secs, export } => {
			let service = build_service(&config).await?;

			runner::match_loop(&service, interval_secs, export.as_deref()).await
		},
		Command::Export { config, out } => {
			let service = build_service(&config).await?;

			runner::export_matches(&service, &out).await
		},
	}
}

async fn build_service(config_path: &std::path::Path) -> color_eyre::Result<MatchService> {
	let config = oncomatch_config::load(config_path)?;
	let filter = EnvFilter::new(config.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let taxonomy = oncomatch_providers::load_taxonomy(&config.taxonomy).await?;

	tracing::info!(diagnoses = taxonomy.all_diagnoses().len(), "Loaded the diagnosis taxonomy.");

	Ok(MatchService::new(config, Stores::postgres(Arc::new(db)), Arc::new(taxonomy)))
}
