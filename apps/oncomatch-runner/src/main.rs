use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	let args = oncomatch_runner::Args::parse();

	oncomatch_runner::run(args).await
}
