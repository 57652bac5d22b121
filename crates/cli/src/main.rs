use clap::Parser;
use tabkeeper_cli::{cli::Cli, logging};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	match tabkeeper_cli::run(cli).await {
		Ok(summary) if summary.failures > 0 => std::process::exit(1),
		Ok(_) => {}
		Err(err) => {
			eprintln!("error: {err:#}");
			std::process::exit(2);
		}
	}
}
