//! Headless shell for the tabkeeper tab manager.
//!
//! Reads a command script, drives a [`tabkeeper::TabManager`] backed by
//! simulated engines and prints every result and notification as a line of
//! output.

pub mod cli;
pub mod error;
pub mod headless;
pub mod logging;
pub mod output;
pub mod shell;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use tabkeeper::commands::{command_aliases, command_name};
use tabkeeper::{CommandId, LastClose, TabsConfig};
use tabkeeper_protocol::Selection;
use tokio::io::{AsyncBufRead, BufReader};

use crate::cli::Cli;
use crate::shell::{Shell, ShellOptions, Summary};

/// Runs the shell as configured on the command line.
pub async fn run(cli: Cli) -> anyhow::Result<Summary> {
	if cli.list_commands {
		for id in CommandId::ALL {
			println!("{:<20} {}", command_name(*id), command_aliases(*id).join(", "));
		}
		return Ok(Summary::default());
	}

	let config = load_config(&cli)?;
	let options = ShellOptions {
		format: cli.format,
		shutdown_timeout: Duration::from_millis(cli.shutdown_timeout),
	};
	let shell = Shell::new(config, std::io::stdout(), options);
	if let Some(text) = &cli.clipboard {
		shell.clipboard().set(Selection::Clipboard, text.as_str());
	}
	if let Some(text) = &cli.primary {
		shell.clipboard().set(Selection::Primary, text.as_str());
	}

	let input: Box<dyn AsyncBufRead + Unpin> = match &cli.script {
		Some(path) => {
			let file = tokio::fs::File::open(path)
				.await
				.with_context(|| format!("failed to open script {}", path.display()))?;
			Box::new(BufReader::new(file))
		}
		None => Box::new(BufReader::new(tokio::io::stdin())),
	};

	let (summary, _) = shell.run(input).await?;
	tracing::info!(
		lines = summary.lines,
		failures = summary.failures,
		quit = summary.quit,
		"script finished"
	);
	Ok(summary)
}

/// Loads settings from `--config`, else from the default location when that
/// file exists, then applies command-line overrides.
pub fn load_config(cli: &Cli) -> anyhow::Result<TabsConfig> {
	let path: Option<PathBuf> = cli
		.config
		.clone()
		.or_else(|| TabsConfig::default_path().filter(|path| path.is_file()));

	let mut config = TabsConfig::load_or_default(path.as_deref())?;
	if let Some(policy) = &cli.last_close {
		config.last_close = LastClose::parse_lenient(policy);
	}
	Ok(config)
}
