use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// How shell output lines are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// One JSON object per line
	#[default]
	Json,
	/// Human-readable lines
	Text,
}

#[derive(Parser, Debug)]
#[command(name = "tabkeeper")]
#[command(about = "Drive a headless tab collection from a command script")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format
	#[arg(short = 'f', long, value_enum, default_value = "json")]
	pub format: OutputFormat,

	/// Settings file (TOML or JSON). Defaults to $XDG_CONFIG_HOME/tabkeeper/config.toml when present
	#[arg(short, long, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Override the last-tab policy (quit or blank)
	#[arg(long, value_name = "POLICY")]
	pub last_close: Option<String>,

	/// Seed the clipboard selection
	#[arg(long, value_name = "TEXT")]
	pub clipboard: Option<String>,

	/// Seed the primary selection
	#[arg(long, value_name = "TEXT")]
	pub primary: Option<String>,

	/// Give up waiting for tabs to shut down after this many milliseconds
	#[arg(long, value_name = "MS", default_value_t = 5000)]
	pub shutdown_timeout: u64,

	/// List the available commands and exit
	#[arg(long)]
	pub list_commands: bool,

	/// Command script to run; reads stdin when omitted
	#[arg(value_name = "SCRIPT")]
	pub script: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_flags_and_script() {
		let cli = Cli::try_parse_from([
			"tabkeeper",
			"-vv",
			"--format",
			"text",
			"--clipboard",
			"https://example.com",
			"--last-close",
			"quit",
			"script.tk",
		])
		.unwrap();

		assert_eq!(cli.verbose, 2);
		assert_eq!(cli.format, OutputFormat::Text);
		assert_eq!(cli.clipboard.as_deref(), Some("https://example.com"));
		assert_eq!(cli.last_close.as_deref(), Some("quit"));
		assert_eq!(cli.script, Some(PathBuf::from("script.tk")));
		assert_eq!(cli.shutdown_timeout, 5000);
	}

	#[test]
	fn defaults_to_json_on_stdin() {
		let cli = Cli::try_parse_from(["tabkeeper"]).unwrap();
		assert_eq!(cli.format, OutputFormat::Json);
		assert!(cli.script.is_none());
		assert!(!cli.list_commands);
	}
}
