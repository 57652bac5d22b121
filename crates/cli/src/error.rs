use thiserror::Error;

use tabkeeper::TabError;

pub type Result<T> = std::result::Result<T, ShellError>;

/// Failure of a single script line.
#[derive(Debug, Error)]
pub enum ShellError {
	#[error("invalid arguments: {0}")]
	BadArguments(#[source] serde_json::Error),

	#[error("unknown directive: !{0}")]
	UnknownDirective(String),

	#[error("!{directive} expects {expected}")]
	MissingArgument {
		directive: &'static str,
		expected: &'static str,
	},

	#[error("no tab at index {0}")]
	NoSuchTab(usize),

	#[error(transparent)]
	Tab(#[from] TabError),
}
