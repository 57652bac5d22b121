//! Error types for the tab manager.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for tab manager operations.
pub type Result<T> = std::result::Result<T, TabError>;

/// Errors that can occur while managing tabs.
#[derive(Debug, Error)]
pub enum TabError {
	/// Switching backwards past the first tab with wrapping disabled.
	#[error("First tab")]
	FirstTab,

	/// Switching forwards past the last tab with wrapping disabled.
	#[error("Last tab")]
	LastTab,

	/// A paste command found nothing to open.
	#[error("Clipboard is empty.")]
	ClipboardEmpty,

	/// Undo was requested with no closed tabs recorded.
	#[error("Nothing to undo!")]
	NothingToUndo,

	/// The manager is draining or has shut down and no longer accepts changes.
	#[error("Tab manager is shutting down")]
	ShuttingDown,

	/// No command is registered under this name.
	#[error("Unknown command: {0}")]
	UnknownCommand(String),

	/// Command arguments failed to parse.
	#[error("Invalid input: {0}")]
	InvalidInput(String),

	/// A configuration file could not be read or parsed.
	#[error("Failed to load config from {}: {message}", path.display())]
	Config { path: PathBuf, message: String },

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl TabError {
	/// Returns true for recoverable errors that should be shown to the user
	/// through the notification surface.
	pub fn is_user_facing(&self) -> bool {
		matches!(
			self,
			TabError::FirstTab | TabError::LastTab | TabError::ClipboardEmpty | TabError::NothingToUndo
		)
	}
}
