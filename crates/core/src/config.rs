//! Tab manager settings.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tabkeeper_protocol::LastClose;

use crate::error::{Result, TabError};
use crate::events::DEFAULT_CAPACITY;
use crate::host::ConfigStore;

/// Settings consulted by the manager.
///
/// Missing keys take their defaults; an unknown `last_close` value is
/// treated as `blank`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct TabsConfig {
	/// Behavior when the last remaining tab is closed.
	pub last_close: LastClose,
	/// Whether `switch-next`/`switch-prev` wrap around.
	pub wrap: bool,
	/// Location a blanked last tab navigates to.
	pub blank_page: String,
	/// Broadcast capacity of every event bus.
	pub bus_capacity: usize,
}

impl Default for TabsConfig {
	fn default() -> Self {
		Self {
			last_close: LastClose::Blank,
			wrap: true,
			blank_page: "about:blank".to_string(),
			bus_capacity: DEFAULT_CAPACITY,
		}
	}
}

impl TabsConfig {
	/// Loads settings from `path`. Files ending in `.toml` are parsed as TOML,
	/// anything else as JSON.
	pub fn load(path: &Path) -> Result<Self> {
		let content = fs::read_to_string(path).map_err(|e| config_error(path, e))?;
		let is_toml = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
		let config = if is_toml {
			toml::from_str(&content).map_err(|e| config_error(path, e))?
		} else {
			serde_json::from_str(&content).map_err(|e| config_error(path, e))?
		};
		tracing::debug!(path = %path.display(), ?config, "loaded tab config");
		Ok(config)
	}

	/// Loads `path` when given, otherwise returns the defaults.
	pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
		match path {
			Some(path) => Self::load(path),
			None => Ok(Self::default()),
		}
	}

	/// Default config location: `$XDG_CONFIG_HOME/tabkeeper/config.toml`,
	/// falling back to `~/.config`.
	pub fn default_path() -> Option<PathBuf> {
		let config_home = std::env::var_os("XDG_CONFIG_HOME")
			.map(PathBuf::from)
			.or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
		Some(config_home.join("tabkeeper").join("config.toml"))
	}
}

fn config_error(path: &Path, err: impl std::fmt::Display) -> TabError {
	TabError::Config {
		path: path.to_path_buf(),
		message: err.to_string(),
	}
}

impl ConfigStore for TabsConfig {
	fn last_close(&self) -> LastClose {
		self.last_close
	}

	fn wrap_navigation(&self) -> bool {
		self.wrap
	}

	fn blank_page(&self) -> &str {
		&self.blank_page
	}
}
