//! Primitive values used across the manager boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque tab identity.
///
/// Allocated by the manager, unique for the lifetime of the tab and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(u64);

impl TabId {
	/// Wraps a raw identifier.
	pub const fn new(raw: u64) -> Self {
		Self(raw)
	}

	/// Returns the raw identifier.
	pub const fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for TabId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "tab-{}", self.0)
	}
}

/// Window geometry carried by resize notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Geometry {
	pub x: i32,
	pub y: i32,
	pub width: u32,
	pub height: u32,
}

impl Geometry {
	pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
		Self { x, y, width, height }
	}
}

/// Clipboard buffer to read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
	/// The regular clipboard.
	#[default]
	Clipboard,
	/// The X11-style primary selection.
	Primary,
}

/// What closing the last remaining tab does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LastClose {
	/// Ask the shell to quit.
	Quit,
	/// Keep the tab and navigate it to the blank page.
	#[default]
	Blank,
}

impl LastClose {
	/// Parses a configured value, falling back to [`LastClose::Blank`] for
	/// anything unrecognized.
	pub fn parse_lenient(value: &str) -> Self {
		value.parse().unwrap_or_else(|_| {
			tracing::warn!(value, "unknown last-close behavior, using blank");
			Self::Blank
		})
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Quit => "quit",
			Self::Blank => "blank",
		}
	}
}

impl FromStr for LastClose {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"quit" => Ok(Self::Quit),
			"blank" => Ok(Self::Blank),
			other => Err(format!("invalid last-close behavior: {other}")),
		}
	}
}

impl fmt::Display for LastClose {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for LastClose {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;
		Ok(Self::parse_lenient(&raw))
	}
}
