//! Command plumbing: resolve + execute contract and the outcome type.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::host::{Clipboard, Notifier};
use crate::manager::TabController;

/// Everything a command may touch while executing.
pub struct CommandCtx<'a> {
	pub tabs: &'a mut dyn TabController,
	pub clipboard: &'a dyn Clipboard,
	pub notifier: &'a dyn Notifier,
}

impl<'a> CommandCtx<'a> {
	pub fn new(tabs: &'a mut dyn TabController, clipboard: &'a dyn Clipboard, notifier: &'a dyn Notifier) -> Self {
		Self {
			tabs,
			clipboard,
			notifier,
		}
	}
}

/// Type-erased result of a command, ready to print.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandOutcome {
	pub command: &'static str,
	pub data: serde_json::Value,
}

impl CommandOutcome {
	pub fn erase<T: Serialize>(command: &'static str, data: T) -> Result<Self> {
		Ok(Self {
			command,
			data: serde_json::to_value(data)?,
		})
	}
}

/// Canonical command trait. Each command is
/// `pub struct XxxCommand; impl CommandDef for XxxCommand { ... }`.
pub trait CommandDef: 'static {
	const NAME: &'static str;

	type Raw: DeserializeOwned;
	type Resolved;
	type Data: Serialize;

	/// Validates raw arguments.
	fn resolve(raw: Self::Raw) -> Result<Self::Resolved>;

	/// Runs the command against the tab controller. Must not report errors
	/// itself; the registry does.
	fn execute(args: Self::Resolved, ctx: &mut CommandCtx<'_>) -> Result<Self::Data>;
}
