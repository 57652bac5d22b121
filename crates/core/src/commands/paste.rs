use serde::Deserialize;
use serde_json::{Value, json};
use tabkeeper_protocol::Selection;

use super::def::{CommandCtx, CommandDef};
use crate::error::{Result, TabError};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PasteRaw {
	/// Read the primary selection instead of the clipboard.
	pub sel: bool,
	/// Open in a new tab instead of the current one.
	pub tab: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct PasteResolved {
	pub selection: Selection,
	pub new_tab: bool,
}

impl PasteResolved {
	fn new(sel: bool, new_tab: bool) -> Self {
		Self {
			selection: if sel { Selection::Primary } else { Selection::Clipboard },
			new_tab,
		}
	}
}

fn paste(args: PasteResolved, ctx: &mut CommandCtx<'_>) -> Result<Value> {
	let text = ctx.clipboard.read(args.selection).unwrap_or_default();
	let url = text.trim();
	if url.is_empty() {
		return Err(TabError::ClipboardEmpty);
	}
	tracing::debug!(url, selection = ?args.selection, "clipboard contained");

	if !args.new_tab && ctx.tabs.navigate_current(url)? {
		return Ok(json!({ "url": url, "navigated": true }));
	}
	// No tab to navigate falls back to opening one.
	let tab = ctx.tabs.open(url, false)?;
	Ok(json!({ "url": url, "tab": tab }))
}

pub struct PasteOpenCommand;

impl CommandDef for PasteOpenCommand {
	const NAME: &'static str = "paste-open";

	type Raw = PasteRaw;
	type Resolved = PasteResolved;
	type Data = Value;

	fn resolve(raw: Self::Raw) -> Result<Self::Resolved> {
		Ok(PasteResolved::new(raw.sel, raw.tab))
	}

	fn execute(args: Self::Resolved, ctx: &mut CommandCtx<'_>) -> Result<Self::Data> {
		paste(args, ctx)
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PasteTabRaw {
	pub sel: bool,
}

pub struct PasteOpenTabCommand;

impl CommandDef for PasteOpenTabCommand {
	const NAME: &'static str = "paste-open-in-tab";

	type Raw = PasteTabRaw;
	type Resolved = PasteResolved;
	type Data = Value;

	fn resolve(raw: Self::Raw) -> Result<Self::Resolved> {
		Ok(PasteResolved::new(raw.sel, true))
	}

	fn execute(args: Self::Resolved, ctx: &mut CommandCtx<'_>) -> Result<Self::Data> {
		paste(args, ctx)
	}
}
