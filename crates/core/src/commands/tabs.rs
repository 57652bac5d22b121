use serde::Deserialize;
use serde_json::{Value, json};

use super::def::{CommandCtx, CommandDef};
use crate::error::{Result, TabError};
use crate::manager::CloseOutcome;

#[derive(Debug, Clone, Deserialize)]
pub struct OpenRaw {
	pub url: String,
}

fn resolve_url(raw: OpenRaw) -> Result<String> {
	let url = raw.url.trim();
	if url.is_empty() {
		return Err(TabError::InvalidInput("url must not be empty".into()));
	}
	Ok(url.to_string())
}

pub struct OpenCommand;

impl CommandDef for OpenCommand {
	const NAME: &'static str = "open";

	type Raw = OpenRaw;
	type Resolved = String;
	type Data = Value;

	fn resolve(raw: Self::Raw) -> Result<Self::Resolved> {
		resolve_url(raw)
	}

	fn execute(url: Self::Resolved, ctx: &mut CommandCtx<'_>) -> Result<Self::Data> {
		let tab = ctx.tabs.open(&url, false)?;
		Ok(json!({ "tab": tab, "url": url }))
	}
}

pub struct OpenBackgroundCommand;

impl CommandDef for OpenBackgroundCommand {
	const NAME: &'static str = "open-in-background";

	type Raw = OpenRaw;
	type Resolved = String;
	type Data = Value;

	fn resolve(raw: Self::Raw) -> Result<Self::Resolved> {
		resolve_url(raw)
	}

	fn execute(url: Self::Resolved, ctx: &mut CommandCtx<'_>) -> Result<Self::Data> {
		let tab = ctx.tabs.open(&url, true)?;
		Ok(json!({ "tab": tab, "url": url, "background": true }))
	}
}

/// Arguments for commands taking an optional 1-based count.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CountRaw {
	pub count: Option<usize>,
}

pub struct CloseCommand;

impl CommandDef for CloseCommand {
	const NAME: &'static str = "close";

	type Raw = CountRaw;
	type Resolved = Option<usize>;
	type Data = CloseOutcome;

	fn resolve(raw: Self::Raw) -> Result<Self::Resolved> {
		Ok(raw.count)
	}

	fn execute(index: Self::Resolved, ctx: &mut CommandCtx<'_>) -> Result<Self::Data> {
		ctx.tabs.close(index)
	}
}

pub struct SwitchNextCommand;

impl CommandDef for SwitchNextCommand {
	const NAME: &'static str = "switch-next";

	type Raw = CountRaw;
	type Resolved = usize;
	type Data = Value;

	fn resolve(raw: Self::Raw) -> Result<Self::Resolved> {
		Ok(raw.count.unwrap_or(1))
	}

	fn execute(count: Self::Resolved, ctx: &mut CommandCtx<'_>) -> Result<Self::Data> {
		let index = ctx.tabs.switch_next(count)?;
		Ok(json!({ "index": index }))
	}
}

pub struct SwitchPrevCommand;

impl CommandDef for SwitchPrevCommand {
	const NAME: &'static str = "switch-prev";

	type Raw = CountRaw;
	type Resolved = usize;
	type Data = Value;

	fn resolve(raw: Self::Raw) -> Result<Self::Resolved> {
		Ok(raw.count.unwrap_or(1))
	}

	fn execute(count: Self::Resolved, ctx: &mut CommandCtx<'_>) -> Result<Self::Data> {
		let index = ctx.tabs.switch_prev(count)?;
		Ok(json!({ "index": index }))
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwitchToRaw {
	pub index: usize,
}

pub struct SwitchToCommand;

impl CommandDef for SwitchToCommand {
	const NAME: &'static str = "switch-to";

	type Raw = SwitchToRaw;
	type Resolved = usize;
	type Data = Value;

	fn resolve(raw: Self::Raw) -> Result<Self::Resolved> {
		Ok(raw.index)
	}

	fn execute(index: Self::Resolved, ctx: &mut CommandCtx<'_>) -> Result<Self::Data> {
		let switched = ctx.tabs.switch_to(index)?;
		Ok(json!({ "switched": switched, "index": index }))
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoArgs {}

pub struct UndoCloseCommand;

impl CommandDef for UndoCloseCommand {
	const NAME: &'static str = "undo-close";

	type Raw = NoArgs;
	type Resolved = ();
	type Data = Value;

	fn resolve(_raw: Self::Raw) -> Result<Self::Resolved> {
		Ok(())
	}

	fn execute(_args: Self::Resolved, ctx: &mut CommandCtx<'_>) -> Result<Self::Data> {
		let tab = ctx.tabs.undo_close()?;
		Ok(json!({ "tab": tab }))
	}
}

pub struct ShutdownCommand;

impl CommandDef for ShutdownCommand {
	const NAME: &'static str = "shutdown";

	type Raw = NoArgs;
	type Resolved = ();
	type Data = Value;

	fn resolve(_raw: Self::Raw) -> Result<Self::Resolved> {
		Ok(())
	}

	fn execute(_args: Self::Resolved, ctx: &mut CommandCtx<'_>) -> Result<Self::Data> {
		ctx.tabs.shutdown();
		Ok(json!({ "requested": true }))
	}
}
