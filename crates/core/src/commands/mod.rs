//! User-invocable commands on top of the tab manager.
//!
//! Commands are looked up by name, their JSON arguments deserialized into
//! the command's `Raw` type, resolved and executed against a
//! [`TabController`](crate::manager::TabController). User-facing failures
//! are reported through the context's notifier before being returned.

pub mod def;
pub mod paste;
pub mod tabs;

pub use def::{CommandCtx, CommandDef, CommandOutcome};

use crate::error::{Result, TabError};

/// The registry macro: generates `CommandId`, `lookup_command`, `command_name`,
/// `command_aliases` and `dispatch_command`.
///
/// ```ignore
/// command_registry! {
///   Open => crate::commands::tabs::OpenCommand { names: ["open", "tabopen"] },
/// }
/// ```
macro_rules! command_registry {
	(
		$(
			$id:ident => $ty:path {
				names: [ $($name:literal),+ $(,)? ]
			}
		),+ $(,)?
	) => {
		#[derive(Debug, Clone, Copy, PartialEq, Eq)]
		pub enum CommandId { $($id),+ }

		impl CommandId {
			pub const ALL: &'static [CommandId] = &[$(CommandId::$id),+];
		}

		/// Resolves a command name or alias.
		pub fn lookup_command(name: &str) -> Option<CommandId> {
			match name {
				$(
					$($name)|+ => Some(CommandId::$id),
				)+
				_ => None,
			}
		}

		/// Canonical name of a command.
		pub fn command_name(id: CommandId) -> &'static str {
			match id {
				$(
					CommandId::$id => <$ty as $crate::commands::def::CommandDef>::NAME,
				)+
			}
		}

		/// Every name a command answers to.
		pub fn command_aliases(id: CommandId) -> &'static [&'static str] {
			match id {
				$(
					CommandId::$id => &[$($name),+],
				)+
			}
		}

		/// The only place that deserializes `Raw`, calls `resolve` and `execute`.
		fn dispatch_command(
			id: CommandId,
			args: serde_json::Value,
			ctx: &mut $crate::commands::def::CommandCtx<'_>,
		) -> $crate::error::Result<$crate::commands::def::CommandOutcome> {
			match id {
				$(
					CommandId::$id => {
						type Cmd = $ty;

						let raw: <Cmd as $crate::commands::def::CommandDef>::Raw =
							serde_json::from_value(args)
							.map_err(|e| $crate::error::TabError::InvalidInput(e.to_string()))?;

						let resolved = <Cmd as $crate::commands::def::CommandDef>::resolve(raw)?;
						let data = <Cmd as $crate::commands::def::CommandDef>::execute(resolved, ctx)?;
						$crate::commands::def::CommandOutcome::erase(
							<Cmd as $crate::commands::def::CommandDef>::NAME,
							data,
						)
					}
				)+
			}
		}
	};
}

command_registry! {
	Open => crate::commands::tabs::OpenCommand { names: ["open", "tabopen"] },
	OpenBackground => crate::commands::tabs::OpenBackgroundCommand { names: ["open-in-background", "backtabopen"] },
	Close => crate::commands::tabs::CloseCommand { names: ["close", "tabclose"] },
	SwitchNext => crate::commands::tabs::SwitchNextCommand { names: ["switch-next", "tabnext"] },
	SwitchPrev => crate::commands::tabs::SwitchPrevCommand { names: ["switch-prev", "tabprev"] },
	SwitchTo => crate::commands::tabs::SwitchToCommand { names: ["switch-to", "tabfocus"] },
	UndoClose => crate::commands::tabs::UndoCloseCommand { names: ["undo-close", "undo"] },
	PasteOpen => crate::commands::paste::PasteOpenCommand { names: ["paste-open", "paste"] },
	PasteOpenTab => crate::commands::paste::PasteOpenTabCommand { names: ["paste-open-in-tab", "tabpaste"] },
	Shutdown => crate::commands::tabs::ShutdownCommand { names: ["shutdown"] },
}

/// Runs a command, reporting user-facing errors through the notifier.
///
/// `null` arguments are treated as an empty object.
pub fn run_command(id: CommandId, args: serde_json::Value, ctx: &mut CommandCtx<'_>) -> Result<CommandOutcome> {
	let args = if args.is_null() {
		serde_json::Value::Object(Default::default())
	} else {
		args
	};

	let result = dispatch_command(id, args, ctx);
	if let Err(err) = &result {
		if err.is_user_facing() {
			ctx.notifier.report_error(&err.to_string());
		}
		tracing::debug!(command = command_name(id), error = %err, "command failed");
	}
	result
}

/// Looks up `name` and runs it.
pub fn run_named(name: &str, args: serde_json::Value, ctx: &mut CommandCtx<'_>) -> Result<CommandOutcome> {
	let id = lookup_command(name).ok_or_else(|| TabError::UnknownCommand(name.to_string()))?;
	run_command(id, args, ctx)
}
