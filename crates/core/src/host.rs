//! Interfaces of the collaborators the manager is hosted by.
//!
//! The manager never renders, stores settings, shows messages or touches the
//! system clipboard itself. The shell provides these through the traits below.

use std::collections::HashMap;

use parking_lot::Mutex;
use tabkeeper_protocol::{LastClose, Selection, TabId};

use crate::shutdown::ShutdownSignal;

/// Rendering engine behind one tab.
///
/// Engines report their events back through
/// [`TabEventSink`](crate::manager::TabEventSink) with the tab's identity.
pub trait TabEngine: Send {
	/// Begins navigation to `location`.
	fn navigate(&mut self, location: &str);

	/// Returns the location currently shown.
	fn current_location(&self) -> String;

	/// Begins tearing the page down.
	///
	/// The engine completes `done` once teardown finished, possibly much later.
	/// Dropping `done` without completing it is treated as completion.
	fn request_shutdown(&mut self, done: ShutdownSignal);
}

/// Creates an engine for every newly opened tab.
pub trait EngineFactory: Send {
	fn create(&mut self, id: TabId) -> Box<dyn TabEngine>;
}

impl<F> EngineFactory for F
where
	F: FnMut(TabId) -> Box<dyn TabEngine> + Send,
{
	fn create(&mut self, id: TabId) -> Box<dyn TabEngine> {
		self(id)
	}
}

/// Read-only view of the settings the manager consults.
pub trait ConfigStore: Send + Sync {
	/// Behavior when the last remaining tab is closed.
	fn last_close(&self) -> LastClose;

	/// Whether tab switching wraps around at either end.
	fn wrap_navigation(&self) -> bool;

	/// Location shown by a tab blanked under [`LastClose::Blank`].
	fn blank_page(&self) -> &str {
		"about:blank"
	}
}

/// Surface for user-visible, non-fatal failures.
pub trait Notifier: Send + Sync {
	fn report_error(&self, message: &str);
}

/// Logs reported errors instead of showing them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
	fn report_error(&self, message: &str) {
		tracing::warn!(message, "user error");
	}
}

/// System clipboard access.
pub trait Clipboard: Send + Sync {
	/// Returns the text held by `selection`, or `None` when empty.
	fn read(&self, selection: Selection) -> Option<String>;
}

/// In-process clipboard, used by headless shells and tests.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
	contents: Mutex<HashMap<Selection, String>>,
}

impl MemoryClipboard {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the text held by `selection`.
	pub fn set(&self, selection: Selection, text: impl Into<String>) {
		self.contents.lock().insert(selection, text.into());
	}

	pub fn clear(&self, selection: Selection) {
		self.contents.lock().remove(&selection);
	}
}

impl Clipboard for MemoryClipboard {
	fn read(&self, selection: Selection) -> Option<String> {
		self.contents
			.lock()
			.get(&selection)
			.filter(|text| !text.is_empty())
			.cloned()
	}
}
