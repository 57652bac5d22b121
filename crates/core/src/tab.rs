//! Per-tab state held by the manager.

use indexmap::IndexMap;
use tabkeeper_protocol::{EventKind, TabEvent, TabId};

use crate::host::TabEngine;
use crate::shutdown::ShutdownSignal;

/// Where a tab is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabLifecycle {
	/// Shown in the visible sequence.
	Open,
	/// Removed from the visible sequence, waiting for shutdown confirmation.
	Closing,
}

/// Latest value of each filtered event kind a tab produced.
///
/// Replayed when the tab becomes active so dependent UI is consistent
/// without waiting for fresh events.
#[derive(Debug, Clone, Default)]
pub struct EventCache {
	latest: IndexMap<EventKind, TabEvent>,
}

impl EventCache {
	/// Records `event`. A load start clears everything cached so far first.
	/// Returns false for events that are not cached.
	pub fn record(&mut self, event: &TabEvent) -> bool {
		let Some(kind) = event.filtered_kind() else {
			return false;
		};
		if kind == EventKind::LoadStarted {
			self.latest.clear();
		}
		self.latest.insert(kind, event.clone());
		true
	}

	pub fn get(&self, kind: EventKind) -> Option<&TabEvent> {
		self.latest.get(&kind)
	}

	/// Cached values in first-seen order, one per kind.
	pub fn replay(&self) -> impl Iterator<Item = &TabEvent> {
		self.latest.values()
	}

	pub fn clear(&mut self) {
		self.latest.clear();
	}

	pub fn len(&self) -> usize {
		self.latest.len()
	}

	pub fn is_empty(&self) -> bool {
		self.latest.is_empty()
	}
}

/// One open page-view.
pub struct TabRecord {
	id: TabId,
	engine: Box<dyn TabEngine>,
	label: String,
	cache: EventCache,
	lifecycle: TabLifecycle,
}

impl TabRecord {
	pub fn new(id: TabId, engine: Box<dyn TabEngine>, label: impl Into<String>) -> Self {
		Self {
			id,
			engine,
			label: label.into(),
			cache: EventCache::default(),
			lifecycle: TabLifecycle::Open,
		}
	}

	pub fn id(&self) -> TabId {
		self.id
	}

	pub fn label(&self) -> &str {
		&self.label
	}

	/// Sets the visible label. Empty titles are ignored; returns whether the label changed.
	pub fn set_title(&mut self, title: &str) -> bool {
		if title.is_empty() {
			tracing::debug!(tab = %self.id, "ignoring empty title");
			return false;
		}
		if self.label == title {
			return false;
		}
		self.label = title.to_string();
		true
	}

	pub fn cache(&self) -> &EventCache {
		&self.cache
	}

	pub fn record_event(&mut self, event: &TabEvent) -> bool {
		self.cache.record(event)
	}

	pub fn lifecycle(&self) -> TabLifecycle {
		self.lifecycle
	}

	pub fn location(&self) -> String {
		self.engine.current_location()
	}

	pub fn navigate(&mut self, location: &str) {
		tracing::debug!(tab = %self.id, location, "navigating");
		self.engine.navigate(location);
	}

	/// Hands the shutdown request to the engine and marks the record closing.
	pub fn begin_shutdown(&mut self, done: ShutdownSignal) {
		self.lifecycle = TabLifecycle::Closing;
		self.engine.request_shutdown(done);
	}
}

impl std::fmt::Debug for TabRecord {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TabRecord")
			.field("id", &self.id)
			.field("label", &self.label)
			.field("cached", &self.cache.len())
			.field("lifecycle", &self.lifecycle)
			.finish()
	}
}
