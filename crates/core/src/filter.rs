//! Current-tab event filter.
//!
//! A [`FilterHandle`] is bound to one output kind and forwards an event to
//! the [`CurrentTabBus`] only when it comes from the active tab. Caching of
//! last-known values is handled by [`TabRecord`](crate::tab::TabRecord).

use indexmap::IndexMap;
use tabkeeper_protocol::{EventKind, TabEvent, TabId};

use crate::events::CurrentTabBus;

/// Handler bound to one filtered output kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterHandle {
	output: EventKind,
}

impl FilterHandle {
	/// Returns the output kind this handle forwards to.
	pub fn output(&self) -> EventKind {
		self.output
	}

	/// Forwards `event` iff `source` is the active tab and the event has the
	/// bound kind. Returns whether the event was published.
	pub fn forward(&self, active: Option<TabId>, source: TabId, event: &TabEvent, bus: &CurrentTabBus) -> bool {
		if active != Some(source) {
			tracing::trace!(tab = %source, kind = %self.output, "dropping event from background tab");
			return false;
		}
		if event.kind() != Some(self.output) {
			tracing::warn!(tab = %source, expected = %self.output, ?event, "event routed to wrong filter");
			return false;
		}
		bus.publish(event.clone());
		true
	}
}

/// Set of filter handles, one per filtered kind.
#[derive(Debug, Clone)]
pub struct EventFilter {
	handles: IndexMap<EventKind, FilterHandle>,
}

impl EventFilter {
	/// Creates a handle for every filtered kind.
	pub fn new() -> Self {
		let handles = EventKind::FILTERED
			.iter()
			.filter_map(|kind| Self::create(*kind).map(|handle| (*kind, handle)))
			.collect();
		Self { handles }
	}

	/// Creates a handler bound to `output`. Returns `None` for kinds that are
	/// not routed through the filter.
	pub fn create(output: EventKind) -> Option<FilterHandle> {
		output.is_filtered().then_some(FilterHandle { output })
	}

	/// Returns the handle for `kind`.
	pub fn handle(&self, kind: EventKind) -> Option<&FilterHandle> {
		self.handles.get(&kind)
	}

	/// Routes `event` through the handle for its kind.
	pub fn route(&self, active: Option<TabId>, source: TabId, event: &TabEvent, bus: &CurrentTabBus) -> bool {
		event
			.filtered_kind()
			.and_then(|kind| self.handle(kind))
			.is_some_and(|handle| handle.forward(active, source, event, bus))
	}
}

impl Default for EventFilter {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const ACTIVE: TabId = TabId::new(1);
	const BACKGROUND: TabId = TabId::new(2);

	#[test]
	fn forwards_only_from_active_tab() {
		let bus = CurrentTabBus::default();
		let mut stream = bus.subscribe(EventKind::StatusMessage).unwrap();
		let filter = EventFilter::new();
		let event = TabEvent::StatusMessage { text: "hello".into() };

		assert!(!filter.route(Some(ACTIVE), BACKGROUND, &event, &bus));
		assert!(stream.drain().is_empty());

		assert!(filter.route(Some(ACTIVE), ACTIVE, &event, &bus));
		assert_eq!(stream.drain(), vec![event]);
	}

	#[test]
	fn suppresses_everything_without_active_tab() {
		let bus = CurrentTabBus::default();
		let mut stream = bus.subscribe(EventKind::Progress).unwrap();
		let filter = EventFilter::new();

		assert!(!filter.route(None, ACTIVE, &TabEvent::Progress { percent: 10 }, &bus));
		assert!(stream.drain().is_empty());
	}

	#[test]
	fn handle_rejects_mismatched_kind() {
		let bus = CurrentTabBus::default();
		let handle = EventFilter::create(EventKind::Progress).unwrap();
		assert!(!handle.forward(Some(ACTIVE), ACTIVE, &TabEvent::LoadStarted, &bus));
	}

	#[test]
	fn titles_have_no_handle() {
		assert!(EventFilter::create(EventKind::TitleChanged).is_none());
		let filter = EventFilter::new();
		let bus = CurrentTabBus::default();
		assert!(!filter.route(Some(ACTIVE), ACTIVE, &TabEvent::TitleChanged { title: "t".into() }, &bus));
	}
}
