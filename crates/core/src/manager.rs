//! The tab collection and its operations.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tabkeeper_protocol::{Geometry, LastClose, ShellEvent, TabEvent, TabId};
use tracing::{debug, info, warn};

use crate::config::TabsConfig;
use crate::error::{Result, TabError};
use crate::events::{CurrentTabBus, DEFAULT_CAPACITY, ShellBus};
use crate::filter::EventFilter;
use crate::host::{ConfigStore, EngineFactory};
use crate::shutdown::{Confirmations, ShutdownState, ShutdownTracker, TrackerStep};
use crate::tab::{TabLifecycle, TabRecord};

/// What a [`TabManager::close`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "tab", rename_all = "snake_case")]
pub enum CloseOutcome {
	/// The tab left the visible sequence; its shutdown is in flight.
	Closed(TabId),
	/// It was the last tab and the quit policy applies.
	QuitRequested,
	/// It was the last tab and was navigated to the blank page.
	Blanked(TabId),
	/// The index did not resolve to an open tab.
	NotFound,
}

/// Receives events from tab engines, tagged with the originating tab.
pub trait TabEventSink {
	fn on_tab_event(&mut self, source: TabId, event: TabEvent);
}

/// Operations the command surface drives.
pub trait TabController {
	fn open(&mut self, location: &str, background: bool) -> Result<TabId>;
	fn close(&mut self, index: Option<usize>) -> Result<CloseOutcome>;
	fn switch_next(&mut self, count: usize) -> Result<Option<usize>>;
	fn switch_prev(&mut self, count: usize) -> Result<Option<usize>>;
	fn switch_to(&mut self, index: usize) -> Result<bool>;
	fn undo_close(&mut self) -> Result<TabId>;
	fn navigate_current(&mut self, location: &str) -> Result<bool>;
	fn shutdown(&mut self);
}

/// Owns every open tab, the active tab and the closed-tab undo stack.
///
/// All mutation happens through `&mut self` on the control thread. Indices
/// taken from the outside are 1-based; indices reported in [`ShellEvent`]s
/// and by [`active_index`](Self::active_index) are 0-based.
pub struct TabManager {
	/// Every live tab, including closed ones still waiting for shutdown confirmation.
	records: IndexMap<TabId, TabRecord>,
	/// Visible tabs in display order.
	visible: Vec<TabId>,
	active: Option<TabId>,
	/// Locations of individually closed tabs, newest last.
	undo_stack: Vec<String>,
	next_id: u64,
	/// Cleared when shutdown starts so teardown does not replay caches.
	replay_attached: bool,
	shutdown: ShutdownState,
	confirmations: Confirmations,
	filter: EventFilter,
	current: CurrentTabBus,
	shell: ShellBus,
	engines: Box<dyn EngineFactory>,
	config: Arc<dyn ConfigStore>,
}

impl TabManager {
	/// Creates an empty manager.
	pub fn new(engines: impl EngineFactory + 'static, config: Arc<dyn ConfigStore>) -> Self {
		Self::with_capacity(engines, config, DEFAULT_CAPACITY)
	}

	/// Creates an empty manager whose buses buffer `capacity` events.
	pub fn with_capacity(engines: impl EngineFactory + 'static, config: Arc<dyn ConfigStore>, capacity: usize) -> Self {
		Self {
			records: IndexMap::new(),
			visible: Vec::new(),
			active: None,
			undo_stack: Vec::new(),
			next_id: 1,
			replay_attached: true,
			shutdown: ShutdownState::Idle,
			confirmations: Confirmations::new(),
			filter: EventFilter::new(),
			current: CurrentTabBus::new(capacity),
			shell: ShellBus::new(capacity),
			engines: Box::new(engines),
			config,
		}
	}

	/// Creates a manager configured from a loaded [`TabsConfig`].
	pub fn from_config(engines: impl EngineFactory + 'static, config: TabsConfig) -> Self {
		let capacity = config.bus_capacity;
		Self::with_capacity(engines, Arc::new(config), capacity)
	}

	/// The shared current-tab outputs.
	pub fn current_events(&self) -> &CurrentTabBus {
		&self.current
	}

	/// List, label, shutdown, quit and resize notifications.
	pub fn shell_events(&self) -> &ShellBus {
		&self.shell
	}

	/// Number of visible tabs.
	pub fn count(&self) -> usize {
		self.visible.len()
	}

	pub fn is_empty(&self) -> bool {
		self.visible.is_empty()
	}

	/// Number of tab records still alive, including tabs awaiting shutdown confirmation.
	pub fn live_tabs(&self) -> usize {
		self.records.len()
	}

	/// Visible tabs in display order.
	pub fn tab_ids(&self) -> &[TabId] {
		&self.visible
	}

	/// 0-based index of the active tab.
	pub fn active_index(&self) -> Option<usize> {
		self.active.and_then(|id| self.position(id))
	}

	/// The active tab.
	pub fn current(&self) -> Option<TabId> {
		self.active
	}

	/// Resolves a 1-based index to a visible tab.
	pub fn tab_at(&self, index: usize) -> Option<TabId> {
		index.checked_sub(1).and_then(|i| self.visible.get(i)).copied()
	}

	/// Visible label of `id`.
	pub fn label(&self, id: TabId) -> Option<&str> {
		self.records.get(&id).map(TabRecord::label)
	}

	/// Visible labels in display order.
	pub fn labels(&self) -> Vec<&str> {
		self.visible
			.iter()
			.filter_map(|id| self.records.get(id).map(TabRecord::label))
			.collect()
	}

	/// Current location of `id`.
	pub fn location(&self, id: TabId) -> Option<String> {
		self.records.get(&id).map(TabRecord::location)
	}

	/// Current location of the active tab.
	pub fn current_location(&self) -> Option<String> {
		self.active.and_then(|id| self.location(id))
	}

	/// Lifecycle of a live tab record.
	pub fn lifecycle(&self, id: TabId) -> Option<TabLifecycle> {
		self.records.get(&id).map(TabRecord::lifecycle)
	}

	/// Locations available to [`undo_close`](Self::undo_close), oldest first.
	pub fn closed_locations(&self) -> &[String] {
		&self.undo_stack
	}

	pub fn shutdown_state(&self) -> &ShutdownState {
		&self.shutdown
	}

	/// Opens `location` in a new tab and returns its identity.
	///
	/// Foreground tabs become active immediately. A background tab becomes
	/// active only when no other tab is.
	pub fn open(&mut self, location: &str, background: bool) -> Result<TabId> {
		self.ensure_idle()?;

		let id = TabId::new(self.next_id);
		self.next_id += 1;

		let engine = self.engines.create(id);
		let mut record = TabRecord::new(id, engine, location);
		record.navigate(location);
		self.records.insert(id, record);
		self.visible.push(id);

		info!(tab = %id, location, background, count = self.visible.len(), "opened tab");

		if !background || self.active.is_none() {
			self.activate(Some(id));
		}
		self.emit_list_changed();
		Ok(id)
	}

	/// Closes the tab at the 1-based `index`, or the active tab.
	///
	/// The last remaining tab is never removed: depending on the configured
	/// [`LastClose`] policy the shell is asked to quit or the tab is blanked.
	pub fn close(&mut self, index: Option<usize>) -> Result<CloseOutcome> {
		self.ensure_idle()?;

		let Some(pos) = self.resolve(index) else {
			debug!(?index, count = self.visible.len(), "close: no such tab");
			return Ok(CloseOutcome::NotFound);
		};
		let id = self.visible[pos];

		if self.visible.len() > 1 {
			if let Some(location) = self.location(id) {
				self.undo_stack.push(location);
			}
			self.remove_visible(pos);
			self.request_shutdown(id);
			info!(tab = %id, count = self.visible.len(), "closed tab");
			self.emit_list_changed();
			return Ok(CloseOutcome::Closed(id));
		}

		match self.config.last_close() {
			LastClose::Quit => {
				info!(tab = %id, "last tab closed, requesting quit");
				self.shell.publish(ShellEvent::Quit);
				Ok(CloseOutcome::QuitRequested)
			}
			LastClose::Blank => {
				let blank = self.config.blank_page().to_string();
				if let Some(record) = self.records.get_mut(&id) {
					record.navigate(&blank);
				}
				info!(tab = %id, "last tab closed, blanking it");
				Ok(CloseOutcome::Blanked(id))
			}
		}
	}

	/// Moves the active tab `count` positions right.
	///
	/// Returns the new 0-based index, or `None` when there are no tabs.
	pub fn switch_next(&mut self, count: usize) -> Result<Option<usize>> {
		self.ensure_idle()?;
		let Some(current) = self.active_index() else {
			return Ok(None);
		};
		let len = self.visible.len();
		let count = count.max(1);

		let index = if count < len - current {
			current + count
		} else if self.config.wrap_navigation() {
			(current + count % len) % len
		} else {
			return Err(TabError::LastTab);
		};
		self.switch_index(index);
		Ok(Some(index))
	}

	/// Moves the active tab `count` positions left.
	///
	/// Returns the new 0-based index, or `None` when there are no tabs.
	pub fn switch_prev(&mut self, count: usize) -> Result<Option<usize>> {
		self.ensure_idle()?;
		let Some(current) = self.active_index() else {
			return Ok(None);
		};
		let len = self.visible.len();
		let count = count.max(1);

		let index = if let Some(target) = current.checked_sub(count) {
			target
		} else if self.config.wrap_navigation() {
			let back = count % len;
			(current + len - back) % len
		} else {
			return Err(TabError::FirstTab);
		};
		self.switch_index(index);
		Ok(Some(index))
	}

	/// Activates the tab at the 1-based `index`. Out-of-range indices are ignored.
	pub fn switch_to(&mut self, index: usize) -> Result<bool> {
		self.ensure_idle()?;
		match self.resolve(Some(index)) {
			Some(pos) => {
				self.switch_index(pos);
				Ok(true)
			}
			None => {
				debug!(index, count = self.visible.len(), "switch: no such tab");
				Ok(false)
			}
		}
	}

	/// Reopens the most recently closed location as a foreground tab.
	pub fn undo_close(&mut self) -> Result<TabId> {
		self.ensure_idle()?;
		let location = self.undo_stack.pop().ok_or(TabError::NothingToUndo)?;
		self.open(&location, false)
	}

	/// Navigates the active tab. Returns false when there is no tab.
	pub fn navigate_current(&mut self, location: &str) -> Result<bool> {
		self.ensure_idle()?;
		let Some(record) = self.active.and_then(|id| self.records.get_mut(&id)) else {
			return Ok(false);
		};
		record.navigate(location);
		Ok(true)
	}

	/// Forwards a window geometry change to the shell.
	pub fn resize(&self, geometry: Geometry) {
		self.shell.publish(ShellEvent::Resized { geometry });
	}

	/// Starts shutting down every tab.
	///
	/// Completion is signaled once on the shell bus after every live tab
	/// confirmed, immediately if there are none. Calling it again is a no-op.
	pub fn shutdown(&mut self) {
		if !self.shutdown.is_idle() {
			debug!(phase = self.shutdown.phase(), "shutdown already requested");
			return;
		}
		self.replay_attached = false;

		let live = self.records.len();
		if live == 0 {
			debug!("no tabs, shutdown complete");
			self.finish_shutdown();
			return;
		}

		self.shutdown = ShutdownState::Draining(ShutdownTracker::new(live));
		let visible = self.visible.clone();
		let total = visible.len();
		for (n, id) in visible.into_iter().enumerate() {
			debug!(tab = %id, "shutting down tab {}/{}", n + 1, total);
			self.request_shutdown(id);
		}
		info!(pending = live, "shutdown started");
	}

	/// Applies every shutdown confirmation that already arrived.
	/// Returns how many were processed.
	pub fn process_confirmations(&mut self) -> usize {
		let mut processed = 0;
		while let Some(id) = self.confirmations.try_next() {
			self.confirm_shutdown(id);
			processed += 1;
		}
		processed
	}

	/// Starts shutdown if needed and waits until every tab confirmed.
	pub async fn wait_for_shutdown(&mut self) {
		self.shutdown();
		self.process_confirmations();
		while !self.shutdown.is_complete() {
			match self.confirmations.next().await {
				Some(id) => self.confirm_shutdown(id),
				None => break,
			}
		}
	}

	/// Handles one tab's shutdown confirmation.
	pub fn confirm_shutdown(&mut self, id: TabId) {
		if self.records.shift_remove(&id).is_none() {
			warn!(tab = %id, "shutdown confirmation for unknown tab");
			return;
		}
		if let Some(pos) = self.position(id) {
			self.remove_visible(pos);
			self.emit_list_changed();
		}
		debug!(tab = %id, remaining = self.records.len(), "tab shut down");

		let step = match &mut self.shutdown {
			ShutdownState::Draining(tracker) => tracker.confirm(id),
			ShutdownState::Idle => return,
			ShutdownState::Complete => {
				warn!(tab = %id, "tab confirmed shutdown after completion");
				return;
			}
		};
		match step {
			TrackerStep::Completed => self.finish_shutdown(),
			TrackerStep::Pending(pending) => debug!(pending, "waiting for tabs"),
			TrackerStep::Duplicate | TrackerStep::AlreadyComplete => {}
		}
	}

	fn finish_shutdown(&mut self) {
		self.shutdown = ShutdownState::Complete;
		info!("tab shutdown complete");
		self.shell.publish(ShellEvent::ShutdownComplete);
	}

	fn ensure_idle(&self) -> Result<()> {
		if self.shutdown.is_idle() {
			Ok(())
		} else {
			Err(TabError::ShuttingDown)
		}
	}

	fn position(&self, id: TabId) -> Option<usize> {
		self.visible.iter().position(|v| *v == id)
	}

	/// Resolves a 1-based index, or the active tab for `None`, to a position.
	fn resolve(&self, index: Option<usize>) -> Option<usize> {
		match index {
			None => self.active_index(),
			Some(n) => (1..=self.visible.len()).contains(&n).then(|| n - 1),
		}
	}

	fn switch_index(&mut self, pos: usize) {
		let Some(&id) = self.visible.get(pos) else {
			debug_assert!(false, "switch to position {pos} outside {} tabs", self.visible.len());
			return;
		};
		if self.activate(Some(id)) {
			self.emit_list_changed();
		}
	}

	/// Removes the tab at `pos` from the visible sequence. When it was
	/// active, the tab now at the same position (or the new last tab) takes over.
	fn remove_visible(&mut self, pos: usize) {
		let id = self.visible.remove(pos);
		if self.active == Some(id) {
			let next = if self.visible.is_empty() {
				None
			} else {
				Some(self.visible[pos.min(self.visible.len() - 1)])
			};
			self.activate(next);
		}
		self.check_invariants();
	}

	fn request_shutdown(&mut self, id: TabId) {
		let signal = self.confirmations.signal(id);
		match self.records.get_mut(&id) {
			Some(record) => record.begin_shutdown(signal),
			None => warn!(tab = %id, "shutdown requested for unknown tab"),
		}
	}

	/// Makes `id` the active tab and replays its cached events.
	/// Returns whether the active tab changed.
	fn activate(&mut self, id: Option<TabId>) -> bool {
		if self.active == id {
			return false;
		}
		self.active = id;
		if let Some(id) = id {
			debug!(tab = %id, "active tab changed");
			self.replay(id);
		}
		true
	}

	fn replay(&self, id: TabId) {
		if !self.replay_attached {
			return;
		}
		let Some(record) = self.records.get(&id) else {
			return;
		};
		for event in record.cache().replay() {
			self.current.publish(event.clone());
		}
	}

	fn emit_list_changed(&self) {
		self.shell.publish(ShellEvent::ListChanged {
			count: self.visible.len(),
			active: self.active_index(),
		});
	}

	fn check_invariants(&mut self) {
		let consistent = match self.active {
			Some(id) => self.visible.contains(&id),
			None => self.visible.is_empty(),
		};
		debug_assert!(consistent, "active tab {:?} not in {:?}", self.active, self.visible);
		if !consistent {
			warn!(active = ?self.active, "active tab out of range, resetting");
			self.active = self.visible.first().copied();
		}
	}
}

impl TabEventSink for TabManager {
	fn on_tab_event(&mut self, source: TabId, event: TabEvent) {
		let Some(record) = self.records.get_mut(&source) else {
			warn!(tab = %source, ?event, "event from unknown tab");
			return;
		};

		match event {
			TabEvent::TitleChanged { title } => {
				if record.set_title(&title) {
					let label = record.label().to_string();
					if let Some(index) = self.position(source) {
						self.shell.publish(ShellEvent::LabelChanged { index, label });
					}
				}
			}
			TabEvent::OpenRequested { url } => {
				if let Err(err) = self.open(&url, false) {
					warn!(tab = %source, url, error = %err, "cannot open requested tab");
				}
			}
			event => {
				record.record_event(&event);
				self.filter.route(self.active, source, &event, &self.current);
			}
		}
	}
}

impl TabController for TabManager {
	fn open(&mut self, location: &str, background: bool) -> Result<TabId> {
		TabManager::open(self, location, background)
	}

	fn close(&mut self, index: Option<usize>) -> Result<CloseOutcome> {
		TabManager::close(self, index)
	}

	fn switch_next(&mut self, count: usize) -> Result<Option<usize>> {
		TabManager::switch_next(self, count)
	}

	fn switch_prev(&mut self, count: usize) -> Result<Option<usize>> {
		TabManager::switch_prev(self, count)
	}

	fn switch_to(&mut self, index: usize) -> Result<bool> {
		TabManager::switch_to(self, index)
	}

	fn undo_close(&mut self) -> Result<TabId> {
		TabManager::undo_close(self)
	}

	fn navigate_current(&mut self, location: &str) -> Result<bool> {
		TabManager::navigate_current(self, location)
	}

	fn shutdown(&mut self) {
		TabManager::shutdown(self)
	}
}
