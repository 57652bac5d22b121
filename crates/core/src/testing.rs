//! Test doubles for the manager's collaborators.
//!
//! - [`FakeHost`]: scripted engines that record navigations and hold shutdown
//!   signals until the test completes (or drops) them
//! - [`RecordingNotifier`]: collects reported error messages
//!
//! # Example
//!
//! ```ignore
//! let host = FakeHost::new();
//! let mut tabs = TabManager::from_config(host.factory(), TabsConfig::default());
//! let id = tabs.open("https://example.com", false)?;
//! tabs.shutdown();
//! host.complete_shutdown(id);
//! tabs.process_confirmations();
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;
use parking_lot::Mutex;
use tabkeeper_protocol::TabId;

use crate::host::{EngineFactory, Notifier, TabEngine};
use crate::shutdown::ShutdownSignal;

#[derive(Debug, Default)]
struct EngineState {
	location: String,
	navigations: Vec<String>,
	shutdown_requests: usize,
	pending: Option<ShutdownSignal>,
}

/// Shared state behind every engine created by [`FakeHost::factory`].
#[derive(Clone, Default)]
pub struct FakeHost {
	engines: Arc<Mutex<IndexMap<TabId, EngineState>>>,
	auto_complete: Arc<AtomicBool>,
}

impl FakeHost {
	pub fn new() -> Self {
		Self::default()
	}

	/// Engine factory to hand to the manager.
	pub fn factory(&self) -> impl EngineFactory + 'static {
		let host = self.clone();
		move |id: TabId| -> Box<dyn TabEngine> {
			host.engines.lock().insert(id, EngineState::default());
			Box::new(FakeEngine { id, host: host.clone() })
		}
	}

	/// When enabled, engines confirm shutdown as soon as it is requested.
	pub fn set_auto_complete(&self, enabled: bool) {
		self.auto_complete.store(enabled, Ordering::SeqCst);
	}

	/// Every location `id` was asked to navigate to.
	pub fn navigations(&self, id: TabId) -> Vec<String> {
		self.engines
			.lock()
			.get(&id)
			.map(|state| state.navigations.clone())
			.unwrap_or_default()
	}

	/// How many times shutdown was requested for `id`.
	pub fn shutdown_requests(&self, id: TabId) -> usize {
		self.engines.lock().get(&id).map_or(0, |state| state.shutdown_requests)
	}

	/// Tabs holding an uncompleted shutdown signal, in creation order.
	pub fn pending_shutdowns(&self) -> Vec<TabId> {
		self.engines
			.lock()
			.iter()
			.filter(|(_, state)| state.pending.is_some())
			.map(|(id, _)| *id)
			.collect()
	}

	/// Completes the pending shutdown of `id`. Returns false if none was pending.
	pub fn complete_shutdown(&self, id: TabId) -> bool {
		match self.take_signal(id) {
			Some(signal) => {
				signal.complete();
				true
			}
			None => false,
		}
	}

	/// Drops the pending shutdown signal of `id` without completing it.
	pub fn fail_shutdown(&self, id: TabId) -> bool {
		self.take_signal(id).is_some()
	}

	/// Completes every pending shutdown. Returns how many were completed.
	pub fn complete_all(&self) -> usize {
		self.pending_shutdowns()
			.into_iter()
			.filter(|id| self.complete_shutdown(*id))
			.count()
	}

	fn take_signal(&self, id: TabId) -> Option<ShutdownSignal> {
		self.engines.lock().get_mut(&id).and_then(|state| state.pending.take())
	}
}

struct FakeEngine {
	id: TabId,
	host: FakeHost,
}

impl TabEngine for FakeEngine {
	fn navigate(&mut self, location: &str) {
		let mut engines = self.host.engines.lock();
		let state = engines.entry(self.id).or_default();
		state.location = location.to_string();
		state.navigations.push(location.to_string());
	}

	fn current_location(&self) -> String {
		self.host
			.engines
			.lock()
			.get(&self.id)
			.map(|state| state.location.clone())
			.unwrap_or_default()
	}

	fn request_shutdown(&mut self, done: ShutdownSignal) {
		if self.host.auto_complete.load(Ordering::SeqCst) {
			if let Some(state) = self.host.engines.lock().get_mut(&self.id) {
				state.shutdown_requests += 1;
			}
			done.complete();
			return;
		}
		let mut engines = self.host.engines.lock();
		let state = engines.entry(self.id).or_default();
		state.shutdown_requests += 1;
		state.pending = Some(done);
	}
}

/// Notifier that keeps every reported message.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
	messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn messages(&self) -> Vec<String> {
		self.messages.lock().clone()
	}
}

impl Notifier for RecordingNotifier {
	fn report_error(&self, message: &str) {
		self.messages.lock().push(message.to_string());
	}
}
