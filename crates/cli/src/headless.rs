//! Simulated rendering engine.
//!
//! Every navigation completes instantly: the engine queues a load cycle on an
//! event channel for the shell to feed back into the manager. Shutdown
//! confirmations arrive on a later tick of the runtime.

use tabkeeper::{EngineFactory, ShutdownSignal, TabEngine, TabEvent, TabId};
use tokio::sync::mpsc;

/// An engine event tagged with the tab that produced it.
pub type EngineEvent = (TabId, TabEvent);

/// Creates headless engines that all report into one channel.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
	tx: mpsc::UnboundedSender<EngineEvent>,
}

impl HeadlessHost {
	pub fn new() -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
		let (tx, rx) = mpsc::unbounded_channel();
		(Self { tx }, rx)
	}
}

impl EngineFactory for HeadlessHost {
	fn create(&mut self, id: TabId) -> Box<dyn TabEngine> {
		Box::new(HeadlessEngine {
			id,
			location: String::new(),
			tx: self.tx.clone(),
		})
	}
}

struct HeadlessEngine {
	id: TabId,
	location: String,
	tx: mpsc::UnboundedSender<EngineEvent>,
}

impl HeadlessEngine {
	fn emit(&self, event: TabEvent) {
		if self.tx.send((self.id, event)).is_err() {
			tracing::debug!(tab = %self.id, "shell gone, dropping engine event");
		}
	}
}

impl TabEngine for HeadlessEngine {
	fn navigate(&mut self, location: &str) {
		self.location = location.to_string();
		self.emit(TabEvent::LoadStarted);
		self.emit(TabEvent::UrlChanged {
			url: location.to_string(),
		});
		self.emit(TabEvent::Progress { percent: 100 });
		self.emit(TabEvent::LoadFinished { ok: true });
		self.emit(TabEvent::TitleChanged {
			title: title_for(location),
		});
	}

	fn current_location(&self) -> String {
		self.location.clone()
	}

	fn request_shutdown(&mut self, done: ShutdownSignal) {
		let id = self.id;
		match tokio::runtime::Handle::try_current() {
			Ok(handle) => {
				handle.spawn(async move {
					tokio::task::yield_now().await;
					tracing::trace!(tab = %id, "headless engine shut down");
					done.complete();
				});
			}
			Err(_) => done.complete(),
		}
	}
}

/// Page title for a location: the host part of a URL, or the location itself.
fn title_for(location: &str) -> String {
	let rest = location.split_once("://").map_or(location, |(_, rest)| rest);
	let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
	if host.is_empty() {
		location.to_string()
	} else {
		host.to_string()
	}
}
