//! Typed event dispatch for the shell-facing outputs.
//!
//! - [`EventBus`] - broadcast channel plus synchronous listeners for one event type
//! - [`EventStream`] - wrapper around [`broadcast::Receiver`] with lag handling
//! - [`CurrentTabBus`] - one [`EventBus`] per filtered [`EventKind`]
//! - [`ShellBus`] - list, label, shutdown, quit and resize notifications
//!
//! Events can be consumed as streams ([`EventBus::subscribe`]) or through
//! callbacks ([`EventBus::on`]), which run synchronously on the control
//! thread during [`EventBus::publish`].

use std::sync::Arc;

use indexmap::IndexMap;
use tabkeeper_protocol::{EventKind, ShellEvent, TabEvent};
use tokio::sync::broadcast;

use crate::handlers::{ListenerMap, Subscription, listener_map, notify};

/// Default broadcast capacity for every bus.
pub const DEFAULT_CAPACITY: usize = 256;

/// Broadcast channel combined with synchronous listeners.
pub struct EventBus<E: Clone + Send + 'static> {
	tx: broadcast::Sender<E>,
	listeners: ListenerMap<E>,
}

impl<E: Clone + Send + 'static> EventBus<E> {
	/// Creates a bus with the given broadcast capacity.
	pub fn new(capacity: usize) -> Self {
		let (tx, _) = broadcast::channel(capacity.max(1));
		Self {
			tx,
			listeners: listener_map(),
		}
	}

	/// Delivers `event` to every listener, then to every stream subscriber.
	pub fn publish(&self, event: E) {
		notify(&self.listeners, &event);
		let _ = self.tx.send(event);
	}

	/// Subscribes to future events. Events published earlier are not received.
	pub fn subscribe(&self) -> EventStream<E> {
		EventStream::new(self.tx.subscribe())
	}

	/// Registers a callback invoked for every published event.
	pub fn on<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&E) + Send + Sync + 'static,
	{
		Subscription::register(&self.listeners, Arc::new(listener))
	}

	/// Returns the number of live stream subscribers.
	pub fn subscriber_count(&self) -> usize {
		self.tx.receiver_count()
	}

	/// Returns the number of registered callbacks.
	pub fn listener_count(&self) -> usize {
		self.listeners.lock().len()
	}
}

impl<E: Clone + Send + 'static> Default for EventBus<E> {
	fn default() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}
}

/// Wrapper around [`broadcast::Receiver`] that logs and skips over lag.
pub struct EventStream<E: Clone + Send + 'static> {
	rx: broadcast::Receiver<E>,
}

impl<E: Clone + Send + 'static> EventStream<E> {
	pub(crate) fn new(rx: broadcast::Receiver<E>) -> Self {
		Self { rx }
	}

	/// Receives the next event, or `None` once the bus is dropped.
	pub async fn recv(&mut self) -> Option<E> {
		loop {
			match self.rx.recv().await {
				Ok(event) => return Some(event),
				Err(broadcast::error::RecvError::Lagged(n)) => {
					tracing::warn!(dropped = n, "event stream lagged, dropped events");
				}
				Err(broadcast::error::RecvError::Closed) => return None,
			}
		}
	}

	/// Returns the next event if one is immediately available.
	pub fn try_recv(&mut self) -> Option<E> {
		loop {
			match self.rx.try_recv() {
				Ok(event) => return Some(event),
				Err(broadcast::error::TryRecvError::Lagged(n)) => {
					tracing::warn!(dropped = n, "event stream lagged, dropped events");
				}
				Err(broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed) => return None,
			}
		}
	}

	/// Drains every immediately available event.
	pub fn drain(&mut self) -> Vec<E> {
		std::iter::from_fn(|| self.try_recv()).collect()
	}
}

/// The shared "current tab" outputs, one bus per filtered kind.
pub struct CurrentTabBus {
	buses: IndexMap<EventKind, EventBus<TabEvent>>,
}

impl CurrentTabBus {
	pub fn new(capacity: usize) -> Self {
		let buses = EventKind::FILTERED
			.iter()
			.map(|kind| (*kind, EventBus::new(capacity)))
			.collect();
		Self { buses }
	}

	/// Returns the bus for `kind`, or `None` if the kind is not filtered.
	pub fn bus(&self, kind: EventKind) -> Option<&EventBus<TabEvent>> {
		self.buses.get(&kind)
	}

	/// Subscribes to the current-tab stream for `kind`.
	pub fn subscribe(&self, kind: EventKind) -> Option<EventStream<TabEvent>> {
		self.bus(kind).map(EventBus::subscribe)
	}

	/// Registers a callback for the current-tab stream of `kind`.
	pub fn on<F>(&self, kind: EventKind, listener: F) -> Option<Subscription>
	where
		F: Fn(&TabEvent) + Send + Sync + 'static,
	{
		self.bus(kind).map(|bus| bus.on(listener))
	}

	/// Publishes `event` on the bus for its kind. Unfiltered events are dropped.
	pub fn publish(&self, event: TabEvent) {
		match event.filtered_kind().and_then(|kind| self.bus(kind)) {
			Some(bus) => bus.publish(event),
			None => tracing::debug!(?event, "not a current-tab event"),
		}
	}
}

impl Default for CurrentTabBus {
	fn default() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}
}

/// Outward notifications for the tab strip, window chrome and application.
pub type ShellBus = EventBus<ShellEvent>;
