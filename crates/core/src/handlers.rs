//! Listener registry shared by the event buses.
//!
//! Listeners are synchronous callbacks stored in an [`IndexMap`] keyed by
//! [`ListenerId`], so removal is O(1) and invocation follows registration order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::Mutex;

/// Unique identifier for a registered listener.
pub type ListenerId = u64;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Returns a new globally-unique listener ID.
pub fn next_listener_id() -> ListenerId {
	NEXT_LISTENER_ID.fetch_add(1, Ordering::SeqCst)
}

/// Listener callback for events of type `E`.
pub type ListenerFn<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Listener storage.
pub type ListenerMap<E> = Arc<Mutex<IndexMap<ListenerId, ListenerFn<E>>>>;

/// Creates an empty listener map.
pub fn listener_map<E>() -> ListenerMap<E> {
	Arc::new(Mutex::new(IndexMap::new()))
}

/// Invokes every listener in registration order.
///
/// The map lock is released before the callbacks run, so a listener may
/// register or drop other listeners.
pub fn notify<E>(listeners: &ListenerMap<E>, event: &E) {
	let snapshot: Vec<ListenerFn<E>> = listeners.lock().values().cloned().collect();
	for listener in snapshot {
		listener(event);
	}
}

/// RAII handle that unregisters a listener on drop.
///
/// Holds a weak reference to the listener map, so dropping it after the
/// owning manager is gone is a no-op.
pub struct Subscription {
	id: ListenerId,
	dropper: Option<Arc<dyn Fn(ListenerId) + Send + Sync>>,
}

impl Subscription {
	/// Creates a subscription with a custom dropper function.
	pub fn new(id: ListenerId, dropper: Arc<dyn Fn(ListenerId) + Send + Sync>) -> Self {
		Self {
			id,
			dropper: Some(dropper),
		}
	}

	/// Registers `listener` in `listeners` and returns its subscription.
	pub fn register<E>(listeners: &ListenerMap<E>, listener: ListenerFn<E>) -> Self
	where
		E: 'static,
	{
		let id = next_listener_id();
		listeners.lock().insert(id, listener);

		let weak: Weak<Mutex<IndexMap<ListenerId, ListenerFn<E>>>> = Arc::downgrade(listeners);
		let dropper = Arc::new(move |id: ListenerId| {
			if let Some(map) = weak.upgrade() {
				map.lock().shift_remove(&id);
			}
		});
		Self::new(id, dropper)
	}

	/// Returns this subscription's listener ID.
	pub fn id(&self) -> ListenerId {
		self.id
	}

	/// Explicitly unsubscribes. Equivalent to dropping.
	pub fn unsubscribe(mut self) {
		if let Some(dropper) = self.dropper.take() {
			(dropper)(self.id);
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if let Some(dropper) = self.dropper.take() {
			(dropper)(self.id);
		}
	}
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription")
			.field("id", &self.id)
			.field("active", &self.dropper.is_some())
			.finish()
	}
}
