//! Fan-out/fan-in shutdown of every tab.
//!
//! Each tab receives a [`ShutdownSignal`] with its shutdown request. Completed
//! (or dropped) signals land on the manager's confirmation channel, which the
//! control thread drains into a [`ShutdownTracker`]. The tracker fires exactly
//! once, when the last outstanding tab confirms.

use std::collections::HashSet;

use tabkeeper_protocol::TabId;
use tokio::sync::mpsc;

/// Completion handle passed to [`TabEngine::request_shutdown`](crate::host::TabEngine::request_shutdown).
///
/// Dropping the signal without calling [`complete`](Self::complete) still
/// confirms the shutdown so a failing tab cannot block exit.
#[derive(Debug)]
pub struct ShutdownSignal {
	tab: TabId,
	tx: Option<mpsc::UnboundedSender<TabId>>,
}

impl ShutdownSignal {
	pub(crate) fn new(tab: TabId, tx: mpsc::UnboundedSender<TabId>) -> Self {
		Self { tab, tx: Some(tx) }
	}

	/// Returns the tab this signal confirms.
	pub fn tab(&self) -> TabId {
		self.tab
	}

	/// Confirms that the tab finished tearing down.
	pub fn complete(mut self) {
		if let Some(tx) = self.tx.take() {
			let _ = tx.send(self.tab);
		}
	}
}

impl Drop for ShutdownSignal {
	fn drop(&mut self) {
		if let Some(tx) = self.tx.take() {
			tracing::warn!(tab = %self.tab, "shutdown signal dropped without completion, treating as done");
			let _ = tx.send(self.tab);
		}
	}
}

/// Receiving end of shutdown confirmations, owned by the manager.
pub(crate) struct Confirmations {
	tx: mpsc::UnboundedSender<TabId>,
	rx: mpsc::UnboundedReceiver<TabId>,
}

impl Confirmations {
	pub(crate) fn new() -> Self {
		let (tx, rx) = mpsc::unbounded_channel();
		Self { tx, rx }
	}

	/// Creates the signal handed to `tab`'s engine.
	pub(crate) fn signal(&self, tab: TabId) -> ShutdownSignal {
		ShutdownSignal::new(tab, self.tx.clone())
	}

	/// Returns the next confirmation if one already arrived.
	pub(crate) fn try_next(&mut self) -> Option<TabId> {
		self.rx.try_recv().ok()
	}

	/// Waits for the next confirmation.
	pub(crate) async fn next(&mut self) -> Option<TabId> {
		self.rx.recv().await
	}
}

/// Result of feeding one confirmation to a [`ShutdownTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerStep {
	/// Counted; this many tabs are still outstanding.
	Pending(usize),
	/// Counted, and it was the last one.
	Completed,
	/// This tab was already counted.
	Duplicate,
	/// The tracker already fired.
	AlreadyComplete,
}

/// Counting join over the tabs alive when shutdown started.
#[derive(Debug, Clone)]
pub struct ShutdownTracker {
	pending: usize,
	confirmed: HashSet<TabId>,
	fired: bool,
}

impl ShutdownTracker {
	pub fn new(pending: usize) -> Self {
		Self {
			pending,
			confirmed: HashSet::with_capacity(pending),
			fired: pending == 0,
		}
	}

	/// Number of tabs that have not confirmed yet.
	pub fn pending(&self) -> usize {
		self.pending
	}

	/// Returns true once the count reached zero.
	pub fn is_complete(&self) -> bool {
		self.fired
	}

	/// Counts `tab` once. Only the transition from 1 to 0 yields [`TrackerStep::Completed`].
	pub fn confirm(&mut self, tab: TabId) -> TrackerStep {
		if !self.confirmed.insert(tab) {
			tracing::warn!(tab = %tab, "duplicate shutdown confirmation ignored");
			return TrackerStep::Duplicate;
		}
		if self.pending == 0 {
			debug_assert!(self.fired, "tracker at zero without having fired");
			tracing::error!(tab = %tab, "shutdown confirmation after completion");
			return TrackerStep::AlreadyComplete;
		}

		self.pending -= 1;
		if self.pending == 0 {
			self.fired = true;
			TrackerStep::Completed
		} else {
			TrackerStep::Pending(self.pending)
		}
	}
}

/// Shutdown coordinator state.
#[derive(Debug, Clone, Default)]
pub enum ShutdownState {
	/// Normal operation.
	#[default]
	Idle,
	/// Waiting for tabs to confirm.
	Draining(ShutdownTracker),
	/// Completion has been signaled.
	Complete,
}

impl ShutdownState {
	pub fn is_idle(&self) -> bool {
		matches!(self, ShutdownState::Idle)
	}

	pub fn is_complete(&self) -> bool {
		matches!(self, ShutdownState::Complete)
	}

	pub fn phase(&self) -> &'static str {
		match self {
			ShutdownState::Idle => "idle",
			ShutdownState::Draining(_) => "draining",
			ShutdownState::Complete => "complete",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tab(n: u64) -> TabId {
		TabId::new(n)
	}

	#[test]
	fn tracker_fires_on_last_confirmation_only() {
		let mut tracker = ShutdownTracker::new(3);
		assert_eq!(tracker.confirm(tab(2)), TrackerStep::Pending(2));
		assert_eq!(tracker.confirm(tab(3)), TrackerStep::Pending(1));
		assert!(!tracker.is_complete());
		assert_eq!(tracker.confirm(tab(1)), TrackerStep::Completed);
		assert!(tracker.is_complete());
	}

	#[test]
	fn tracker_ignores_duplicates() {
		let mut tracker = ShutdownTracker::new(2);
		assert_eq!(tracker.confirm(tab(1)), TrackerStep::Pending(1));
		assert_eq!(tracker.confirm(tab(1)), TrackerStep::Duplicate);
		assert_eq!(tracker.pending(), 1);
		assert_eq!(tracker.confirm(tab(2)), TrackerStep::Completed);
	}

	#[test]
	fn empty_tracker_starts_complete() {
		assert!(ShutdownTracker::new(0).is_complete());
	}

	#[test]
	fn completed_signal_is_received() {
		let mut confirmations = Confirmations::new();
		confirmations.signal(tab(4)).complete();
		assert_eq!(confirmations.try_next(), Some(tab(4)));
		assert_eq!(confirmations.try_next(), None);
	}

	#[test]
	fn dropped_signal_counts_as_completion() {
		let mut confirmations = Confirmations::new();
		let signal = confirmations.signal(tab(9));
		assert_eq!(signal.tab(), tab(9));
		drop(signal);
		assert_eq!(confirmations.try_next(), Some(tab(9)));
	}

	#[test]
	fn state_phases() {
		assert_eq!(ShutdownState::default().phase(), "idle");
		assert_eq!(ShutdownState::Draining(ShutdownTracker::new(1)).phase(), "draining");
		assert!(ShutdownState::Complete.is_complete());
	}
}
