//! Shutdown coordination across live and closing tabs.

use tabkeeper::testing::FakeHost;
use tabkeeper::{EventKind, ShellEvent, TabEvent, TabEventSink, TabManager, TabsConfig};

fn manager() -> (TabManager, FakeHost) {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::DEBUG)
		.try_init();
	let host = FakeHost::new();
	(TabManager::from_config(host.factory(), TabsConfig::default()), host)
}

fn completions(events: &[ShellEvent]) -> usize {
	events.iter().filter(|e| **e == ShellEvent::ShutdownComplete).count()
}

#[test]
fn shutdown_with_no_tabs_completes_synchronously() {
	let (mut tabs, _host) = manager();
	let mut shell = tabs.shell_events().subscribe();

	tabs.shutdown();
	assert!(tabs.shutdown_state().is_complete());
	tabs.shutdown();

	assert_eq!(completions(&shell.drain()), 1);
}

#[test]
fn completion_fires_once_in_any_confirmation_order() {
	let orders: [[usize; 4]; 4] = [[0, 1, 2, 3], [3, 2, 1, 0], [2, 0, 3, 1], [1, 3, 0, 2]];

	for order in orders {
		let (mut tabs, host) = manager();
		let ids: Vec<_> = (0..4).map(|n| tabs.open(&format!("t{n}"), false).unwrap()).collect();
		let mut shell = tabs.shell_events().subscribe();

		tabs.shutdown();
		assert_eq!(host.pending_shutdowns(), ids);

		for (step, &n) in order.iter().enumerate() {
			assert_eq!(completions(&shell.drain()), 0, "completed early in order {order:?}");
			assert!(host.complete_shutdown(ids[n]));
			assert_eq!(tabs.process_confirmations(), 1);
			assert_eq!(tabs.live_tabs(), 3 - step);
		}

		assert_eq!(completions(&shell.drain()), 1, "order {order:?}");
		assert!(tabs.shutdown_state().is_complete());
		assert!(tabs.is_empty());
	}
}

#[test]
fn shutdown_requests_each_tab_once() {
	let (mut tabs, host) = manager();
	let a = tabs.open("a", false).unwrap();
	let b = tabs.open("b", true).unwrap();

	tabs.shutdown();
	tabs.shutdown();

	assert_eq!(host.shutdown_requests(a), 1);
	assert_eq!(host.shutdown_requests(b), 1);
}

#[test]
fn tab_closed_before_shutdown_delays_completion() {
	let (mut tabs, host) = manager();
	let closing = tabs.open("closing", false).unwrap();
	let open = tabs.open("open", false).unwrap();
	tabs.close(Some(1)).unwrap();
	let mut shell = tabs.shell_events().subscribe();

	tabs.shutdown();
	assert_eq!(host.shutdown_requests(closing), 1);

	host.complete_shutdown(open);
	tabs.process_confirmations();
	assert_eq!(completions(&shell.drain()), 0);
	assert!(!tabs.shutdown_state().is_complete());

	host.complete_shutdown(closing);
	tabs.process_confirmations();
	assert_eq!(completions(&shell.drain()), 1);
}

#[test]
fn dropped_signal_still_counts_as_confirmation() {
	let (mut tabs, host) = manager();
	let a = tabs.open("a", false).unwrap();
	let b = tabs.open("b", false).unwrap();
	let mut shell = tabs.shell_events().subscribe();

	tabs.shutdown();
	assert!(host.fail_shutdown(a));
	assert!(host.complete_shutdown(b));
	assert_eq!(tabs.process_confirmations(), 2);

	assert_eq!(completions(&shell.drain()), 1);
}

#[test]
fn duplicate_confirmations_are_ignored() {
	let (mut tabs, host) = manager();
	let a = tabs.open("a", false).unwrap();
	let b = tabs.open("b", false).unwrap();
	let mut shell = tabs.shell_events().subscribe();

	tabs.shutdown();
	host.complete_shutdown(a);
	tabs.process_confirmations();
	tabs.confirm_shutdown(a);
	assert!(!tabs.shutdown_state().is_complete());

	host.complete_shutdown(b);
	tabs.process_confirmations();
	tabs.confirm_shutdown(b);

	assert_eq!(completions(&shell.drain()), 1);
}

#[test]
fn confirmations_outside_shutdown_only_release_the_tab() {
	let (mut tabs, host) = manager();
	let a = tabs.open("a", false).unwrap();
	tabs.open("b", false).unwrap();
	let mut shell = tabs.shell_events().subscribe();

	tabs.close(Some(1)).unwrap();
	host.complete_shutdown(a);
	tabs.process_confirmations();

	assert_eq!(tabs.live_tabs(), 1);
	assert!(tabs.shutdown_state().is_idle());
	assert_eq!(completions(&shell.drain()), 0);
}

#[test]
fn no_replay_once_shutdown_started() {
	let (mut tabs, _host) = manager();
	let a = tabs.open("a", false).unwrap();
	let b = tabs.open("b", false).unwrap();
	tabs.on_tab_event(a, TabEvent::Progress { percent: 50 });
	let mut progress = tabs.current_events().subscribe(EventKind::Progress).unwrap();

	tabs.shutdown();
	// Confirming the active tab first hands activation to `a`.
	tabs.confirm_shutdown(b);

	assert_eq!(tabs.current(), Some(a));
	assert!(progress.drain().is_empty());
}

#[tokio::test]
async fn wait_for_shutdown_resolves_after_async_confirmations() {
	let (mut tabs, host) = manager();
	for n in 0..3 {
		tabs.open(&format!("t{n}"), n > 0).unwrap();
	}
	let mut shell = tabs.shell_events().subscribe();

	tabs.shutdown();
	let pending = host.pending_shutdowns();
	let completer = tokio::spawn({
		let host = host.clone();
		async move {
			for id in pending.into_iter().rev() {
				tokio::task::yield_now().await;
				host.complete_shutdown(id);
			}
		}
	});

	tabs.wait_for_shutdown().await;
	completer.await.unwrap();

	assert!(tabs.shutdown_state().is_complete());
	assert_eq!(completions(&shell.drain()), 1);
}

#[tokio::test]
async fn wait_for_shutdown_with_immediate_engines() {
	let (mut tabs, host) = manager();
	host.set_auto_complete(true);
	tabs.open("a", false).unwrap();
	tabs.open("b", false).unwrap();

	tabs.wait_for_shutdown().await;
	assert!(tabs.shutdown_state().is_complete());
	assert_eq!(tabs.live_tabs(), 0);
}
