//! Behavior of the tab collection under open/close/switch/undo sequences.

use tabkeeper::testing::FakeHost;
use tabkeeper::{CloseOutcome, LastClose, ShellEvent, TabError, TabManager, TabsConfig};

fn manager(config: TabsConfig) -> (TabManager, FakeHost) {
	let host = FakeHost::new();
	(TabManager::from_config(host.factory(), config), host)
}

fn config(last_close: LastClose, wrap: bool) -> TabsConfig {
	TabsConfig {
		last_close,
		wrap,
		..TabsConfig::default()
	}
}

fn assert_active_valid(tabs: &TabManager) {
	match tabs.active_index() {
		Some(i) => assert!(i < tabs.count(), "active {} outside {} tabs", i, tabs.count()),
		None => assert!(tabs.is_empty()),
	}
}

#[test]
fn active_index_stays_valid_across_open_close_sequences() {
	let (mut tabs, _host) = manager(config(LastClose::Blank, true));
	assert_active_valid(&tabs);

	// Deterministic pseudo-random walk over the operations.
	let mut seed: u64 = 0x9e37_79b9_7f4a_7c15;
	for step in 0..400 {
		seed ^= seed << 13;
		seed ^= seed >> 7;
		seed ^= seed << 17;
		match seed % 6 {
			0 | 1 => {
				tabs.open(&format!("https://site{step}.example"), seed % 4 == 0).unwrap();
			}
			2 => {
				tabs.close(None).unwrap();
			}
			3 => {
				let index = (seed as usize / 7) % (tabs.count() + 2);
				tabs.close(Some(index)).unwrap();
			}
			4 => {
				tabs.switch_next((seed % 5) as usize).unwrap();
			}
			_ => {
				let _ = tabs.undo_close();
			}
		}
		assert_active_valid(&tabs);
	}
}

#[test]
fn last_tab_policy_only_applies_to_the_last_tab() {
	let (mut tabs, _host) = manager(config(LastClose::Quit, true));
	let mut quits = tabs.shell_events().subscribe();

	tabs.open("https://first.example", false).unwrap();
	for n in 0..4 {
		tabs.open(&format!("https://bg{n}.example"), true).unwrap();
	}

	while tabs.count() > 1 {
		assert!(matches!(tabs.close(Some(tabs.count())).unwrap(), CloseOutcome::Closed(_)));
	}
	assert!(!quits.drain().contains(&ShellEvent::Quit));

	assert_eq!(tabs.close(None).unwrap(), CloseOutcome::QuitRequested);
	assert_eq!(tabs.count(), 1);
	let events = quits.drain();
	assert_eq!(events.iter().filter(|e| **e == ShellEvent::Quit).count(), 1);
}

#[test]
fn closing_last_tab_with_blank_policy_navigates_to_blank() {
	let (mut tabs, host) = manager(config(LastClose::Blank, true));
	let only = tabs.open("https://only.example", false).unwrap();
	let mut shell = tabs.shell_events().subscribe();

	assert_eq!(tabs.close(None).unwrap(), CloseOutcome::Blanked(only));
	assert_eq!(tabs.count(), 1);
	assert_eq!(tabs.location(only).as_deref(), Some("about:blank"));
	assert_eq!(host.navigations(only), vec!["https://only.example", "about:blank"]);
	assert_eq!(host.shutdown_requests(only), 0);
	assert!(!shell.drain().contains(&ShellEvent::Quit));
	assert!(tabs.closed_locations().is_empty());
}

#[test]
fn undo_reopens_in_lifo_order() {
	let (mut tabs, _host) = manager(config(LastClose::Blank, true));
	tabs.open("https://keep.example", false).unwrap();
	tabs.open("https://a.example", false).unwrap();
	tabs.open("https://b.example", false).unwrap();

	tabs.close(Some(2)).unwrap();
	tabs.close(Some(2)).unwrap();
	assert_eq!(tabs.closed_locations(), ["https://a.example", "https://b.example"]);

	tabs.undo_close().unwrap();
	assert_eq!(tabs.current_location().as_deref(), Some("https://b.example"));
	tabs.undo_close().unwrap();
	assert_eq!(tabs.current_location().as_deref(), Some("https://a.example"));

	let count = tabs.count();
	assert!(matches!(tabs.undo_close(), Err(TabError::NothingToUndo)));
	assert_eq!(tabs.count(), count);
}

#[test]
fn switching_wraps_modulo_tab_count() {
	let (mut tabs, _host) = manager(config(LastClose::Blank, true));
	for n in 0..4 {
		tabs.open(&format!("t{n}"), false).unwrap();
	}
	tabs.switch_to(2).unwrap();
	assert_eq!(tabs.active_index(), Some(1));

	assert_eq!(tabs.switch_next(10).unwrap(), Some((1 + 10) % 4));
	assert_eq!(tabs.active_index(), Some(3));

	assert_eq!(tabs.switch_prev(6).unwrap(), Some(1));
	assert_eq!(tabs.switch_prev(4).unwrap(), Some(1));
	assert_eq!(tabs.switch_next(1).unwrap(), Some(2));
}

#[test]
fn huge_counts_wrap_without_overflow() {
	let (mut tabs, _host) = manager(config(LastClose::Blank, true));
	for n in 0..3 {
		tabs.open(&format!("t{n}"), false).unwrap();
	}
	tabs.switch_to(2).unwrap();

	// usize::MAX % 3 == 0, so both directions land back on the same tab.
	assert_eq!(tabs.switch_next(usize::MAX).unwrap(), Some(1));
	assert_eq!(tabs.switch_prev(usize::MAX).unwrap(), Some(1));
	assert_eq!(tabs.switch_next(usize::MAX - 1).unwrap(), Some(0));
	assert_eq!(tabs.switch_prev(usize::MAX - 1).unwrap(), Some(1));
}

#[test]
fn huge_counts_without_wrap_hit_the_boundary() {
	let (mut tabs, _host) = manager(config(LastClose::Blank, false));
	tabs.open("a", false).unwrap();
	tabs.open("b", false).unwrap();
	tabs.switch_to(1).unwrap();

	assert!(matches!(tabs.switch_next(usize::MAX), Err(TabError::LastTab)));
	assert_eq!(tabs.active_index(), Some(0));
}

#[test]
fn switching_without_wrap_reports_boundaries() {
	let (mut tabs, _host) = manager(config(LastClose::Blank, false));
	for n in 0..3 {
		tabs.open(&format!("t{n}"), false).unwrap();
	}
	tabs.switch_to(1).unwrap();

	assert!(matches!(tabs.switch_prev(1), Err(TabError::FirstTab)));
	assert_eq!(tabs.active_index(), Some(0));

	assert!(matches!(tabs.switch_next(7), Err(TabError::LastTab)));
	assert_eq!(tabs.active_index(), Some(0));

	assert_eq!(tabs.switch_next(2).unwrap(), Some(2));
}

#[test]
fn switching_with_no_tabs_is_a_noop() {
	let (mut tabs, _host) = manager(config(LastClose::Blank, false));
	assert_eq!(tabs.switch_next(1).unwrap(), None);
	assert_eq!(tabs.switch_prev(1).unwrap(), None);
	assert_eq!(tabs.close(None).unwrap(), CloseOutcome::NotFound);
}

#[test]
fn list_changes_are_announced() {
	let (mut tabs, _host) = manager(config(LastClose::Blank, true));
	let mut shell = tabs.shell_events().subscribe();

	tabs.open("a", false).unwrap();
	tabs.open("b", true).unwrap();
	tabs.switch_next(1).unwrap();
	tabs.close(None).unwrap();

	assert_eq!(
		shell.drain(),
		vec![
			ShellEvent::ListChanged { count: 1, active: Some(0) },
			ShellEvent::ListChanged { count: 2, active: Some(0) },
			ShellEvent::ListChanged { count: 2, active: Some(1) },
			ShellEvent::ListChanged { count: 1, active: Some(0) },
		]
	);
}
