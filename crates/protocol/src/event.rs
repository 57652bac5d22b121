//! Per-tab events and outward shell notifications.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Geometry;

/// Kinds of per-tab events the manager knows how to route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
	Progress,
	LoadStarted,
	LoadFinished,
	StatusMessage,
	UrlChanged,
	ScrollPosition,
	LinkHovered,
	TitleChanged,
}

impl EventKind {
	/// Kinds that are cached per tab and forwarded only from the active tab.
	pub const FILTERED: [EventKind; 7] = [
		EventKind::Progress,
		EventKind::LoadStarted,
		EventKind::LoadFinished,
		EventKind::StatusMessage,
		EventKind::UrlChanged,
		EventKind::ScrollPosition,
		EventKind::LinkHovered,
	];

	/// Returns `true` if this kind goes through the current-tab filter.
	pub fn is_filtered(self) -> bool {
		!matches!(self, EventKind::TitleChanged)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Progress => "progress",
			Self::LoadStarted => "load_started",
			Self::LoadFinished => "load_finished",
			Self::StatusMessage => "status_message",
			Self::UrlChanged => "url_changed",
			Self::ScrollPosition => "scroll_position",
			Self::LinkHovered => "link_hovered",
			Self::TitleChanged => "title_changed",
		}
	}
}

impl fmt::Display for EventKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// An event emitted by a tab's rendering engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TabEvent {
	/// Load progress in percent.
	Progress { percent: u8 },
	LoadStarted,
	LoadFinished { ok: bool },
	StatusMessage { text: String },
	UrlChanged { url: String },
	/// Scroll position in percent of the page.
	ScrollPosition { x: u8, y: u8 },
	LinkHovered { link: String, title: String, text: String },
	TitleChanged { title: String },
	/// The page asked for a location to be opened in a new tab.
	OpenRequested { url: String },
}

impl TabEvent {
	/// Returns the routing kind, or `None` for requests that are not routed.
	pub fn kind(&self) -> Option<EventKind> {
		Some(match self {
			Self::Progress { .. } => EventKind::Progress,
			Self::LoadStarted => EventKind::LoadStarted,
			Self::LoadFinished { .. } => EventKind::LoadFinished,
			Self::StatusMessage { .. } => EventKind::StatusMessage,
			Self::UrlChanged { .. } => EventKind::UrlChanged,
			Self::ScrollPosition { .. } => EventKind::ScrollPosition,
			Self::LinkHovered { .. } => EventKind::LinkHovered,
			Self::TitleChanged { .. } => EventKind::TitleChanged,
			Self::OpenRequested { .. } => return None,
		})
	}

	/// Returns the kind if this event is routed through the current-tab filter.
	pub fn filtered_kind(&self) -> Option<EventKind> {
		self.kind().filter(|kind| kind.is_filtered())
	}
}

/// Notifications the manager publishes to the surrounding shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShellEvent {
	/// Visible tab count or active index changed. `active` is 0-based.
	ListChanged { count: usize, active: Option<usize> },
	/// A tab's visible label changed. `index` is 0-based.
	LabelChanged { index: usize, label: String },
	/// Every tab confirmed its shutdown.
	ShutdownComplete,
	/// The last tab was closed under the quit policy.
	Quit,
	/// The hosting window was resized.
	Resized { geometry: Geometry },
}
