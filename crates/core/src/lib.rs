//! Tab collection manager for browser shells.
//!
//! [`TabManager`] owns the open tabs, the active tab and the closed-tab undo
//! stack. Engine events enter through [`TabEventSink`]; events from the
//! active tab leave through the [`CurrentTabBus`], everything the tab strip
//! and application need through the [`ShellBus`]. Shutdown fans a request
//! out to every tab and signals [`ShellEvent::ShutdownComplete`] exactly once
//! after all of them confirmed.
//!
//! The rendering engine, settings, notifications and clipboard are supplied
//! by the host through the traits in [`host`].

pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod filter;
pub mod handlers;
pub mod host;
pub mod manager;
pub mod shutdown;
pub mod tab;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use commands::{CommandCtx, CommandId, CommandOutcome, lookup_command, run_command, run_named};
pub use config::TabsConfig;
pub use error::{Result, TabError};
pub use events::{CurrentTabBus, EventBus, EventStream, ShellBus};
pub use filter::{EventFilter, FilterHandle};
pub use handlers::Subscription;
pub use host::{Clipboard, ConfigStore, EngineFactory, LogNotifier, MemoryClipboard, Notifier, TabEngine};
pub use manager::{CloseOutcome, TabController, TabEventSink, TabManager};
pub use shutdown::{ShutdownSignal, ShutdownState, ShutdownTracker};
pub use tab::{EventCache, TabLifecycle, TabRecord};
pub use tabkeeper_protocol::{EventKind, Geometry, LastClose, Selection, ShellEvent, TabEvent, TabId};
