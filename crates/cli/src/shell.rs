//! Line-oriented shell around a [`TabManager`].
//!
//! Each script line is either a command (`name [json-args]`), a directive
//! (`!resize`, `!event`, `!clipboard`, `!primary`) or a `#` comment. After
//! every line, queued engine events and shutdown confirmations are fed back
//! into the manager and the resulting notifications are printed.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tabkeeper::{
	CommandCtx, CommandOutcome, EventKind, MemoryClipboard, Notifier, ShellEvent, Subscription, TabEvent, TabEventSink,
	TabManager, TabsConfig, run_named,
};
use tabkeeper_protocol::{Geometry, Selection};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::OutputFormat;
use crate::error::{Result, ShellError};
use crate::headless::{EngineEvent, HeadlessHost};
use crate::output::{Printer, Record};

/// Prints user-facing errors to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
	fn report_error(&self, message: &str) {
		eprintln!("{message}");
	}
}

#[derive(Debug, Clone, Copy)]
pub struct ShellOptions {
	pub format: OutputFormat,
	pub shutdown_timeout: Duration,
}

impl Default for ShellOptions {
	fn default() -> Self {
		Self {
			format: OutputFormat::Json,
			shutdown_timeout: Duration::from_secs(5),
		}
	}
}

/// Counts for a finished script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
	pub lines: usize,
	pub failures: usize,
	pub quit: bool,
	pub shutdown_complete: bool,
}

#[derive(Debug, Clone)]
enum Output {
	Shell(ShellEvent),
	Current(TabEvent),
}

type OutputQueue = Arc<Mutex<Vec<Output>>>;

pub struct Shell<W: Write> {
	tabs: TabManager,
	engine_events: mpsc::UnboundedReceiver<EngineEvent>,
	outputs: OutputQueue,
	_subscriptions: Vec<Subscription>,
	clipboard: MemoryClipboard,
	notifier: Box<dyn Notifier>,
	printer: Printer<W>,
	shutdown_timeout: Duration,
	summary: Summary,
}

impl<W: Write> Shell<W> {
	pub fn new(config: TabsConfig, out: W, options: ShellOptions) -> Self {
		let (host, engine_events) = HeadlessHost::new();
		let tabs = TabManager::from_config(host, config);
		let outputs: OutputQueue = Arc::default();

		let mut subscriptions = Vec::with_capacity(EventKind::FILTERED.len() + 1);
		subscriptions.push(tabs.shell_events().on({
			let outputs = Arc::clone(&outputs);
			move |event: &ShellEvent| outputs.lock().push(Output::Shell(event.clone()))
		}));
		for kind in EventKind::FILTERED {
			let outputs = Arc::clone(&outputs);
			let listener = move |event: &TabEvent| outputs.lock().push(Output::Current(event.clone()));
			subscriptions.extend(tabs.current_events().on(kind, listener));
		}

		Self {
			tabs,
			engine_events,
			outputs,
			_subscriptions: subscriptions,
			clipboard: MemoryClipboard::new(),
			notifier: Box::new(StderrNotifier),
			printer: Printer::new(out, options.format),
			shutdown_timeout: options.shutdown_timeout,
			summary: Summary::default(),
		}
	}

	/// Replaces the notifier that user-facing errors are reported to.
	pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
		self.notifier = Box::new(notifier);
		self
	}

	pub fn clipboard(&self) -> &MemoryClipboard {
		&self.clipboard
	}

	pub fn tabs(&self) -> &TabManager {
		&self.tabs
	}

	/// Runs every line of `input`, then shuts the tabs down.
	///
	/// Reading stops early when closing the last tab requests a quit.
	pub async fn run<R: AsyncBufRead + Unpin>(mut self, input: R) -> anyhow::Result<(Summary, W)> {
		let mut lines = input.lines();
		let mut number = 0;
		while let Some(line) = lines.next_line().await? {
			number += 1;
			self.execute_line(number, &line)?;
			tokio::task::yield_now().await;
			self.pump()?;
			if self.summary.quit {
				info!(line = number, "quit requested, stopping script");
				break;
			}
		}
		self.summary.lines = number;
		self.finish().await
	}

	/// Runs one script line and prints its result or error.
	pub fn execute_line(&mut self, number: usize, line: &str) -> io::Result<()> {
		let line = line.trim();
		if line.is_empty() || line.starts_with('#') {
			return Ok(());
		}
		debug!(line = number, input = line, "executing");

		match self.apply(line) {
			Ok(Some(outcome)) => self.printer.print(&Record::result(&outcome)),
			Ok(None) => Ok(()),
			Err(err) => {
				self.summary.failures += 1;
				self.printer.print(&Record::Error {
					line: number,
					input: line,
					message: err.to_string(),
				})
			}
		}
	}

	fn apply(&mut self, line: &str) -> Result<Option<CommandOutcome>> {
		let (head, rest) = split_head(line);
		if let Some(directive) = head.strip_prefix('!') {
			self.directive(directive, rest)?;
			return Ok(None);
		}

		let args = if rest.is_empty() {
			serde_json::Value::Null
		} else {
			serde_json::from_str(rest).map_err(ShellError::BadArguments)?
		};
		let mut ctx = CommandCtx::new(&mut self.tabs, &self.clipboard, self.notifier.as_ref());
		Ok(Some(run_named(head, args, &mut ctx)?))
	}

	fn directive(&mut self, name: &str, rest: &str) -> Result<()> {
		match name {
			"resize" => {
				let geometry: Geometry = serde_json::from_str(rest).map_err(ShellError::BadArguments)?;
				self.tabs.resize(geometry);
			}
			"event" => {
				let (index, event) = split_head(rest);
				let index: usize = index.parse().map_err(|_| ShellError::MissingArgument {
					directive: "event",
					expected: "a 1-based tab index and a JSON event",
				})?;
				let event: TabEvent = serde_json::from_str(event).map_err(ShellError::BadArguments)?;
				let tab = self.tabs.tab_at(index).ok_or(ShellError::NoSuchTab(index))?;
				self.tabs.on_tab_event(tab, event);
			}
			"clipboard" => self.clipboard.set(Selection::Clipboard, rest),
			"primary" => self.clipboard.set(Selection::Primary, rest),
			other => return Err(ShellError::UnknownDirective(other.to_string())),
		}
		Ok(())
	}

	/// Feeds queued engine events and shutdown confirmations back into the
	/// manager until both are empty, then prints what they produced.
	pub fn pump(&mut self) -> io::Result<()> {
		loop {
			let mut progressed = false;
			while let Ok((tab, event)) = self.engine_events.try_recv() {
				self.tabs.on_tab_event(tab, event);
				progressed = true;
			}
			if self.tabs.process_confirmations() > 0 {
				progressed = true;
			}
			if !progressed {
				break;
			}
		}
		self.print_outputs()
	}

	fn print_outputs(&mut self) -> io::Result<()> {
		let outputs = std::mem::take(&mut *self.outputs.lock());
		for output in &outputs {
			let record = match output {
				Output::Shell(event) => {
					match event {
						ShellEvent::Quit => self.summary.quit = true,
						ShellEvent::ShutdownComplete => self.summary.shutdown_complete = true,
						_ => {}
					}
					Record::Shell { event }
				}
				Output::Current(event) => Record::Current { event },
			};
			self.printer.print(&record)?;
		}
		Ok(())
	}

	async fn finish(mut self) -> anyhow::Result<(Summary, W)> {
		self.pump()?;
		self.tabs.shutdown();

		let waited = tokio::time::timeout(self.shutdown_timeout, self.tabs.wait_for_shutdown()).await;
		let leftover = std::iter::from_fn(|| self.engine_events.try_recv().ok()).count();
		if leftover > 0 {
			debug!(leftover, "discarded engine events after shutdown");
		}
		self.print_outputs()?;
		self.printer.flush()?;

		if waited.is_err() {
			warn!(
				pending = self.tabs.live_tabs(),
				timeout_ms = self.shutdown_timeout.as_millis() as u64,
				"tabs did not confirm shutdown in time"
			);
			anyhow::bail!(
				"{} tab(s) did not confirm shutdown within {}ms",
				self.tabs.live_tabs(),
				self.shutdown_timeout.as_millis()
			);
		}
		Ok((self.summary, self.printer.into_inner()))
	}
}

/// Splits off the first whitespace-delimited word.
fn split_head(line: &str) -> (&str, &str) {
	match line.split_once(char::is_whitespace) {
		Some((head, rest)) => (head, rest.trim()),
		None => (line, ""),
	}
}
