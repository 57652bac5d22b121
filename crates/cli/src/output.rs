//! Rendering of shell output lines.

use std::io::{self, Write};

use serde::Serialize;
use tabkeeper::{CommandOutcome, EventKind, ShellEvent, TabEvent};

use crate::cli::OutputFormat;

/// One line of shell output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record<'a> {
	/// A command finished.
	Result { command: &'a str, data: &'a serde_json::Value },
	/// A command or directive failed.
	Error { line: usize, input: &'a str, message: String },
	/// Tab strip or application notification.
	Shell { event: &'a ShellEvent },
	/// Event from the current tab.
	Current { event: &'a TabEvent },
}

impl<'a> Record<'a> {
	pub fn result(outcome: &'a CommandOutcome) -> Self {
		Self::Result {
			command: outcome.command,
			data: &outcome.data,
		}
	}
}

/// Writes records in the selected format.
pub struct Printer<W> {
	out: W,
	format: OutputFormat,
}

impl<W: Write> Printer<W> {
	pub fn new(out: W, format: OutputFormat) -> Self {
		Self { out, format }
	}

	pub fn print(&mut self, record: &Record<'_>) -> io::Result<()> {
		match self.format {
			OutputFormat::Json => {
				serde_json::to_writer(&mut self.out, record)?;
				writeln!(self.out)
			}
			OutputFormat::Text => writeln!(self.out, "{}", render_text(record)),
		}
	}

	pub fn flush(&mut self) -> io::Result<()> {
		self.out.flush()
	}

	pub fn into_inner(self) -> W {
		self.out
	}
}

fn render_text(record: &Record<'_>) -> String {
	match record {
		Record::Result { command, data } if data.is_null() => format!("ok {command}"),
		Record::Result { command, data } => format!("ok {command} {data}"),
		Record::Error { line, message, .. } => format!("error line {line}: {message}"),
		Record::Shell { event } => match event {
			ShellEvent::ListChanged { count, active } => match active {
				Some(active) => format!("tabs {count} active {}", active + 1),
				None => format!("tabs {count}"),
			},
			ShellEvent::LabelChanged { index, label } => format!("label {} {label}", index + 1),
			ShellEvent::ShutdownComplete => "shutdown complete".to_string(),
			ShellEvent::Quit => "quit".to_string(),
			ShellEvent::Resized { geometry } => {
				format!("resized {}x{}+{}+{}", geometry.width, geometry.height, geometry.x, geometry.y)
			}
		},
		Record::Current { event } => {
			let kind = event.kind().map_or("event", EventKind::as_str);
			match event {
				TabEvent::Progress { percent } => format!("{kind} {percent}%"),
				TabEvent::LoadFinished { ok } => format!("{kind} {}", if *ok { "ok" } else { "failed" }),
				TabEvent::StatusMessage { text } => format!("{kind} {text}"),
				TabEvent::UrlChanged { url } => format!("{kind} {url}"),
				TabEvent::ScrollPosition { x, y } => format!("{kind} {x}% {y}%"),
				TabEvent::LinkHovered { link, .. } => format!("{kind} {link}"),
				_ => kind.to_string(),
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn printed(format: OutputFormat, record: Record<'_>) -> String {
		let mut printer = Printer::new(Vec::new(), format);
		printer.print(&record).unwrap();
		String::from_utf8(printer.into_inner()).unwrap()
	}

	#[test]
	fn json_lines_are_tagged_by_kind() {
		let event = ShellEvent::ListChanged { count: 2, active: Some(1) };
		let line = printed(OutputFormat::Json, Record::Shell { event: &event });
		let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
		assert_eq!(
			value,
			json!({"kind": "shell", "event": {"type": "list_changed", "count": 2, "active": 1}})
		);
	}

	#[test]
	fn text_lines_use_one_based_indices() {
		let event = ShellEvent::ListChanged { count: 3, active: Some(0) };
		assert_eq!(printed(OutputFormat::Text, Record::Shell { event: &event }), "tabs 3 active 1\n");

		let progress = TabEvent::Progress { percent: 42 };
		assert_eq!(printed(OutputFormat::Text, Record::Current { event: &progress }), "progress 42%\n");
	}

	#[test]
	fn text_errors_name_the_line() {
		let record = Record::Error {
			line: 3,
			input: "tabprev",
			message: "First tab".into(),
		};
		assert_eq!(printed(OutputFormat::Text, record), "error line 3: First tab\n");
	}
}
