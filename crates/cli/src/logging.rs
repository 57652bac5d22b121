use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Filter directives for a `-v` count. `RUST_LOG` takes precedence.
///
/// Stdout carries the shell's records, so logging stays on stderr and is
/// quiet by default.
fn default_filter(verbosity: u8) -> &'static str {
	match verbosity {
		0 => "error",
		// -v: lifecycle of tabs and the script, dependencies only on warnings
		1 => "warn,tabkeeper=info,tabkeeper_cli=info",
		// -vv: every tab operation, event routing and shutdown step
		2 => "info,tabkeeper=debug,tabkeeper_cli=debug",
		_ => "trace",
	}
}

pub fn init_logging(verbosity: u8) {
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	let _ = tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_target(verbosity >= 2)
		.compact()
		.try_init();
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn verbosity_raises_crate_levels_first() {
		assert_eq!(default_filter(0), "error");
		assert!(default_filter(1).starts_with("warn,"));
		assert!(default_filter(1).contains("tabkeeper=info"));
		assert!(default_filter(2).contains("tabkeeper=debug"));
		assert_eq!(default_filter(7), "trace");
	}

	#[test]
	fn filters_parse() {
		for verbosity in 0..4 {
			assert!(EnvFilter::try_new(default_filter(verbosity)).is_ok());
		}
	}
}
