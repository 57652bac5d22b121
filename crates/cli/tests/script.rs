//! End-to-end runs of the `tabkeeper` binary.

use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

fn run_script(dir: &Path, script: &str, extra: &[&str]) -> Output {
	let path = dir.join("script.tk");
	std::fs::write(&path, script).unwrap();
	Command::new(env!("CARGO_BIN_EXE_tabkeeper"))
		.env("XDG_CONFIG_HOME", dir)
		.env_remove("RUST_LOG")
		.args(extra)
		.arg(&path)
		.output()
		.expect("failed to execute tabkeeper")
}

fn records(output: &Output) -> Vec<Value> {
	String::from_utf8_lossy(&output.stdout)
		.lines()
		.map(|line| serde_json::from_str(line).unwrap_or_else(|e| panic!("bad line {line:?}: {e}")))
		.collect()
}

#[test]
fn script_runs_and_shuts_down() {
	let dir = tempfile::tempdir().unwrap();
	let output = run_script(
		dir.path(),
		"open {\"url\": \"https://a.example\"}\nopen {\"url\": \"https://b.example\"}\nclose {\"count\": 1}\nundo\n",
		&[],
	);

	assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
	let records = records(&output);
	let commands: Vec<_> = records
		.iter()
		.filter(|r| r["kind"] == "result")
		.map(|r| r["command"].as_str().unwrap())
		.collect();
	assert_eq!(commands, ["open", "open", "close", "undo-close"]);
	assert_eq!(records.last().unwrap()["event"]["type"], "shutdown_complete");
}

#[test]
fn user_errors_set_exit_status() {
	let dir = tempfile::tempdir().unwrap();
	let output = run_script(dir.path(), "open {\"url\": \"a\"}\nundo\n", &[]);

	assert_eq!(output.status.code(), Some(1));
	assert!(String::from_utf8_lossy(&output.stderr).contains("Nothing to undo!"));
}

#[test]
fn config_file_selects_quit_policy() {
	let dir = tempfile::tempdir().unwrap();
	let config_dir = dir.path().join("tabkeeper");
	std::fs::create_dir_all(&config_dir).unwrap();
	std::fs::write(config_dir.join("config.toml"), "last_close = \"quit\"\n").unwrap();

	let output = run_script(dir.path(), "open {\"url\": \"a\"}\nclose\n", &[]);
	assert!(output.status.success());
	assert!(records(&output).iter().any(|r| r["event"]["type"] == "quit"));
}

#[test]
fn command_line_overrides_config() {
	let dir = tempfile::tempdir().unwrap();
	let output = run_script(dir.path(), "open {\"url\": \"a\"}\nclose\n", &["--last-close", "blank"]);

	let records = records(&output);
	assert!(!records.iter().any(|r| r["event"]["type"] == "quit"));
	let close = records.iter().find(|r| r["command"] == "close").unwrap();
	assert_eq!(close["data"]["outcome"], "blanked");
}

#[test]
fn text_format_is_line_oriented() {
	let dir = tempfile::tempdir().unwrap();
	let output = run_script(dir.path(), "open {\"url\": \"https://a.example\"}\n", &["--format", "text"]);

	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.lines().any(|l| l == "tabs 1 active 1"));
	assert!(stdout.lines().any(|l| l == "label 1 a.example"));
	assert_eq!(stdout.lines().last(), Some("shutdown complete"));
}

#[test]
fn lists_commands() {
	let output = Command::new(env!("CARGO_BIN_EXE_tabkeeper"))
		.arg("--list-commands")
		.output()
		.unwrap();
	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.lines().any(|l| l.starts_with("paste-open-in-tab") && l.contains("tabpaste")));
	assert_eq!(stdout.lines().count(), 10);
}
