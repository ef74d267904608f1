//! Integration tests for the `ytb` binary.

use std::io::Write;
use std::process::{Command, Stdio};

use serde_json::{Value, json};
use tempfile::NamedTempFile;

const METHODS: &[&str] = &["playVideo", "pauseVideo", "mute", "unMute", "setVolume", "setPlaybackRate"];

fn ready_line() -> String {
	json!({"kind": "ready", "data": {"supportedApiMethods": METHODS}}).to_string()
}

fn input_file(lines: &[String]) -> NamedTempFile {
	let mut file = NamedTempFile::new().unwrap();
	for line in lines {
		writeln!(file, "{line}").unwrap();
	}
	file
}

fn run(args: &[&str]) -> (bool, Vec<Value>, String) {
	let output = Command::new(env!("CARGO_BIN_EXE_ytb"))
		.args(args)
		.output()
		.expect("failed to execute ytb");

	let stdout = String::from_utf8_lossy(&output.stdout).to_string();
	let stderr = String::from_utf8_lossy(&output.stderr).to_string();
	let records = stdout
		.lines()
		.filter_map(|line| serde_json::from_str(line).ok())
		.collect();
	(output.status.success(), records, stderr)
}

fn of_type<'a>(records: &'a [Value], kind: &str) -> Vec<&'a Value> {
	records.iter().filter(|r| r["type"] == kind).collect()
}

fn outbound_methods(records: &[Value]) -> Vec<String> {
	of_type(records, "outbound")
		.iter()
		.map(|r| r["envelope"]["method"].as_str().unwrap().to_string())
		.collect()
}

#[test]
fn replay_routes_every_kind() {
	let file = input_file(&[
		ready_line(),
		r#"{"kind": "state-change", "data": 1}"#.to_string(),
		r#"{"kind": "ad-start", "data": {"slot": 2}}"#.to_string(),
		"# comments and blank lines are skipped".to_string(),
		String::new(),
		"garbage".to_string(),
	]);
	let path = file.path().to_str().unwrap();

	let (success, records, stderr) = run(&["replay", path, "--play", "--auto-ack"]);
	assert!(success, "replay failed: {stderr}");

	assert_eq!(records[0], json!({"type": "callback", "name": "onReady", "value": null}));
	assert_eq!(
		outbound_methods(&records),
		vec!["playVideo", "unMute", "setVolume", "setPlaybackRate"]
	);
	assert_eq!(
		of_type(&records, "outbound")[0]["envelope"],
		json!({"kind": "call", "id": 0, "method": "playVideo", "args": []})
	);
	assert!(records.contains(&json!({"type": "callback", "name": "onChangeState", "value": "playing"})));
	assert!(records.contains(&json!({"type": "event", "kind": "ad-start", "data": {"slot": 2}})));

	let rejected = of_type(&records, "rejected");
	assert_eq!(rejected.len(), 1);
	assert_eq!(rejected[0]["line"], 6);

	let summary = records.last().unwrap();
	assert_eq!(summary["type"], "summary");
	assert_eq!(summary["ready"], true);
	assert_eq!(summary["pendingCalls"], 0);
}

#[test]
fn unanswered_calls_stay_pending() {
	let file = input_file(&[ready_line()]);
	let path = file.path().to_str().unwrap();

	let (success, records, stderr) = run(&["replay", path, "--mute", "--volume", "25"]);
	assert!(success, "replay failed: {stderr}");

	assert_eq!(
		outbound_methods(&records),
		vec!["pauseVideo", "mute", "setVolume", "setPlaybackRate"]
	);
	assert_eq!(of_type(&records, "outbound")[2]["envelope"]["args"], json!([25]));
	assert_eq!(records.last().unwrap()["pendingCalls"], 4);
}

#[test]
fn then_targets_are_applied_after_input() {
	let file = input_file(&[ready_line()]);
	let path = file.path().to_str().unwrap();

	let (success, records, stderr) = run(&[
		"replay",
		path,
		"--auto-ack",
		"--then",
		r#"{"volume": 10}"#,
		"--then",
		r#"{"volume": 10}"#,
	]);
	assert!(success, "replay failed: {stderr}");

	assert_eq!(
		outbound_methods(&records),
		vec![
			"pauseVideo",
			"unMute",
			"setVolume",
			"setPlaybackRate",
			"setVolume",
			"setPlaybackRate",
		]
	);
}

#[test]
fn invalid_ready_payload_leaves_bridge_not_ready() {
	let file = input_file(&[r#"{"kind": "ready", "data": {"supportedApiMethods": "playVideo"}}"#.to_string()]);
	let path = file.path().to_str().unwrap();

	let (success, records, stderr) = run(&["replay", path]);
	assert!(success, "replay failed: {stderr}");

	assert_eq!(of_type(&records, "rejected").len(), 1);
	assert!(outbound_methods(&records).is_empty());
	assert_eq!(records.last().unwrap()["ready"], false);
}

#[test]
fn replay_reads_stdin() {
	let mut child = Command::new(env!("CARGO_BIN_EXE_ytb"))
		.args(["replay", "-"])
		.stdin(Stdio::piped())
		.stdout(Stdio::piped())
		.spawn()
		.expect("failed to execute ytb");

	child
		.stdin
		.take()
		.unwrap()
		.write_all(format!("{}\n{}\n", ready_line(), r#"{"kind": "rate-change", "data": 2}"#).as_bytes())
		.unwrap();
	let output = child.wait_with_output().unwrap();
	assert!(output.status.success());

	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.contains(r#""name":"onPlaybackRateChange","value":2.0"#), "{stdout}");
}

#[test]
fn should_load_hands_youtube_links_out_on_ios() {
	let (success, records, stderr) = run(&[
		"should-load",
		"https://www.youtube.com/watch?v=abc",
		"--platform",
		"ios",
	]);
	assert!(success, "should-load failed: {stderr}");

	assert_eq!(
		records[0],
		json!({
			"url": "https://www.youtube.com/watch?v=abc",
			"allow": false,
			"openedExternally": ["https://www.youtube.com/watch?v=abc"]
		})
	);
}

#[test]
fn config_file_overrides_defaults() {
	let mut file = NamedTempFile::new().unwrap();
	write!(file, r#"{{"callTimeoutMs": null, "baseUrl": "https://player.test/"}}"#).unwrap();
	let path = file.path().to_str().unwrap();

	let output = Command::new(env!("CARGO_BIN_EXE_ytb"))
		.args(["--config", path, "config"])
		.output()
		.unwrap();
	assert!(output.status.success());

	let config: Value = serde_json::from_slice(&output.stdout).unwrap();
	assert_eq!(config["callTimeoutMs"], Value::Null);
	assert_eq!(config["baseUrl"], "https://player.test/");
	assert_eq!(config["loadOnVideoChange"], false);

	let (success, records, _) = run(&["--config", path, "should-load", "https://player.test/index.html"]);
	assert!(success);
	assert_eq!(records[0]["allow"], true);
}

#[test]
fn invalid_config_fails() {
	let mut file = NamedTempFile::new().unwrap();
	write!(file, "{{not json").unwrap();
	let path = file.path().to_str().unwrap();

	let (success, _, stderr) = run(&["--config", path, "config"]);
	assert!(!success);
	assert!(stderr.contains("invalid configuration"), "{stderr}");
}
