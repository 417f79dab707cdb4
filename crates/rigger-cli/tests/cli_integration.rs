//! CLI subprocess integration tests.
//!
//! These tests invoke the `rigger` binary as a subprocess and verify exit
//! codes, stdout content, and JSON output stability.

use std::path::{Path, PathBuf};
use std::process::Command;

fn rigger_bin(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rigger"));
    // Keep the developer's own config file out of the picture.
    cmd.env("HOME", home);
    cmd.env_remove("RIGGER_LOG");
    cmd
}

const MANIFEST: &str = r"
name: cli-test
update:
  update_watch_time: 1000-2000
networks:
- name: default
  type: manual
  gateway: 10.0.0.1
jobs:
- name: web
  instances: 2
  templates:
  - {name: nginx, release: cf}
  networks:
  - name: default
    static_ips: [10.0.0.10, 10.0.0.11]
  properties:
    web: {port: 8443}
properties:
  web: {host: example.com}
";

fn write_manifest(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("deploy.yml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn cli_version_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let output = rigger_bin(dir.path()).arg("--version").output().unwrap();
    assert!(output.status.success(), "rigger --version must exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rigger"), "version output must contain 'rigger': {stdout}");
}

#[test]
fn cli_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    let output = rigger_bin(dir.path()).arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["parse", "render", "completions"] {
        assert!(stdout.contains(command), "help must list '{command}': {stdout}");
    }
}

#[test]
fn cli_parse_prints_summary() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(dir.path(), MANIFEST);
    let output = rigger_bin(dir.path())
        .args(["parse", manifest.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("deployment:     cli-test"), "{stdout}");
    assert!(stdout.contains("watch time:     1000-2000"), "{stdout}");
    assert!(stdout.contains("  web x2 (service) [nginx]"), "{stdout}");
}

#[test]
fn cli_parse_json_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(dir.path(), MANIFEST);
    let output = rigger_bin(dir.path())
        .args(["parse", manifest.to_str().unwrap(), "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["name"], "cli-test");
    assert_eq!(json["update"]["update_watch_time"]["start"], 1000);
    assert_eq!(json["update"]["update_watch_time"]["end"], 2000);
    assert_eq!(json["networks"][0]["type"], "manual");
    assert_eq!(json["jobs"][0]["networks"][0]["static_ips"][1], "10.0.0.11");
    assert_eq!(json["jobs"][0]["properties"]["web"]["port"], 8443);
    assert_eq!(json["properties"]["web"]["host"], "example.com");
}

#[test]
fn cli_parse_yaml_output() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(dir.path(), MANIFEST);
    let output = rigger_bin(dir.path())
        .args(["parse", manifest.to_str().unwrap(), "--format", "yaml"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("name: cli-test\n"), "{stdout}");
}

#[test]
fn cli_parse_bad_manifest_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(
        dir.path(),
        "name: broken\njobs:\n- name: web\n  properties:\n    true: yes\n",
    );
    let output = rigger_bin(dir.path())
        .args(["parse", manifest.to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: parsing deployment manifest"), "{stderr}");
    assert!(stderr.contains("job 'web' (index 0)"), "{stderr}");
    assert!(stderr.contains("unsupported key type 'bool'"), "{stderr}");
}

#[test]
fn cli_parse_missing_file_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let output = rigger_bin(dir.path())
        .args(["parse", dir.path().join("nope.yml").to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn cli_render_unknown_job_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(dir.path(), MANIFEST);
    let output = rigger_bin(dir.path())
        .args(["render", manifest.to_str().unwrap(), "--job", "db", "a.erb", "a.out"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no job named 'db'"), "{stderr}");
}

#[test]
fn cli_render_index_out_of_range_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(dir.path(), MANIFEST);
    let output = rigger_bin(dir.path())
        .args([
            "render",
            manifest.to_str().unwrap(),
            "--job",
            "web",
            "--index",
            "5",
            "a.erb",
            "a.out",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn cli_render_with_missing_interpreter_exits_three() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(dir.path(), MANIFEST);
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "ruby = \"/nonexistent/bin/ruby\"\n").unwrap();
    let src = dir.path().join("web.erb");
    std::fs::write(&src, "<%= p('web.port') %>\n").unwrap();

    let output = rigger_bin(dir.path())
        .args(["--config", config.to_str().unwrap()])
        .args(["render", manifest.to_str().unwrap(), "--job", "web"])
        .arg(&src)
        .arg(dir.path().join("web.out"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: rendering"), "{stderr}");
    assert!(stderr.contains("/nonexistent/bin/ruby"), "{stderr}");
}

#[test]
fn cli_invalid_config_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(dir.path(), MANIFEST);
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "unknown_key = 1\n").unwrap();
    let output = rigger_bin(dir.path())
        .args(["--config", config.to_str().unwrap(), "parse", manifest.to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("config error"));
}

#[test]
fn cli_completions_bash() {
    let dir = tempfile::tempdir().unwrap();
    let output = rigger_bin(dir.path()).args(["completions", "bash"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rigger"), "{stdout}");
}
