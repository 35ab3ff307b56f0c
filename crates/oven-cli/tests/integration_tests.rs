//! End-to-end tests for the `oven` binary.

use std::{
    fs,
    path::{Path, PathBuf},
};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn template_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../templates/python-service")
}

/// Isolated workspace: an empty config file whose replay directory lives in
/// the same temp dir.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let replay = dir.path().join("replay");
        fs::write(
            dir.path().join("config.toml"),
            format!("[paths]\nreplay_dir = {:?}\n", replay.display().to_string()),
        )
        .unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("oven").unwrap();
        cmd.current_dir(self.path())
            .env_remove("RUST_LOG")
            .env_remove("OVEN_TEMPLATES_DIR")
            .env("NO_COLOR", "true")
            .arg("--config")
            .arg(self.path().join("config.toml"));
        cmd
    }

    fn bake(&self, extra: &[&str]) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("bake")
            .arg(template_dir())
            .args(extra)
            .arg("--no-input")
            .arg("-o")
            .arg(self.path().join("out"));
        cmd
    }
}

#[test]
fn test_help_flag() {
    Command::cargo_bin("oven")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("bake"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("oven")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_bake_prints_project_dir() {
    let sandbox = Sandbox::new();
    sandbox
        .bake(&["project_name=Funky Grogu"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with("funky-grogu\n"));

    let project = sandbox.path().join("out/funky-grogu");
    assert!(project.join("src/funky_grogu/__init__.py").is_file());
    assert_eq!(fs::read_to_string(project.join(".python-version")).unwrap(), "3.11\n");
}

#[test]
fn test_bake_records_replay() {
    let sandbox = Sandbox::new();
    sandbox.bake(&["python_version=3.9"]).assert().success();
    let replay = sandbox.path().join("replay/python-service.json");
    let record: serde_json::Value = serde_json::from_str(&fs::read_to_string(&replay).unwrap()).unwrap();
    assert_eq!(record["context"]["python_version"], "3.9");

    // Replay into a fresh directory reproduces the choice.
    sandbox
        .cmd()
        .arg("bake")
        .arg(template_dir())
        .arg("--replay")
        .arg("-o")
        .arg(sandbox.path().join("again"))
        .assert()
        .success();
    let version = fs::read_to_string(sandbox.path().join("again/esta-python/.python-version")).unwrap();
    assert_eq!(version, "3.9\n");
}

#[test]
fn test_bake_uses_config_defaults() {
    let sandbox = Sandbox::new();
    let config = sandbox.path().join("config.toml");
    let mut contents = fs::read_to_string(&config).unwrap();
    contents.push_str("\n[default_context]\nauthor_email = \"jane@example.com\"\nnot_declared = \"ignored\"\n");
    fs::write(&config, contents).unwrap();

    sandbox.bake(&[]).assert().success();
    let pyproject = fs::read_to_string(sandbox.path().join("out/esta-python/pyproject.toml")).unwrap();
    assert!(pyproject.contains("<jane@example.com>"));
}

#[test]
fn test_bake_json_output() {
    let sandbox = Sandbox::new();
    let assert = sandbox
        .bake(&["--output-format", "json", "docker_repository=esta.docker"])
        .assert()
        .success();
    let report: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(report["context"]["docker_repository"], "esta.docker");
    assert_eq!(report["dry_run"], false);
    assert!(
        report["written"]
            .as_array()
            .unwrap()
            .iter()
            .any(|p| p == "Dockerfile")
    );
}

#[test]
fn test_dry_run_lists_files_only() {
    let sandbox = Sandbox::new();
    sandbox
        .bake(&["--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pyproject.toml"));
    assert!(!sandbox.path().join("out").join("esta-python").exists());
}

#[test]
fn test_existing_project_needs_a_flag() {
    let sandbox = Sandbox::new();
    sandbox.bake(&[]).assert().success();
    sandbox
        .bake(&[])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
    sandbox
        .bake(&["--dry-run"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
    sandbox
        .bake(&["--dry-run", "--overwrite-if-exists"])
        .assert()
        .success();
    sandbox.bake(&["--skip-if-file-exists"]).assert().success();
    sandbox.bake(&["--overwrite-if-exists"]).assert().success();
}

#[test]
fn test_bake_by_name_from_templates_dir() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .env("OVEN_TEMPLATES_DIR", template_dir().parent().unwrap())
        .args(["bake", "python-service", "--no-input", "-o", "out"])
        .assert()
        .success();
    assert!(sandbox.path().join("out/esta-python/README.md").is_file());
}

#[test]
fn test_inspect_json() {
    let sandbox = Sandbox::new();
    let assert = sandbox
        .cmd()
        .arg("inspect")
        .arg(template_dir())
        .args(["--format", "json"])
        .assert()
        .success();
    let info: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(info["name"], "python-service");
    let names: Vec<_> = info["variables"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(names.first().map(String::as_str), Some("project_name"));
    assert!(names.iter().any(|n| n == "python_version"));
}

#[test]
fn test_inspect_list() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .arg("inspect")
        .arg(template_dir())
        .args(["--format", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("project_name=ESTA Python"));
}

#[test]
fn test_config_set_then_get() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["config", "set", "default_context.author_name", "Doe Jane"])
        .assert()
        .success();
    sandbox
        .cmd()
        .args(["config", "get", "default_context.author_name"])
        .assert()
        .success()
        .stdout("Doe Jane\n");
}

#[test]
fn test_init_writes_config() {
    let sandbox = Sandbox::new();
    let target = sandbox.path().join("fresh/config.toml");
    Command::cargo_bin("oven")
        .unwrap()
        .env("NO_COLOR", "true")
        .arg("--config")
        .arg(&target)
        .arg("init")
        .assert()
        .success();
    assert!(target.is_file());

    sandbox
        .cmd()
        .args(["init", "--force"])
        .assert()
        .success();
    let written = fs::read_to_string(sandbox.path().join("config.toml")).unwrap();
    assert!(written.contains("[default_context]"));
}

#[test]
fn test_completions_bash() {
    Command::cargo_bin("oven")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("oven"));
}
