//! Integration tests for CLI commands.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

const SAMPLE: &str = include_str!("../../nbtrust-core/tests/fixtures/sample.ipynb");
const SAMPLE_DIGEST: &str = "d6455f3fd05a6e1c02694a78c344233fbca8379edc57056a645965a22a77545d";

struct Env {
    dir: TempDir,
}

impl Env {
    /// Data directory holding the fixed secret `s3cr3t`.
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notebook_secret"), "s3cr3t").unwrap();
        Self { dir }
    }

    fn notebook(&self, name: &str, text: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_nbtrust"));
        cmd.arg("--data-dir")
            .arg(self.dir.path())
            .args(args)
            .env_remove("JUPYTER_DATA_DIR")
            .env_remove("RUST_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> (bool, String, String) {
        let output = self.command(args).output().expect("Failed to execute CLI");
        let stdout = String::from_utf8(output.stdout).unwrap();
        let stderr = String::from_utf8(output.stderr).unwrap();
        (output.status.success(), stdout, stderr)
    }
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn sign_check_unsign() {
    let env = Env::new();
    let nb = env.notebook("sample.ipynb", SAMPLE);

    let (ok, _, stderr) = env.run(&["check", arg(&nb)]);
    assert!(!ok, "check should fail before the database exists");
    assert!(stderr.contains("not found"), "stderr: {stderr}");

    let (ok, stdout, _) = env.run(&["--create", "sign", arg(&nb)]);
    assert!(ok);
    assert!(stdout.starts_with("signed"), "stdout: {stdout}");

    let (ok, stdout, _) = env.run(&["check", arg(&nb)]);
    assert!(ok);
    assert!(stdout.starts_with("trusted"), "stdout: {stdout}");

    let (ok, stdout, _) = env.run(&["unsign", arg(&nb)]);
    assert!(ok);
    assert!(stdout.starts_with("unsigned"), "stdout: {stdout}");

    let (ok, stdout, _) = env.run(&["check", arg(&nb)]);
    assert!(!ok);
    assert!(stdout.starts_with("untrusted"), "stdout: {stdout}");
}

#[test]
fn filter_prints_trusted_paths_in_order() {
    let env = Env::new();
    let a = env.notebook("a.ipynb", &SAMPLE.replace("0.1 + 0.2", "1 + 1"));
    let b = env.notebook("b.ipynb", &SAMPLE.replace("0.1 + 0.2", "2 + 2"));
    let c = env.notebook("c.ipynb", &SAMPLE.replace("0.1 + 0.2", "3 + 3"));

    let (ok, _, _) = env.run(&["--create", "sign", arg(&c), arg(&a)]);
    assert!(ok);

    let (ok, stdout, _) = env.run(&["filter", arg(&a), arg(&b), arg(&c)]);
    assert!(ok);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec![arg(&a), arg(&c)]);
}

#[test]
fn old_format_is_reported_unchanged() {
    let env = Env::new();
    let old = env.notebook("old.ipynb", &SAMPLE.replace("\"nbformat\": 4", "\"nbformat\": 2"));

    let (ok, stdout, _) = env.run(&["--create", "--json", "sign", arg(&old)]);
    assert!(ok);
    let line: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(line["verdict"], "unchanged");

    let (ok, stdout, _) = env.run(&["count"]);
    assert!(ok);
    assert_eq!(stdout.trim(), "0");
}

#[test]
fn digest_from_file_and_stdin() {
    let env = Env::new();
    let nb = env.notebook("sample.ipynb", SAMPLE);

    let (ok, stdout, _) = env.run(&["digest", arg(&nb)]);
    assert!(ok);
    assert_eq!(stdout.trim(), SAMPLE_DIGEST);

    let mut child = env
        .command(&["digest"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(SAMPLE.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap().trim(), SAMPLE_DIGEST);
}

#[test]
fn canonicalize_tokens() {
    let env = Env::new();
    let doc = env.notebook("doc.json", r#"{"b": [true, null], "a": 1.5e-7}"#);

    let (ok, stdout, _) = env.run(&["canonicalize", arg(&doc)]);
    assert!(ok);
    assert_eq!(stdout, "a1.5e-07bTrueNone\n");

    let (ok, stdout, _) = env.run(&["canonicalize", "--tokens", arg(&doc)]);
    assert!(ok);
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec!["\"a\"", "\"1.5e-07\"", "\"b\"", "\"True\"", "\"None\""]
    );
}

#[test]
fn count_and_cull() {
    let env = Env::new();
    let paths: Vec<PathBuf> = (0..8)
        .map(|n| env.notebook(&format!("nb-{n}.ipynb"), &SAMPLE.replace("0.1 + 0.2", &n.to_string())))
        .collect();
    let mut args = vec!["--create", "--no-cull", "sign"];
    args.extend(paths.iter().map(|p| arg(p)));
    let (ok, _, _) = env.run(&args);
    assert!(ok);

    let (_, stdout, _) = env.run(&["count"]);
    assert_eq!(stdout.trim(), "8");

    let (ok, stdout, _) = env.run(&["--cache-size", "4", "cull"]);
    assert!(ok);
    assert_eq!(stdout.trim(), "removed 5 signatures, 3 remain");

    let (_, stdout, _) = env.run(&["count"]);
    assert_eq!(stdout.trim(), "3");
}

#[test]
fn readonly_rejects_sign() {
    let env = Env::new();
    let nb = env.notebook("sample.ipynb", SAMPLE);
    assert!(env.run(&["--create", "count"]).0);

    let (ok, _, stderr) = env.run(&["--readonly", "sign", arg(&nb)]);
    assert!(!ok);
    assert!(stderr.contains("readonly"), "stderr: {stderr}");
}

#[test]
fn secret_command_creates_secret_without_printing_it() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("jupyter");
    let output = Command::new(env!("CARGO_BIN_EXE_nbtrust"))
        .arg("--data-dir")
        .arg(&data)
        .arg("secret")
        .output()
        .unwrap();
    assert!(output.status.success());

    let secret_path = data.join("notebook_secret");
    let secret = std::fs::read_to_string(&secret_path).unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.trim(), secret_path.display().to_string());
    assert!(!stdout.contains(&secret));
}

#[test]
fn unknown_algorithm_is_rejected() {
    let env = Env::new();
    let (ok, _, stderr) = env.run(&["--algorithm", "md5", "count"]);
    assert!(!ok);
    assert!(stderr.contains("md5"), "stderr: {stderr}");
}
