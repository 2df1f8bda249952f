use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn bin_path() -> PathBuf {
    if let Some(path) = env::var_os("CARGO_BIN_EXE_djotmark-cli") {
        return PathBuf::from(path);
    }
    if let Some(path) = env::var_os("CARGO_BIN_EXE_djotmark_cli") {
        return PathBuf::from(path);
    }
    let exe = env::current_exe().expect("current exe");
    let mut debug_dir = exe.as_path();
    while let Some(parent) = debug_dir.parent() {
        if parent.file_name().and_then(|name| name.to_str()) == Some("debug") {
            let candidate = parent.join("djotmark-cli");
            if candidate.exists() {
                return candidate;
            }
        }
        debug_dir = parent;
    }
    panic!("binary path missing");
}

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let mut path = env::temp_dir();
    let now = SystemTime::now().duration_since(UNIX_EPOCH).expect("time");
    let file_name = format!(
        "djotmark_cli_{}_{}_{}.dj",
        name,
        now.as_secs(),
        now.subsec_nanos()
    );
    path.push(file_name);
    fs::write(&path, contents).expect("write temp file");
    path
}

#[test]
fn converts_file_to_html() {
    let input = temp_file("basic", "Hello *world*.\n");
    let output = Command::new(bin_path())
        .args([input.to_str().expect("path")])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<p>Hello <strong>world</strong>.</p>"));
}

#[test]
fn comment_profile_flattens_headings() {
    let input = temp_file("profile", "# Heading\n");
    let output = Command::new(bin_path())
        .args(["--profile", "comment", input.to_str().expect("path")])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("<h1"), "expected no heading tag");
    assert!(stdout.contains("Heading"), "expected heading text to survive");
}

#[test]
fn unknown_profile_is_a_usage_error() {
    let input = temp_file("bad_profile", "text\n");
    let output = Command::new(bin_path())
        .args(["--profile", "blog", input.to_str().expect("path")])
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown profile"));
}

#[test]
fn safe_mode_strips_dangerous_urls() {
    let input = temp_file("safe", "[click](javascript:alert\\(1\\))\n");
    let output = Command::new(bin_path())
        .args(["--safe", input.to_str().expect("path")])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("javascript:"), "expected scheme stripped");
    assert!(stdout.contains("click"), "expected link text to survive");
}

#[test]
fn toc_flag_inserts_nav() {
    let input = temp_file("toc", "# One\n\n## Two\n");
    let output = Command::new(bin_path())
        .args(["--toc", "1:3", input.to_str().expect("path")])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<nav class=\"toc\">"));
    assert!(stdout.contains("<a href=\"#one\">One</a>"));
}

#[test]
fn reads_from_stdin_when_no_file() {
    use std::io::Write;
    use std::process::Stdio;

    let mut child = Command::new(bin_path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .as_mut()
        .expect("stdin")
        .write_all(b"plain text\n")
        .expect("write");
    let output = child.wait_with_output().expect("wait");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<p>plain text</p>"));
}
