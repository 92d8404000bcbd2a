use std::path::Path;
use std::process::{Command, Output};

fn doclinks_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_doclinks"));
    cmd.current_dir(dir);
    cmd.env_remove("RUST_LOG");
    cmd
}

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

#[test]
fn valid_corpus_passes() {
    let output = doclinks_cmd(&fixture("valid")).output().unwrap();
    assert!(output.status.success(), "check failed: {}", stderr(&output));
    assert!(stderr(&output).is_empty(), "unexpected output: {}", stderr(&output));
}

#[test]
fn broken_corpus_reports_each_problem() {
    let output = doclinks_cmd(&fixture("broken"))
        .args([".", ".", "**/drafts/**"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let err = stderr(&output);
    let lines: Vec<&str> = err.lines().collect();
    assert_eq!(lines.len(), 3, "{err}");
    assert!(lines[0].starts_with("Link is broken: '"), "{err}");
    assert!(lines[0].ends_with("missing.md' in file ./index.md"), "{err}");
    assert_eq!(lines[1], "Anchor of link is broken: './page.md#nope' in file ./index.md");
    assert_eq!(lines[2], "Anchor of link is broken: './page.md#nope' in file ./index.md");
    assert!(!err.contains("drafts"), "{err}");
}

#[test]
fn without_ignore_pattern_the_draft_link_is_reported() {
    let output = doclinks_cmd(&fixture("broken")).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("drafts/wip.md#later' in file ./index.md"));
}

#[test]
fn repeated_runs_are_identical() {
    let first = doclinks_cmd(&fixture("broken")).output().unwrap();
    let second = doclinks_cmd(&fixture("broken")).output().unwrap();
    assert_eq!(first.status.code(), second.status.code());
    assert_eq!(first.stderr, second.stderr);
}

#[test]
fn malformed_document_aborts_the_run() {
    let output = doclinks_cmd(&fixture("malformed")).output().unwrap();
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("Parse Failed"), "{err}");
    assert!(err.contains("bad.mdx"), "{err}");
    assert!(!err.contains("Link is broken"), "{err}");
}

#[test]
fn json_format_lists_findings_on_stdout() {
    let output = doclinks_cmd(&fixture("broken"))
        .args([".", ".", "**/drafts/**", "--format", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let findings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let findings = findings.as_array().unwrap();
    assert_eq!(findings.len(), 3);
    assert_eq!(findings[0]["kind"], "broken_file");
    assert_eq!(findings[1]["kind"], "broken_anchor");
    assert_eq!(findings[1]["link"], "./page.md#nope");
}

#[test]
fn root_relative_links_resolve_against_basepath() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "docs/start.md", "[intro](/guide/intro) [setup](/guide/#setup)\n");
    write(dir.path(), "docs/guide/intro.md", "# Intro\n");
    write(dir.path(), "docs/guide/index.md", "## Setup\n");

    let output = doclinks_cmd(dir.path()).args(["docs", "docs"]).output().unwrap();
    assert!(output.status.success(), "check failed: {}", stderr(&output));

    let output = doclinks_cmd(dir.path()).args(["docs", "."]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("guide/intro.md' in file docs/start.md"), "{}", stderr(&output));
}

#[test]
fn linked_documents_outside_the_directory_are_checked() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "docs/index.md", "[shared](../shared/notes.md)\n");
    write(dir.path(), "shared/notes.md", "# Notes\n\n[broken](#missing)\n");

    let output = doclinks_cmd(dir.path()).arg("docs").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output).contains("Anchor of link is broken: '#missing' in file"),
        "{}",
        stderr(&output)
    );
}

#[test]
fn config_file_sets_extension_and_ignores() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        ".doclinks.toml",
        "extension = \"mdx\"\nignore = [\"/legacy/**\"]\nexclude = [\"vendor/\"]\n",
    );
    write(dir.path(), "index.mdx", "[page](./page) [old](/legacy/gone)\n");
    write(dir.path(), "page.mdx", "# Page\n");
    write(dir.path(), "vendor/readme.md", "[broken](./nowhere.md)\n");

    let output = doclinks_cmd(dir.path()).output().unwrap();
    assert!(output.status.success(), "check failed: {}", stderr(&output));
}

#[test]
fn external_and_scheme_links_are_never_reported() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "index.md",
        "[a](https://example.com/x) [b](http://nowhere.invalid) [c](mailto:a@b.com) <a href=\"javascript:void(0)\">x</a>\n",
    );

    let output = doclinks_cmd(dir.path()).output().unwrap();
    assert!(output.status.success(), "check failed: {}", stderr(&output));
}

#[test]
fn missing_directory_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let output = doclinks_cmd(dir.path()).arg("nope").output().unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Directory Not Found"));
}

#[test]
fn help_lists_usage_and_examples() {
    let output = doclinks_cmd(Path::new(env!("CARGO_MANIFEST_DIR")))
        .arg("--help")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage: doclinks"), "{stdout}");
    assert!(stdout.contains("Examples:"), "{stdout}");
    assert!(stdout.contains("[DIR]"), "{stdout}");
}
