//! Tests for the `syncbook` binary.
#![cfg(feature = "cli")]

use std::fs;
use std::process::Command;

use tempfile::TempDir;

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> String {
    format!("{}/{}", FIXTURES_DIR, name)
}

fn syncbook() -> Command {
    Command::new(env!("CARGO_BIN_EXE_syncbook"))
}

#[test]
fn test_compose_writes_chapter_and_overlay() {
    let dir = TempDir::new().unwrap();
    let status = syncbook()
        .args(["compose", &fixture_path("chapter.html")])
        .args(["--timings", &fixture_path("chapter_labels.txt")])
        .args(["--name", "ch01", "--srt", "-q"])
        .arg("--out-dir")
        .arg(dir.path())
        .status()
        .unwrap();
    assert!(status.success());

    let xhtml = fs::read_to_string(dir.path().join("ch01.xhtml")).unwrap();
    assert!(xhtml.contains(r#"id="f000004""#));

    let smil = fs::read_to_string(dir.path().join("ch01.xhtml.smil")).unwrap();
    assert!(smil.contains(r#"epub:textref="ch01.xhtml""#));
    assert!(smil.contains(r#"src="../Audio/ch01.mp3""#));

    let srt = fs::read_to_string(dir.path().join("ch01.srt")).unwrap();
    assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:02,350\n"));
}

#[test]
fn test_failed_compose_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let labels = dir.path().join("labels.txt");
    fs::write(&labels, "1 2\n2 3\n").unwrap();

    let output = syncbook()
        .args(["compose", &fixture_path("chapter.html"), "--name", "ch01"])
        .arg("--timings")
        .arg(&labels)
        .arg("--out-dir")
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: xhtml output spans count (4) != timing output pars count (3)"));
    assert!(!dir.path().join("ch01.xhtml").exists());
    assert!(!dir.path().join("ch01.xhtml.smil").exists());
}

#[test]
fn test_job_file_supplies_settings() {
    let dir = TempDir::new().unwrap();
    let job = dir.path().join("job.json");
    fs::write(
        &job,
        r#"{"title": "From Job", "hyphenate": false, "clock": "seconds", "text_path": "x.xhtml"}"#,
    )
    .unwrap();

    let status = syncbook()
        .args(["compose", &fixture_path("chapter.html"), "--name", "out", "-q"])
        .args(["--timings", &fixture_path("chapter_labels.txt")])
        .arg("--config")
        .arg(&job)
        .arg("--out-dir")
        .arg(dir.path())
        .status()
        .unwrap();
    assert!(status.success());

    let xhtml = fs::read_to_string(dir.path().join("out.xhtml")).unwrap();
    assert!(xhtml.contains("<title>From Job</title>"));
    assert!(!xhtml.contains('\u{ad}'));
    let smil = fs::read_to_string(dir.path().join("out.xhtml.smil")).unwrap();
    assert!(smil.contains(r#"<text src="x.xhtml#f000001"/>"#));
    assert!(smil.contains(r#"src="../Audio/out.mp3"/>"#));
    assert!(smil.contains(r#"clipEnd="2.350""#));
}

#[test]
fn test_job_file_without_paths_uses_chapter_name() {
    let dir = TempDir::new().unwrap();
    let job = dir.path().join("job.json");
    fs::write(&job, r#"{"hyphenate": false}"#).unwrap();

    let status = syncbook()
        .args(["compose", &fixture_path("chapter.html"), "--name", "out", "-q"])
        .args(["--timings", &fixture_path("chapter_labels.txt")])
        .arg("--config")
        .arg(&job)
        .arg("--out-dir")
        .arg(dir.path())
        .status()
        .unwrap();
    assert!(status.success());

    let smil = fs::read_to_string(dir.path().join("out.xhtml.smil")).unwrap();
    assert!(smil.contains(r#"epub:textref="out.xhtml""#));
    assert!(smil.contains(r#"<text src="out.xhtml#f000001"/>"#));
    assert!(smil.contains(r#"src="../Audio/out.mp3"/>"#));
    assert!(!smil.contains("chapter.xhtml"));
}

#[test]
fn test_srt_subcommand() {
    let output = syncbook()
        .args(["srt", &fixture_path("chapter_labels.txt")])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("4\n00:00:06,000 --> 00:00:07,250\nCaption text 4\n"));
}

#[test]
fn test_renumber_subcommand() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.xhtml");
    fs::write(&input, r#"<p><span id="f000000">a</span><span id="f000000">b</span></p>"#).unwrap();

    let output = syncbook().arg("renumber").arg(&input).output().unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        r#"<p><span id="f000001">a</span><span id="f000002">b</span></p>"#
    );
}
