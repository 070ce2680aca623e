use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn imgharvest() -> Command {
    let mut cmd = Command::cargo_bin("imgharvest").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn missing_directory_fails_with_status_1() {
    let dir = TempDir::new().unwrap();

    imgharvest()
        .arg(dir.path().join("does-not-exist"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid directory"));
}

#[test]
fn json_errors_go_to_stderr() {
    let dir = TempDir::new().unwrap();

    imgharvest()
        .arg(dir.path().join("does-not-exist"))
        .args(["--output-format", "json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("\"level\":\"error\""))
        .stderr(predicate::str::contains("Invalid directory"))
        .stdout(predicate::str::contains("Invalid directory").not());
}

#[test]
fn directory_without_source_files_is_a_soft_exit() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("picture.png"), b"png").unwrap();

    imgharvest()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No eligible files found"));
}

#[test]
fn defaults_to_current_directory_and_prints_summary() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("notes.txt"), "no links in here\n").unwrap();

    imgharvest()
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Processed 1 files, downloaded 0 images",
        ));

    assert!(!dir.path().join("notes").exists());
}

#[test]
fn rejected_links_are_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("bad.txt"),
        "http://example.com:99999/broken.jpg\n",
    )
    .unwrap();

    imgharvest()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Invalid URL skipped"));

    assert!(!dir.path().join("bad").exists());
}

#[test]
fn json_output_carries_the_report() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("data.csv"), "a,b\n").unwrap();

    imgharvest()
        .arg(dir.path())
        .args(["--output-format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"images_downloaded\": 0"))
        .stdout(predicate::str::contains("\"policy\": \"skip-existing\""));
}

#[test]
fn dry_run_lists_links_without_creating_folders() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("links.txt"),
        "https://img.example/cat.jpg\n",
    )
    .unwrap();

    imgharvest()
        .arg(dir.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://img.example/cat.jpg"));

    assert!(!dir.path().join("links").exists());
}

#[test]
fn invalid_configuration_exits_with_status_2() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[scan]\nsource_extensions = []\n").unwrap();

    imgharvest()
        .arg(dir.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn generate_config_writes_sample() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("imgharvest.toml");

    imgharvest()
        .arg("--generate-config")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    let content = fs::read_to_string(&config).unwrap();
    assert!(content.contains("[download]"));
    assert!(content.contains("skip-existing"));
}
