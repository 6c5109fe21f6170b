#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.env_remove("VOCAB_SRS_DATABASE")
        .write_stdin(script.to_string())
        .assert()
}

#[test]
fn cli_requires_a_selected_learner() {
    run_cli("add 사과 quả táo\nquit\n")
        .success()
        .stdout(str_contains("No learner selected."));
}

#[test]
fn cli_review_reports_new_level() {
    run_cli(
        "register hoa@example.com Hoa Tran\nadd 사과 quả táo\nreview 1 correct\nreview 1 correct\nstats\nquit\n",
    )
    .success()
    .stdout(str_contains("Registered learner 1 (hoa@example.com)."))
    .stdout(str_contains("Added word 1 (사과)."))
    .stdout(str_contains("New level: 3."))
    .stdout(str_contains("Total words   : 1"));
}

#[test]
fn cli_rejects_unknown_review_result() {
    run_cli("register hoa@example.com Hoa\nadd 배 quả lê\nreview 1 sortof\nquit\n")
        .success()
        .stdout(str_contains("unknown review result 'sortof'"));
}

#[test]
fn cli_next_shows_due_word() {
    run_cli("register hoa@example.com Hoa\nadd 포도 quả nho\nnext\nquit\n")
        .success()
        .stdout(str_contains("Next word (id 1), 0 more after it:"))
        .stdout(str_contains("Meaning    : quả nho"));
}

#[test]
fn cli_export_and_import_json_deck() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().replace('\\', "\\\\");
    let script = format!(
        "register a@example.com A\nadd 감 quả hồng\nexport json {path}\nregister b@example.com B\nimport json {path}\nlist\nquit\n"
    );
    run_cli(&script)
        .success()
        .stdout(str_contains("Deck exported to"))
        .stdout(str_contains("Imported 1 word(s) from"));
}

#[test]
fn cli_database_persists_between_runs() {
    let db = NamedTempFile::new().expect("create temp db");
    #[allow(deprecated)]
    let mut first = Command::cargo_bin("cli").expect("cli binary");
    first
        .env("VOCAB_SRS_DATABASE", db.path())
        .write_stdin("register keep@example.com Keep\nadd 귤 quả quýt\nquit\n")
        .assert()
        .success();

    #[allow(deprecated)]
    let mut second = Command::cargo_bin("cli").expect("cli binary");
    second
        .env("VOCAB_SRS_DATABASE", db.path())
        .write_stdin("use keep@example.com\nlist\nquit\n")
        .assert()
        .success()
        .stdout(str_contains("Using learner Keep."))
        .stdout(str_contains("귤"));
}
