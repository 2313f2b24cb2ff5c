#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cli() -> Command {
    Command::cargo_bin("permanence-cli").unwrap()
}

#[test]
fn help_lists_subcommands() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("resolve"));
}

#[test]
fn import_generate_list_check_flow() {
    let dir = tempdir().unwrap();
    let book = dir.path().join("dutybook.json");
    let rules_dir = dir.path().join("rules");
    let csv = dir.path().join("people.csv");
    std::fs::write(
        &csv,
        "handle,display_name,roles\n\
         alice,Alice Martin,leader|duty_officer\n\
         bruno,Bruno Silva,leader|duty_officer\n\
         chloe,Chloé Petit,duty_officer\n",
    )
    .unwrap();

    let base = |cmd: &mut Command| {
        cmd.arg("--book")
            .arg(&book)
            .arg("--rules-dir")
            .arg(&rules_dir);
    };

    let mut import = cli();
    base(&mut import);
    import
        .args(["import-people", "--csv"])
        .arg(&csv)
        .assert()
        .success();

    let mut init = cli();
    base(&mut init);
    init.args(["init-rules", "--id", "standard", "--name", "Semaine standard"])
        .assert()
        .success()
        .stdout(predicate::str::contains("standard.json"));

    let mut generate = cli();
    base(&mut generate);
    generate
        .args([
            "generate",
            "--rules",
            "standard",
            "--from",
            "2024-06-10",
            "--to",
            "2024-06-16",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("assignment(s) created"));

    let mut list = cli();
    base(&mut list);
    list.arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("leader"))
        .stdout(predicate::str::contains("duty_officer"));

    let mut check = cli();
    base(&mut check);
    check
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("no pending conflict"));
}

#[test]
fn overlapping_generation_fails_with_duplicate_error() {
    let dir = tempdir().unwrap();
    let book = dir.path().join("dutybook.json");
    let rules_dir = dir.path().join("rules");
    let csv = dir.path().join("people.csv");
    std::fs::write(
        &csv,
        "handle,display_name,roles\n\
         alice,Alice Martin,leader|duty_officer\n\
         bruno,Bruno Silva,leader|duty_officer\n",
    )
    .unwrap();

    let base = |cmd: &mut Command| {
        cmd.arg("--book")
            .arg(&book)
            .arg("--rules-dir")
            .arg(&rules_dir);
    };

    let mut import = cli();
    base(&mut import);
    import
        .args(["import-people", "--csv"])
        .arg(&csv)
        .assert()
        .success();

    let mut init = cli();
    base(&mut init);
    init.args(["init-rules", "--id", "standard", "--name", "Semaine standard"])
        .assert()
        .success();

    let generate_args = [
        "generate",
        "--rules",
        "standard",
        "--from",
        "2024-06-10",
        "--to",
        "2024-06-11",
    ];
    let mut first = cli();
    base(&mut first);
    first.args(generate_args).assert().success();

    let mut second = cli();
    base(&mut second);
    second
        .args(generate_args)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
