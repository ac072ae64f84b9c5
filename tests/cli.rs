use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::io::Write;

#[test]
fn tokens_command_prints_one_token_per_line() {
    let mut cmd = cargo_bin_cmd!("blocks");
    cmd.arg("tokens").arg("display(\"hi\")");

    cmd.assert().success().stdout(
        predicate::str::contains("word(\"display\")")
            .and(predicate::str::contains("lparen(\"(\")"))
            .and(predicate::str::contains("string(\"hi\")")),
    );
}

#[test]
fn parse_command_prints_json_blueprints() {
    let mut cmd = cargo_bin_cmd!("blocks");
    cmd.arg("parse").arg("afficher(\"hi\")");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"type\": \"text_print\""));
}

#[test]
fn parse_command_with_descent_and_yaml() {
    let mut cmd = cargo_bin_cmd!("blocks");
    cmd.args(["parse", "move forward 10", "--strategy", "descent", "--format", "yaml"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("type: turtle_move").and(predicate::str::contains("FORWARD")));
}

#[test]
fn parse_command_tree_format() {
    let mut cmd = cargo_bin_cmd!("blocks");
    cmd.args(["parse", "x = 3", "--format", "tree"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("statement\n  assignment\n"));
}

#[test]
fn parse_command_respects_forest_cap() {
    let mut cmd = cargo_bin_cmd!("blocks");
    cmd.args([
        "parse",
        "display(1 + 2 + 3)",
        "--format",
        "tree",
        "--forest-cap",
        "2",
        "--max-trees",
        "2",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("display_statement").count(2));
}

#[test]
fn no_parse_fails() {
    let mut cmd = cargo_bin_cmd!("blocks");
    cmd.arg("parse").arg("display(");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("No parse"));
}

#[test]
fn unknown_strategy_is_rejected() {
    let mut cmd = cargo_bin_cmd!("blocks");
    cmd.args(["parse", "x = 1", "--strategy", "earley"]);

    cmd.assert().failure();
}

#[test]
fn config_file_selects_locales() {
    let mut file = tempfile_in_target("fr-only.toml");
    writeln!(file.1, "[grammar]\nlocales = [\"fr\"]").unwrap();

    let mut cmd = cargo_bin_cmd!("blocks");
    cmd.args(["rules", "--config"]).arg(&file.0);

    cmd.assert().success().stdout(
        predicate::str::contains("locales: fr")
            .and(predicate::str::contains("\"afficher\""))
            .and(predicate::str::contains("\"print\"").not())
            .and(predicate::str::contains("max unit chain depth:")),
    );
}

/// A writable file under the target directory, unique per test binary run.
fn tempfile_in_target(name: &str) -> (std::path::PathBuf, std::fs::File) {
    let dir = std::path::PathBuf::from(env!("CARGO_TARGET_TMPDIR"));
    let path = dir.join(format!("{}-{}", std::process::id(), name));
    let file = std::fs::File::create(&path).unwrap();
    (path, file)
}
