use assert_cmd::prelude::*;
use predicates::str::contains;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const CHARACTER_SCHEMA: &str = r#"{
    "type": "object",
    "required": ["name", "role", "parts", "welds"],
    "properties": {
        "name": {"type": "string"},
        "role": {"enum": ["ally", "enemy", "mini-boss", "boss"]},
        "parts": {"type": "array"},
        "welds": {"type": "array"}
    }
}"#;

const DIMENSION_SCHEMA: &str = r#"{
    "type": "object",
    "required": ["name", "difficulty_level"],
    "properties": {
        "name": {"type": "string"},
        "difficulty_level": {"type": "integer", "minimum": 0}
    }
}"#;

const BOK: &str = r##"{
    "name": "Bok",
    "role": "ally",
    "parts": [{"name": "body", "shape": "sphere", "size": [0.5, 0, 0], "color": "#00ff00", "position": [0, 0, 0]}],
    "welds": []
}"##;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("parent dir")).expect("create dir");
    fs::write(path, contents).expect("write file");
}

fn data_dir(extra: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "schemas/character_schema.json", CHARACTER_SCHEMA);
    write(dir.path(), "schemas/dimension_schema.json", DIMENSION_SCHEMA);
    write(dir.path(), "characters/bok.json", BOK);
    write(
        dir.path(),
        "dimensions/ember.json",
        r#"{"name": "Ember Wastes", "difficulty_level": 3}"#,
    );
    for (path, contents) in extra {
        write(dir.path(), path, contents);
    }
    dir
}

fn runtime() -> Command {
    Command::cargo_bin("arena-runtime").expect("binary exists")
}

#[test]
fn validate_accepts_consistent_data() {
    let data = data_dir(&[]);
    runtime()
        .arg("--validate")
        .arg("--data-dir")
        .arg(data.path())
        .assert()
        .success()
        .stdout(contains("All 2 document(s) are valid"));
}

#[test]
fn validate_rejects_unknown_role_and_names_the_file() {
    let data = data_dir(&[(
        "characters/rogue.json",
        r#"{"name": "Rogue", "role": "villain", "parts": [], "welds": []}"#,
    )]);
    runtime()
        .arg("--validate")
        .arg("--data-dir")
        .arg(data.path())
        .assert()
        .failure()
        .stdout(contains("rogue.json"))
        .stdout(contains("/role"));
}

#[test]
fn validate_lists_malformed_json_next_to_schema_violations() {
    let data = data_dir(&[
        ("characters/garbled.json", "{ not json"),
        (
            "characters/rogue.json",
            r#"{"name": "Rogue", "role": "villain", "parts": [], "welds": []}"#,
        ),
    ]);
    runtime()
        .arg("--validate")
        .arg("--data-dir")
        .arg(data.path())
        .assert()
        .failure()
        .stdout(contains("2 file(s) failed validation"))
        .stdout(contains("garbled.json"))
        .stdout(contains("invalid JSON"))
        .stdout(contains("rogue.json"));
}

#[test]
fn simulate_walks_the_player_and_prints_final_state() {
    let data = data_dir(&[]);
    runtime()
        .arg("--data-dir")
        .arg(data.path())
        .arg("--simulate")
        .arg("1")
        .arg("--keys")
        .arg("wa")
        .assert()
        .success()
        .stdout(contains("Loaded scene with 7 objects"))
        .stdout(contains(" - Bok (ally)"))
        .stdout(contains("Dimension Ember Wastes (difficulty 3)"))
        .stdout(contains("Final player state after 1 frame(s):"))
        .stdout(contains("pos=(-0.10, 0.95, -0.10)"))
        .stdout(contains("moving=true"));
}

#[test]
fn simulate_refuses_invalid_data() {
    let data = data_dir(&[(
        "characters/broken.json",
        r#"{"name": "Broken", "role": "ally", "parts": [{"name": "body"}], "welds": [{"part0": "body", "part1": "tail"}]}"#,
    )]);
    runtime()
        .arg("--data-dir")
        .arg(data.path())
        .arg("--simulate")
        .arg("1")
        .assert()
        .failure()
        .stderr(contains("broken.json"))
        .stderr(contains("tail"));
}

#[test]
fn missing_data_dir_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    runtime()
        .arg("--validate")
        .arg("--data-dir")
        .arg(dir.path().join("nope"))
        .assert()
        .failure()
        .stderr(contains("Error:"));
}

#[test]
fn unknown_flag_is_rejected() {
    runtime()
        .arg("--fly")
        .assert()
        .failure()
        .stderr(contains("Unknown argument: --fly"));
}
