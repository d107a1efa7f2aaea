//! End-to-end tests that exercise the `fruutil` binary itself.

use std::io::Write;
use std::process::Command;

fn fruutil() -> Command {
    Command::new(env!("CARGO_BIN_EXE_fruutil"))
}

#[test]
fn new_then_validate_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.fru");

    let status = fruutil().args(["new", path.to_str().unwrap()]).status().unwrap();
    assert!(status.success());

    let output = fruutil()
        .args(["validate", path.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("ok"));
}

#[test]
fn set_mandatory_field_then_dump_json_reflects_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("product.fru");
    assert!(fruutil().args(["new", path.to_str().unwrap()]).status().unwrap().success());

    let status = fruutil()
        .args([
            "set",
            path.to_str().unwrap(),
            "product",
            "manufacturer",
            "Acme Corp",
        ])
        .status()
        .unwrap();
    assert!(status.success());

    let output = fruutil()
        .args(["dump", path.to_str().unwrap(), "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["product"]["manufacturer"], "Acme Corp");
}

#[test]
fn set_custom_field_appends_at_given_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chassis.fru");
    assert!(fruutil().args(["new", path.to_str().unwrap()]).status().unwrap().success());

    assert!(fruutil()
        .args(["set", path.to_str().unwrap(), "chassis", "custom:0", "first-note"])
        .status()
        .unwrap()
        .success());
    assert!(fruutil()
        .args(["set", path.to_str().unwrap(), "chassis", "custom:1", "second-note"])
        .status()
        .unwrap()
        .success());

    let output = fruutil().args(["dump", path.to_str().unwrap(), "--json"]).output().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let custom = json["chassis"]["custom"].as_array().unwrap();
    assert_eq!(custom.len(), 2);
    assert_eq!(custom[0], "first-note");
    assert_eq!(custom[1], "second-note");
}

#[test]
fn validate_reports_error_on_truncated_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.fru");
    {
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(&[0, 0, 0]).unwrap();
    }

    let output = fruutil().args(["validate", path.to_str().unwrap()]).output().unwrap();
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("buffer too small"), "got: {stdout}");
}

#[test]
fn template_applies_json_document_in_one_shot() {
    let dir = tempfile::tempdir().unwrap();
    let fru_path = dir.path().join("templated.fru");
    assert!(fruutil().args(["new", fru_path.to_str().unwrap()]).status().unwrap().success());

    let template_path = dir.path().join("template.json");
    std::fs::write(
        &template_path,
        r#"{
            "chassis": { "chassis_type": 23, "part_number": "ABC-001" },
            "board": { "manufacturer": "Acme Corp", "date": "2020-01-01T00:00:00Z" }
        }"#,
    )
    .unwrap();

    let status = fruutil()
        .args([
            "template",
            fru_path.to_str().unwrap(),
            "--json",
            template_path.to_str().unwrap(),
        ])
        .status()
        .unwrap();
    assert!(status.success());

    let output = fruutil().args(["dump", fru_path.to_str().unwrap(), "--json"]).output().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["chassis"]["chassis_type"], 23);
    assert_eq!(json["chassis"]["part_number"], "ABC-001");
    assert_eq!(json["board"]["manufacturer"], "Acme Corp");
}
