mod common;

use assert_cmd::Command;
use predicates::prelude::*;

use common::{file_names, write_image, write_text, YoloFixture};

#[test]
fn runs() {
    let mut cmd = Command::cargo_bin("annoverify").unwrap();
    cmd.assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = Command::cargo_bin("annoverify").unwrap();
    cmd.arg("-V");
    cmd.assert().success().stdout("annoverify 0.1.0\n");
}

#[test]
fn yolo_run_prints_summary() {
    let temp = tempfile::tempdir().unwrap();
    let fixture = YoloFixture::new(temp.path());
    write_image(&fixture.images.join("a.jpg"), 64, 48);
    write_text(
        &fixture.labels.join("a.txt"),
        "0 0.5 0.5 0.2 0.2\n1 0.3 0.3 0.1 0.1\n",
    );

    let mut cmd = Command::cargo_bin("annoverify").unwrap();
    cmd.arg("yolo")
        .arg("--labels")
        .arg(&fixture.labels)
        .arg("--images")
        .arg(&fixture.images)
        .arg("--classes")
        .arg(&fixture.classes)
        .arg("--output")
        .arg(&fixture.output)
        .arg("--no-progress");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Total boxes drawn: 2"))
        .stdout(predicate::str::contains("Total images processed: 1"));

    assert_eq!(file_names(&fixture.output), vec!["a.jpg".to_string()]);
}

#[test]
fn non_text_file_in_labels_aborts_without_output() {
    let temp = tempfile::tempdir().unwrap();
    let fixture = YoloFixture::new(temp.path());
    write_image(&fixture.images.join("a.jpg"), 16, 16);
    write_text(&fixture.labels.join("a.txt"), "0 0.5 0.5 0.2 0.2\n");
    write_text(&fixture.labels.join("a.json"), "{}");
    std::fs::create_dir_all(&fixture.output).unwrap();

    let mut cmd = Command::cargo_bin("annoverify").unwrap();
    cmd.arg("yolo")
        .arg("--labels")
        .arg(&fixture.labels)
        .arg("--images")
        .arg(&fixture.images)
        .arg("--classes")
        .arg(&fixture.classes)
        .arg("--output")
        .arg(&fixture.output);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Annotation folder should only contain .txt files"));

    assert!(file_names(&fixture.output).is_empty());
}

#[test]
fn missing_dataset_folder_fails() {
    let temp = tempfile::tempdir().unwrap();

    let mut cmd = Command::cargo_bin("annoverify").unwrap();
    cmd.arg("voc-dataset")
        .arg("--dataset")
        .arg(temp.path().join("nope"))
        .arg("--output")
        .arg(temp.path().join("out"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Dataset folder does not exist"));

    assert!(!temp.path().join("out").exists());
}

#[test]
fn json_report_is_machine_readable() {
    let temp = tempfile::tempdir().unwrap();
    let fixture = YoloFixture::new(temp.path());
    write_image(&fixture.images.join("a.png"), 32, 32);
    write_text(&fixture.labels.join("a.txt"), "5 0.5 0.5 0.2 0.2\n");

    let mut cmd = Command::cargo_bin("annoverify").unwrap();
    cmd.arg("yolo")
        .arg("--labels")
        .arg(&fixture.labels)
        .arg("--images")
        .arg(&fixture.images)
        .arg("--classes")
        .arg(&fixture.classes)
        .arg("--output")
        .arg(&fixture.output)
        .args(["--report", "json", "--quiet"]);
    let output = cmd.assert().success().get_output().stdout.clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["boxes_drawn"], 0);
    assert_eq!(json["boxes_skipped"], 1);
    assert_eq!(json["issues"][0]["code"], "class_index_out_of_range");
}

#[test]
fn strict_mode_exits_non_zero_on_failures() {
    let temp = tempfile::tempdir().unwrap();
    let fixture = YoloFixture::new(temp.path());
    write_image(&fixture.images.join("a.png"), 32, 32);
    write_text(&fixture.labels.join("a.txt"), "5 0.5 0.5 0.2 0.2\n");

    let mut cmd = Command::cargo_bin("annoverify").unwrap();
    cmd.arg("yolo")
        .arg("--labels")
        .arg(&fixture.labels)
        .arg("--images")
        .arg(&fixture.images)
        .arg("--classes")
        .arg(&fixture.classes)
        .arg("--output")
        .arg(&fixture.output)
        .args(["--strict", "--no-progress"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("strict mode"));
}
