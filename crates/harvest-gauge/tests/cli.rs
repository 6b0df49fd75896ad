use assert_cmd::Command;
use harvest_gauge::HarvestConfig;
use image::{GrayImage, Luma};
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn write_card_png(path: &std::path::Path) {
    let img = GrayImage::from_fn(640, 480, |x, y| {
        let inside = (100..528).contains(&x) && (100..370).contains(&y);
        Luma([if inside { 225 } else { 40 }])
    });
    img.save(path).unwrap();
}

fn cli() -> Command {
    Command::cargo_bin("harvest-gauge").unwrap()
}

#[test]
fn rules_prints_thresholds() {
    cli()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"L1\": 18.0"))
        .stdout(predicate::str::contains(">= 25.0 cm"));
}

#[test]
fn rules_follow_a_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"measurement": {"maturity": {"l1_cm": 15.0, "l2_cm": 22.0}}}"#).unwrap();

    cli()
        .args(["--config", path.to_str().unwrap(), "rules"])
        .assert()
        .success()
        .stdout(predicate::str::contains("15.0 - 22.0 cm"));
}

#[test]
fn detect_reports_card_corners() {
    let dir = tempdir().unwrap();
    let img = dir.path().join("card.png");
    write_card_png(&img);

    cli()
        .arg("detect")
        .arg(&img)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": true"));
}

#[test]
fn measure_reads_a_request_file() {
    let dir = tempdir().unwrap();
    let img = dir.path().join("card.png");
    write_card_png(&img);

    let request = serde_json::json!({
        "image_path": img,
        "card_corners": [{"x":100,"y":100},{"x":528,"y":100},{"x":528,"y":292},{"x":100,"y":292}],
        "leaves": [{"base": {"x":150,"y":150}, "tip": {"x":150,"y":400}}]
    });
    let req_path = dir.path().join("request.json");
    fs::write(&req_path, request.to_string()).unwrap();

    cli()
        .arg("measure")
        .arg(&req_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"NOT_MATURE\""))
        .stdout(predicate::str::contains("\"LOW\""));
}

#[test]
fn assess_classifies_known_lengths() {
    cli()
        .args(["assess", "24", "25", "24.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"HIGH\""))
        .stdout(predicate::str::contains("\"INTERMEDIATE\""));
}

#[test]
fn rectify_writes_a_png() {
    let dir = tempdir().unwrap();
    let img = dir.path().join("card.png");
    let out = dir.path().join("rectified.png");
    write_card_png(&img);

    cli()
        .arg("rectify")
        .arg(&img)
        .args([
            "--quad",
            r#"[{"x":100,"y":100},{"x":528,"y":100},{"x":528,"y":370},{"x":100,"y":370}]"#,
            "--out",
        ])
        .arg(&out)
        .assert()
        .success();

    let rectified = image::open(&out).unwrap().to_luma8();
    assert_eq!(rectified.dimensions(), (428, 270));
}

#[test]
fn default_config_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("default.json");

    cli().arg("default-config").arg(&path).assert().success();
    assert_eq!(HarvestConfig::load_json(&path).unwrap(), HarvestConfig::default());
}

#[test]
fn log_level_flag_routes_records_to_stderr() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("default.json");

    cli()
        .args(["--log-level", "info", "default-config"])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("default config written"));
}

#[test]
fn invalid_image_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.png");
    fs::write(&path, b"not an image").unwrap();

    cli()
        .arg("detect")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported image format"));
}
