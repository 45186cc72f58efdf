use std::path::{Path, PathBuf};

use assert_cmd::Command;
use crossgrid::detector::synthetic::SyntheticGrid;
use predicates::prelude::*;
use tempfile::TempDir;

fn crossgrid() -> Command {
    Command::cargo_bin("crossgrid").unwrap()
}

fn write_grid_png(dir: &Path, name: &str, grid: &SyntheticGrid) -> PathBuf {
    let img = grid.render();
    let buf = image::RgbaImage::from_raw(img.width as u32, img.height as u32, img.data).unwrap();
    let path = dir.join(name);
    buf.save(&path).unwrap();
    path
}

fn report_json(out: &[u8]) -> serde_json::Value {
    serde_json::from_slice(out).unwrap()
}

#[test]
fn outputs_version() {
    crossgrid()
        .arg("-V")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("crossgrid "));
}

#[test]
fn detect_reports_calibration() {
    let dir = TempDir::new().unwrap();
    let path = write_grid_png(
        dir.path(),
        "grid.png",
        &SyntheticGrid::new(15, 15, 30).with_origin(30, 30),
    );

    let out = crossgrid()
        .arg("detect")
        .arg(&path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json = report_json(&out);
    assert_eq!(json["status"], "success");
    assert_eq!(json["calibration"]["gridWidth"], 15);
    assert_eq!(json["calibration"]["gridHeight"], 15);
    assert_eq!(json["calibration"]["cellWidth"], 30);
    assert_eq!(json["calibration"]["offsetX"], 30);
    assert_eq!(json["image_width"], 482);
}

#[test]
fn detect_rescales_to_display_size() {
    let dir = TempDir::new().unwrap();
    let path = write_grid_png(
        dir.path(),
        "grid.png",
        &SyntheticGrid::new(10, 10, 30)
            .with_origin(60, 30)
            .with_canvas(800, 600),
    );

    let out = crossgrid()
        .args(["detect", "--display-width", "2000", "--display-height", "1500"])
        .arg(&path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json = report_json(&out);
    assert_eq!(json["calibration"]["cellWidth"], 75);
    assert_eq!(json["calibration"]["offsetX"], 150);
    assert_eq!(json["calibration"]["offsetY"], 75);
}

#[test]
fn blank_image_is_a_reported_failure() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blank.png");
    image::RgbaImage::from_pixel(300, 300, image::Rgba([255, 255, 255, 255]))
        .save(&path)
        .unwrap();

    crossgrid()
        .arg("detect")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"failure\""))
        .stdout(predicate::str::contains("no puzzle boxes detected"));
}

#[test]
fn config_and_output_file_are_honored() {
    let dir = TempDir::new().unwrap();
    let path = write_grid_png(
        dir.path(),
        "grid.png",
        &SyntheticGrid::new(15, 15, 30).with_origin(30, 30),
    );
    // cells are 28 px, so a 40 px minimum rejects every box
    let config = dir.path().join("params.json");
    std::fs::write(&config, r#"{ "box_filter": { "min_size": 40 } }"#).unwrap();
    let report = dir.path().join("out/report.json");

    crossgrid()
        .arg("detect")
        .arg(&path)
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let json = report_json(&std::fs::read(&report).unwrap());
    assert_eq!(json["status"], "failure");
}

#[test]
fn malformed_config_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_grid_png(dir.path(), "grid.png", &SyntheticGrid::new(15, 15, 30));
    let config = dir.path().join("params.json");
    std::fs::write(&config, "{ not json").unwrap();

    crossgrid()
        .arg("detect")
        .arg(&path)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config"));
}

#[test]
fn missing_image_fails() {
    crossgrid()
        .args(["detect", "does/not/exist.png"])
        .assert()
        .failure();
}

#[test]
fn validate_accepts_png() {
    let dir = TempDir::new().unwrap();
    let path = write_grid_png(dir.path(), "grid.png", &SyntheticGrid::new(15, 15, 30));

    crossgrid()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"valid\": true"))
        .stdout(predicate::str::contains("\"format\": \"Png\""));
}

#[test]
fn validate_rejects_small_and_unsupported_images() {
    let dir = TempDir::new().unwrap();
    let small = write_grid_png(dir.path(), "small.png", &SyntheticGrid::new(3, 3, 30));
    crossgrid()
        .arg("validate")
        .arg(&small)
        .assert()
        .failure()
        .stdout(predicate::str::contains("too small"));

    let bmp = dir.path().join("grid.bmp");
    image::RgbImage::from_pixel(300, 300, image::Rgb([255, 255, 255]))
        .save(&bmp)
        .unwrap();
    crossgrid()
        .arg("validate")
        .arg(&bmp)
        .assert()
        .failure()
        .stdout(predicate::str::contains("please upload a JPG or PNG image"));
}
