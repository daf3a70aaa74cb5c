use assert_cmd::prelude::*;
use image::{GrayImage, Luma, Rgb, RgbImage};
use predicates::prelude::*;
use predicates::str::contains;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn texture_dir() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    RgbImage::from_pixel(4, 4, Rgb([200, 180, 160]))
        .save(dir.path().join("cup.jpg"))
        .expect("write cup texture");
    GrayImage::from_pixel(4, 4, Luma([240]))
        .save(dir.path().join("paper.jpg"))
        .expect("write paper texture");
    dir
}

#[test]
fn summary_reports_textures_and_frame() {
    let textures = texture_dir();
    let mut cmd = Command::cargo_bin("desk-scene").expect("binary exists");
    cmd.arg("--summary-only").arg("--textures").arg(textures.path());
    cmd.assert()
        .success()
        .stdout(contains("Loaded 1 texture(s), 10 failed"))
        .stdout(contains("paper: texture `paper` has 1 channel(s)"))
        .stdout(contains("Defined 7 material(s)"))
        .stdout(contains("Scene ready with 23 object(s)"))
        .stdout(contains(" - desk (plane)"))
        .stdout(contains("and 23 draw call(s)"));
}

#[test]
fn config_file_is_applied() {
    let textures = texture_dir();
    let config_dir = TempDir::new().expect("temp dir");
    let config = config_dir.path().join("viewer.toml");
    fs::write(
        &config,
        format!("textures = {:?}\n\n[window]\nwidth = 640\n", textures.path()),
    )
    .expect("write config");

    let mut cmd = Command::cargo_bin("desk-scene").expect("binary exists");
    cmd.arg("--config").arg(&config).arg("--summary-only");
    cmd.assert()
        .success()
        .stdout(contains("Loaded 1 texture(s)"));
}

#[test]
fn unknown_key_in_config_fails() {
    let config_dir = TempDir::new().expect("temp dir");
    let config = config_dir.path().join("viewer.toml");
    fs::write(&config, "[keys]\nforward = \"Hyper\"\n").expect("write config");

    let mut cmd = Command::cargo_bin("desk-scene").expect("binary exists");
    cmd.arg("--config").arg(&config).arg("--summary-only");
    cmd.assert()
        .failure()
        .stderr(contains("unknown key name `Hyper`"));
}

#[test]
fn rejects_unknown_argument() {
    let mut cmd = Command::cargo_bin("desk-scene").expect("binary exists");
    cmd.arg("--wireframe");
    cmd.assert()
        .failure()
        .stderr(contains("Unknown argument: --wireframe"));
}

#[test]
fn rejects_malformed_window_size() {
    let mut cmd = Command::cargo_bin("desk-scene").expect("binary exists");
    cmd.arg("--size").arg("wide").arg("--summary-only");
    cmd.assert()
        .failure()
        .stderr(contains("invalid window size `wide`").and(contains("WIDTHxHEIGHT")));
}

#[cfg(target_os = "linux")]
#[test]
fn missing_display_is_fatal() {
    let textures = texture_dir();
    let mut cmd = Command::cargo_bin("desk-scene").expect("binary exists");
    cmd.env_remove("DISPLAY")
        .env_remove("WAYLAND_DISPLAY")
        .env_remove("WAYLAND_SOCKET")
        .arg("--textures")
        .arg(textures.path());
    cmd.assert()
        .failure()
        .stderr(contains("Error: failed to initialize"))
        .stdout(contains("Scene ready").not());
}
