use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use std::process::Command;
use tempfile::TempDir;

fn desk_scene() -> Command {
    let mut cmd = Command::cargo_bin("desk-scene").expect("binary exists");
    cmd.env_remove("DESK_SCENE_ASSETS");
    cmd
}

fn asset_dir_with_tabletop() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    let pixels: Vec<u8> = (0..8 * 8).flat_map(|i| [i as u8 * 3, 90, 40]).collect();
    image::save_buffer(
        dir.path().join("wood_grain.jpg"),
        &pixels,
        8,
        8,
        image::ColorType::Rgb8,
    )
    .expect("write jpeg");
    dir
}

#[test]
fn summary_run_reports_textures_and_draws() {
    let assets = asset_dir_with_tabletop();
    desk_scene()
        .arg("--summary-only")
        .arg("--assets")
        .arg(assets.path())
        .assert()
        .success()
        .stdout(contains("Loaded 1 of 8 textures"))
        .stdout(contains("Frame 1: 55 draw calls (perspective)"))
        .stdout(contains(" - keyboard keys: 40"))
        .stdout(contains("projection=perspective"));
}

#[test]
fn pressing_o_switches_to_orthographic() {
    let assets = asset_dir_with_tabletop();
    desk_scene()
        .args(["--summary-only", "--frames", "2", "--press", "O"])
        .arg("--assets")
        .arg(assets.path())
        .assert()
        .success()
        .stdout(contains("Frame 1: 55 draw calls (orthographic)"))
        .stdout(contains("Frame 2: 55 draw calls (orthographic)"))
        .stdout(contains("pos=(0.00, 10.00, 0.00)"));
}

#[test]
fn environment_supplies_the_asset_dir() {
    let assets = asset_dir_with_tabletop();
    desk_scene()
        .env("DESK_SCENE_ASSETS", assets.path())
        .arg("--summary-only")
        .assert()
        .success()
        .stdout(contains("Loaded 1 of 8 textures"));
}

#[test]
fn missing_assets_still_render() {
    let empty = TempDir::new().expect("temp dir");
    desk_scene()
        .arg("--summary-only")
        .arg("--assets")
        .arg(empty.path().join("nowhere"))
        .assert()
        .success()
        .stdout(contains("Loaded 0 of 8 textures"))
        .stdout(contains("Frame 1: 55 draw calls"))
        .stdout(contains("Lookup misses:"));
}

#[test]
fn escape_stops_the_run_early() {
    let empty = TempDir::new().expect("temp dir");
    desk_scene()
        .args(["--summary-only", "--frames", "5", "--press", "Escape"])
        .arg("--assets")
        .arg(empty.path())
        .assert()
        .success()
        .stdout(contains("Close requested"))
        .stdout(contains("Frame 2").not());
}

#[test]
fn unknown_argument_fails() {
    desk_scene()
        .args(["--summary-only", "--wireframe"])
        .assert()
        .failure()
        .stderr(contains("Unknown argument: --wireframe"));
}
