//! Configuration flowing into the portal: timing, assets and output paths.

use std::fs;
use std::io::Cursor;
use std::time::Duration;

use chrono::NaiveDate;
use image::{ImageFormat, Rgba, RgbaImage};
use tempfile::TempDir;

use tramite::certificate::DrawOp;
use tramite::portal::{certificate_builder, review_timing};
use tramite::{CliArgs, Config, Portal, sample_record};

fn write_config(dir: &TempDir, body: &str) {
    let config_dir = dir.path().join(".tramite");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), body).unwrap();
}

fn png() -> Vec<u8> {
    let img = RgbaImage::from_pixel(40, 20, Rgba([0, 0, 255, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn image_count(config: &Config) -> usize {
    let record = sample_record(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(), 7);
    certificate_builder(config)
        .build(&record)
        .pages()
        .iter()
        .flat_map(|page| page.ops.iter())
        .filter(|op| matches!(op, DrawOp::Image { .. }))
        .count()
}

#[test]
fn test_file_timing_reaches_review() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        "[timing]\nphase_duration_ms = 800\nitem_interval_ms = 100\nsettle_delay_ms = 50\n",
    );

    let config = Config::discover_from(dir.path(), &CliArgs::default()).unwrap();
    let timing = review_timing(&config);

    assert_eq!(timing.phase_duration, Duration::from_millis(800));
    assert_eq!(timing.item_interval, Duration::from_millis(100));
    assert_eq!(timing.settle_delay, Duration::from_millis(50));
    assert_eq!(Portal::from_config(&config).phases().len(), 4);
}

#[test]
fn test_cli_overrides_file_timing() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "[timing]\nphase_duration_ms = 800\n");

    let cli_args = CliArgs {
        phase_duration_ms: Some(1_200),
        ..CliArgs::default()
    };
    let config = Config::discover_from(dir.path(), &cli_args).unwrap();

    assert_eq!(review_timing(&config).phase_duration, Duration::from_millis(1_200));
}

#[test]
fn test_assets_dir_supplies_logos() {
    let dir = TempDir::new().unwrap();
    let assets = dir.path().join("assets");
    fs::create_dir_all(&assets).unwrap();
    fs::write(assets.join("LogoArsa.png"), png()).unwrap();
    fs::write(assets.join("LogoHonduras.png"), png()).unwrap();

    let with_assets = Config::builder().assets_dir(&assets).build().unwrap();
    let without_assets = Config::builder().build().unwrap();

    // Logos are drawn once, on the first page.
    assert_eq!(image_count(&with_assets), 2);
    assert_eq!(image_count(&without_assets), 0);
}

#[test]
fn test_missing_assets_dir_still_builds() {
    let dir = TempDir::new().unwrap();
    let config = Config::builder()
        .assets_dir(dir.path().join("does-not-exist"))
        .build()
        .unwrap();

    assert_eq!(image_count(&config), 0);
}
