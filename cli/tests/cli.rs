use std::path::PathBuf;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

use gribjump::{GribHeader, GribInfo};

const CMD_NAME: &str = "gribjump";

/// The conventional metadata path the `query` subcommand falls back to.
fn meta_path(grib_path: &std::path::Path) -> PathBuf {
    let mut path = grib_path.as_os_str().to_owned();
    path.push(".bin");
    PathBuf::from(path)
}

struct FixtureHeader {
    reference_value: f64,
    bits_per_value: u32,
    offset_before_data: u64,
    offset_before_bitmap: u64,
    number_of_data_points: u64,
    number_of_values: u64,
    total_length: u64,
}

impl GribHeader for FixtureHeader {
    fn reference_value(&self) -> f64 {
        self.reference_value
    }

    fn binary_scale_factor(&self) -> i32 {
        0
    }

    fn decimal_scale_factor(&self) -> i32 {
        0
    }

    fn bits_per_value(&self) -> u32 {
        self.bits_per_value
    }

    fn offset_before_data(&self) -> u64 {
        self.offset_before_data
    }

    fn bitmap_present(&self) -> bool {
        self.offset_before_bitmap != 0
    }

    fn offset_before_bitmap(&self) -> u64 {
        self.offset_before_bitmap
    }

    fn number_of_data_points(&self) -> u64 {
        self.number_of_data_points
    }

    fn number_of_values(&self) -> u64 {
        self.number_of_values
    }

    fn spherical_harmonics(&self) -> i32 {
        0
    }

    fn message_start(&self) -> u64 {
        0
    }

    fn total_length(&self) -> u64 {
        self.total_length
    }
}

/// A single-message file with four byte-wide values and no bitmap, plus its
/// metadata file at the conventional `<name>.bin` path.
fn plain_fixture(dir: &TempDir) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let grib_path = dir.path().join("plain.grib");
    let mut bytes = vec![0u8; 8];
    bytes.extend([1, 2, 3, 4]);
    bytes.extend([0u8; 8]);
    std::fs::write(&grib_path, &bytes)?;

    let mut info = GribInfo::new();
    info.update(&FixtureHeader {
        reference_value: 0.0,
        bits_per_value: 8,
        offset_before_data: 8,
        offset_before_bitmap: 0,
        number_of_data_points: 4,
        number_of_values: 4,
        total_length: bytes.len() as u64,
    });
    gribjump::metadata::write_file(meta_path(&grib_path), &[info])?;
    Ok(grib_path)
}

/// A single-message file whose bitmap marks point 1 of 4 as missing.
fn bitmap_fixture(dir: &TempDir) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let grib_path = dir.path().join("masked.grib");
    let mut bytes = vec![0u8; 8];
    bytes.extend([0b1011_0000u8, 0, 0, 0, 0, 0, 0, 0]);
    bytes.extend([10, 20, 30]);
    bytes.extend([0u8; 8]);
    std::fs::write(&grib_path, &bytes)?;

    let mut info = GribInfo::new();
    info.update(&FixtureHeader {
        reference_value: 0.0,
        bits_per_value: 8,
        offset_before_data: 16,
        offset_before_bitmap: 8,
        number_of_data_points: 4,
        number_of_values: 3,
        total_length: bytes.len() as u64,
    });
    gribjump::metadata::write_file(meta_path(&grib_path), &[info])?;
    Ok(grib_path)
}

#[test]
fn help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin(CMD_NAME)?;
    cmd.arg("--help");
    cmd.assert().success().stdout(
        predicate::str::contains("Usage:")
            .and(predicate::str::contains("query"))
            .and(predicate::str::contains("info"))
            .and(predicate::str::contains("dump")),
    );

    Ok(())
}

#[test]
fn no_subcommand_specified() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin(CMD_NAME)?;
    cmd.assert().failure().stdout(predicate::str::is_empty());

    Ok(())
}

#[test]
fn query_single_index() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let grib_path = plain_fixture(&dir)?;

    let mut cmd = Command::cargo_bin(CMD_NAME)?;
    cmd.arg("query").arg(&grib_path).arg("2");
    cmd.assert().success().stdout(predicate::str::diff("3\n"));

    Ok(())
}

#[test]
fn query_range_with_missing_points() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let grib_path = bitmap_fixture(&dir)?;

    let mut cmd = Command::cargo_bin(CMD_NAME)?;
    cmd.arg("query").arg(&grib_path).arg("0..4");
    cmd.assert()
        .success()
        .stdout(predicate::str::diff("10\n9999\n20\n30\n"));

    Ok(())
}

#[test]
fn query_multiple_ranges_concatenate() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let grib_path = plain_fixture(&dir)?;

    let mut cmd = Command::cargo_bin(CMD_NAME)?;
    cmd.arg("query").arg(&grib_path).arg("2..4").arg("0..2");
    cmd.assert()
        .success()
        .stdout(predicate::str::diff("3\n4\n1\n2\n"));

    Ok(())
}

#[test]
fn query_with_explicit_metadata_path() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let grib_path = plain_fixture(&dir)?;
    let moved_meta = dir.path().join("elsewhere.bin");
    std::fs::rename(meta_path(&grib_path), &moved_meta)?;

    let mut cmd = Command::cargo_bin(CMD_NAME)?;
    cmd.arg("query")
        .arg(&grib_path)
        .arg("0")
        .arg("--meta")
        .arg(&moved_meta);
    cmd.assert().success().stdout(predicate::str::diff("1\n"));

    Ok(())
}

#[test]
fn query_with_malformed_points_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let grib_path = plain_fixture(&dir)?;

    let mut cmd = Command::cargo_bin(CMD_NAME)?;
    cmd.arg("query").arg(&grib_path).arg("1-2");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("error"));

    Ok(())
}

#[test]
fn query_without_metadata_file_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let grib_path = dir.path().join("no-meta.grib");
    std::fs::write(&grib_path, [0u8; 16])?;

    let mut cmd = Command::cargo_bin(CMD_NAME)?;
    cmd.arg("query").arg(&grib_path).arg("0");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("error"));

    Ok(())
}

#[test]
fn info_lists_records() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let grib_path = plain_fixture(&dir)?;

    let mut cmd = Command::cargo_bin(CMD_NAME)?;
    cmd.arg("info").arg(meta_path(&grib_path));
    cmd.assert().success().stdout(
        predicate::str::contains("Message 0")
            .and(predicate::str::contains("Number of data points:  4"))
            .and(predicate::str::contains("Bits per value:         8")),
    );

    Ok(())
}

#[test]
fn dump_prints_json_record() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let grib_path = bitmap_fixture(&dir)?;

    let mut cmd = Command::cargo_bin(CMD_NAME)?;
    cmd.arg("dump").arg(meta_path(&grib_path));
    let output = cmd.assert().success().get_output().stdout.clone();

    let parsed: serde_json::Value = serde_json::from_slice(&output)?;
    assert_eq!(parsed["bitsPerValue"], 8);
    assert_eq!(parsed["numberOfValues"], 3);
    assert_eq!(parsed["offsetBeforeBitmap"], 8);
    Ok(())
}
