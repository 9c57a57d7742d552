use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::str::contains;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../docs/fixtures")
        .join(name)
        .canonicalize()
        .expect("fixture present")
}

fn cli() -> Command {
    let mut cmd = cargo_bin_cmd!("searoute");
    cmd.env("RUST_LOG", "error")
        .env_remove("LOG_FORMAT")
        .env_remove("SEAROUTE_PORTS");
    cmd
}

#[test]
fn nearest_port_at_its_own_position() {
    let mut cmd = cli();
    cmd.arg("nearest-port")
        .arg("--lat")
        .arg("38.70")
        .arg("--lon=-9.14")
        .arg("--ports")
        .arg(fixture("sample_ports.csv"));

    cmd.assert()
        .success()
        .stdout(contains("Nearest port: Lisbon [PTLIS], Portugal"))
        .stdout(contains("Distance: 0.00 km"));
}

#[test]
fn nearest_port_reads_ports_from_environment() {
    let mut cmd = cli();
    cmd.env("SEAROUTE_PORTS", fixture("sample_ports.json"))
        .arg("nearest-port")
        .arg("--lat")
        .arg("2.0")
        .arg("--lon")
        .arg("104.5")
        .arg("--format")
        .arg("json");

    let output = cmd.assert().success().get_output().stdout.clone();
    let nearest: serde_json::Value = serde_json::from_slice(&output).expect("json output");
    assert_eq!(nearest["name"], "Singapore");
    assert!(nearest["distance_km"].as_f64().expect("number") > 0.0);
}

#[test]
fn nearest_port_without_data_fails() {
    let mut cmd = cli();
    cmd.arg("nearest-port").arg("--lat").arg("0").arg("--lon").arg("0");

    cmd.assert().failure().stderr(contains("No ports available"));
}

#[test]
fn empty_port_file_reports_no_ports() {
    let dir = tempdir().expect("temp dir");
    let ports = dir.path().join("ports.csv");
    fs::write(&ports, "name,lat,lon\n").expect("write csv");

    let mut cmd = cli();
    cmd.arg("nearest-port")
        .arg("--lat")
        .arg("0")
        .arg("--lon")
        .arg("0")
        .arg("--ports")
        .arg(&ports);

    cmd.assert().failure().stderr(contains("No ports available"));
}

#[test]
fn out_of_range_latitude_is_rejected() {
    let mut cmd = cli();
    cmd.arg("nearest-port")
        .arg("--lat")
        .arg("95")
        .arg("--lon")
        .arg("0")
        .arg("--ports")
        .arg(fixture("sample_ports.csv"));

    cmd.assert().failure().stderr(contains("latitude must be within"));
}
