use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../docs/fixtures")
        .canonicalize()
        .expect("fixture directory present")
}

fn cli(data_dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("shelterroute");
    cmd.env("RUST_LOG", "error")
        .env_remove("SHELTERROUTE_DATA_DIR")
        .env_remove("SHELTERROUTE_SITE")
        .env_remove("SHELTERROUTE_DESTINATIONS")
        .env_remove("SHELTERROUTE_DOORS")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn copy_fixtures(target: &Path) {
    for name in ["site_navgraph.json", "destinations.json", "doors_auto.json"] {
        fs::copy(fixtures_dir().join(name), target.join(name)).expect("copy fixture");
    }
}

#[test]
fn shortest_prints_corridor_length() {
    cli(&fixtures_dir())
        .args(["shortest", "--from", "0,0", "--to", "20,0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Length: 20.00 m"))
        .stdout(predicate::str::contains("Route (11 points):"));
}

#[test]
fn safe_defaults_to_evacuation() {
    cli(&fixtures_dir())
        .args(["safe", "--start", "0,0", "--threat", "10,3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Decision: EVACUATE (exit E1)"));
}

#[test]
fn safe_json_output_is_machine_readable() {
    let output = cli(&fixtures_dir())
        .args(["--format", "json", "safe", "--start", "0,0", "--threat", "10,3"])
        .args(["--prefer", "shelter"])
        .output()
        .expect("command runs");
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(value["decision"], "SHELTER");
    assert_eq!(value["target_kind"], "shelter");
    assert_eq!(value["target_id"], "S1");
    assert_eq!(value["units"], "meters");
}

#[test]
fn portal_accepts_negative_coordinates_and_thresholds() {
    cli(&fixtures_dir())
        .args(["portal", "--threat", "-3,0.5", "--mode", "shelter"])
        .args(["--lshort", "2.2", "--door-thresh", "0.9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Decision: SHELTER"))
        .stdout(predicate::str::contains("Doors considered: 1"));
}

#[test]
fn portal_without_doors_reports_friendly_error() {
    let temp = tempdir().expect("create temp dir");
    copy_fixtures(temp.path());
    fs::write(temp.path().join("doors_auto.json"), r#"{"doors":[]}"#).expect("clear doors");

    cli(temp.path())
        .args(["portal", "--threat", "10,3", "--start", "0,0", "--mode", "shelter"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no path found under door portal constraints"))
        .stderr(predicate::str::contains("Try another start position"));
}

#[test]
fn auto_selects_shelter_when_exit_is_threatened() {
    cli(&fixtures_dir())
        .args(["auto", "--start", "0,0", "--threat", "20,0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mode: SHELTER"))
        .stdout(predicate::str::contains("EVAC    risk"));
}

#[test]
fn invalid_coordinates_are_rejected_by_parser() {
    cli(&fixtures_dir())
        .args(["safe", "--start", "zero,0", "--threat", "10,3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("X coordinate 'zero' is not a number"));
}

#[test]
fn config_file_overrides_routing_constants() {
    let temp = tempdir().expect("create temp dir");
    let config = temp.path().join("routing.json");
    fs::write(&config, r#"{"short_edge_threshold": 12.0}"#).expect("write config");
    fs::write(temp.path().join("doors_auto.json"), r#"{"doors":[]}"#).expect("clear doors");
    for name in ["site_navgraph.json", "destinations.json"] {
        fs::copy(fixtures_dir().join(name), temp.path().join(name)).expect("copy fixture");
    }

    // Every edge is "short" under the override, so no door is needed.
    cli(temp.path())
        .arg("--config")
        .arg(&config)
        .args(["portal", "--threat", "10,3", "--start", "0,0", "--mode", "shelter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Doors considered: 0"));
}

#[test]
fn missing_site_is_a_configuration_error() {
    let temp = tempdir().expect("create temp dir");
    cli(temp.path())
        .arg("health")
        .assert()
        .failure()
        .stderr(predicate::str::contains("site map not found"));
}
