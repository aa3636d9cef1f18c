#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const ESCALA: &str = r#"{
    "start": "2025-11-01",
    "end": "2025-12-01",
    "quorum": 1,
    "medics": [
        { "name": "Ana", "shiftPerMonth": 2, "order": 1 },
        { "name": "Bia", "shiftPerMonth": 2, "order": 2 }
    ]
}"#;

fn cli(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("medshift-cli").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

#[test]
fn generate_exports_and_report_reads_snapshot() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("escala.json");
    fs::write(&config, ESCALA).unwrap();
    let csv = dir.path().join("slots.csv");
    let team = dir.path().join("team.csv");
    let state = dir.path().join("state.json");

    cli(&config)
        .args(["generate", "--month", "11", "--seed", "4"])
        .arg("--out-csv")
        .arg(&csv)
        .arg("--team-csv")
        .arg(&team)
        .arg("--snapshot")
        .arg(&state)
        .arg("--grid")
        .assert()
        .success()
        .stdout(predicate::str::contains("month 11: 60 slots, 4/60 seats filled"));

    let grid = fs::read_to_string(dir.path().join("escala.json.11Nov.csv")).unwrap();
    assert_eq!(grid.lines().count(), 35);
    assert!(grid.lines().any(|l| l.contains("NOVEMBRO 2025")));

    let slots = fs::read_to_string(&csv).unwrap();
    assert_eq!(slots.lines().count(), 61);
    assert!(slots.starts_with("date,weekday,round,quorum,assigned,blocked,holiday"));
    let team = fs::read_to_string(&team).unwrap();
    assert_eq!(team.lines().count(), 3);

    cli(&config)
        .arg("report")
        .arg("--snapshot")
        .arg(&state)
        .assert()
        .success()
        .stdout(predicate::str::contains("01/11/2025 Sab M"))
        .stdout(predicate::str::contains("team capacity 4"))
        .stdout(predicate::str::contains("overall: 60 slots, 60 seats, 2 medics, 4 medic shifts"))
        .stdout(predicate::str::contains("----- total 4 plantoes"));
}

#[test]
fn check_flags_unfilled_slots() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("escala.json");
    fs::write(&config, ESCALA).unwrap();
    let report = dir.path().join("findings.csv");

    cli(&config)
        .args(["check", "--seed", "1"])
        .arg("--report")
        .arg(&report)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("finding(s)"));

    let text = fs::read_to_string(&report).unwrap();
    assert!(text.starts_with("date,round,medic,kind"));
    assert!(text.contains("under_quorum"));
}

#[test]
fn bad_month_and_missing_config_fail() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("escala.json");
    fs::write(&config, ESCALA).unwrap();

    cli(&config)
        .args(["generate", "--month", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside the calendar range"));

    cli(&dir.path().join("absent.json"))
        .arg("report")
        .assert()
        .failure();
}
