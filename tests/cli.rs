use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use assert_cmd::Command;
use itertools::Itertools;

fn unique_temp_path(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("wheel-cover-{name}-{stamp}.csv"))
}

fn wheel_cover() -> Command {
    Command::cargo_bin("wheel-cover").expect("binary should be built")
}

fn read_rows(path: &Path) -> Vec<Vec<u8>> {
    fs::read_to_string(path)
        .expect("tickets should be saved")
        .lines()
        .map(|line| line.split(';').map(|n| n.parse().expect("integer field")).collect())
        .collect()
}

#[test]
fn covers_every_draw_of_a_small_lottery() {
    let output_path = unique_temp_path("small-out");
    let output = wheel_cover()
        .args(["--universe-size", "6", "--draw-size", "3", "--ticket-size", "4"])
        .args(["--coverage", "1.0", "--ignore", "0", "--seed", "9", "--ticket-cost", "2.5"])
        .arg("--history")
        .arg(unique_temp_path("absent-history"))
        .arg("--output")
        .arg(&output_path)
        .output()
        .expect("wheel-cover should run");

    assert_eq!(output.status.code(), Some(0));
    let rows = read_rows(&output_path);
    assert!(!rows.is_empty());
    for row in &rows {
        assert_eq!(row.len(), 4);
        assert!(row.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(row.iter().all(|n| (1..=6).contains(n)));
    }
    let covered: HashSet<Vec<u8>> = rows
        .iter()
        .flat_map(|row| row.iter().copied().combinations(3))
        .collect();
    assert_eq!(covered.len(), 20);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("tickets: {}", rows.len())));
    assert!(stdout.contains(&format!("total cost: R${:.2}", rows.len() as f64 * 2.5)));
    fs::remove_file(&output_path).ok();
}

#[test]
fn hottest_numbers_make_the_first_ticket() {
    let history_path = unique_temp_path("history");
    let output_path = unique_temp_path("hot-out");
    fs::write(&history_path, "\u{feff}7;3;9\n7;3;9\n7;3;1\n2;4;5\n").unwrap();

    let output = wheel_cover()
        .args(["--universe-size", "10", "--draw-size", "2", "--ticket-size", "3"])
        .args(["--coverage", "0.05", "--ignore", "0", "--seed", "1"])
        .arg("--history")
        .arg(&history_path)
        .arg("--output")
        .arg(&output_path)
        .output()
        .expect("wheel-cover should run");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(fs::read_to_string(&output_path).unwrap(), "3;7;9\n");
    fs::remove_file(&history_path).ok();
    fs::remove_file(&output_path).ok();
}

#[test]
fn ticket_not_larger_than_draw_is_a_configuration_error() {
    let output = wheel_cover()
        .args(["--universe-size", "6", "--draw-size", "3", "--ticket-size", "3"])
        .arg("--output")
        .arg(unique_temp_path("never-written"))
        .output()
        .expect("wheel-cover should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ticket size must exceed draw size 3"));
}

#[test]
fn unreachable_target_within_budget_fails() {
    let output_path = unique_temp_path("budget-out");
    let output = wheel_cover()
        .args(["--universe-size", "12", "--draw-size", "3", "--ticket-size", "4"])
        .args(["--coverage", "1.0", "--ignore", "0", "--seed", "3", "--max-iterations", "2"])
        .arg("--history")
        .arg(unique_temp_path("absent-history"))
        .arg("--output")
        .arg(&output_path)
        .output()
        .expect("wheel-cover should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("coverage target not reached within 2 iterations"));
    assert!(stderr.contains("tickets kept"));
    assert!(!output_path.exists());
}

#[test]
fn malformed_history_is_rejected() {
    let history_path = unique_temp_path("bad-history");
    fs::write(&history_path, "1;2;3\n4;five;6\n").unwrap();
    let output = wheel_cover()
        .args(["--universe-size", "6", "--draw-size", "3", "--ticket-size", "4"])
        .arg("--history")
        .arg(&history_path)
        .arg("--output")
        .arg(unique_temp_path("never-written"))
        .output()
        .expect("wheel-cover should run");

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("\"five\" is not an integer"));
    fs::remove_file(&history_path).ok();
}
