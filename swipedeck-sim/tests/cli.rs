use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn sim() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("swipedeck-sim");
    cmd.env_remove("SWIPEDECK_CONFIG_PATH")
        .env_remove("SWIPEDECK_CONFIG_JSON")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_mentions_options() {
    let output = sim()
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&output);
    for flag in ["--drag", "--config", "--steps", "--skip", "--print-config"] {
        assert!(text.contains(flag), "help missing {flag}");
    }
}

#[test]
fn two_commits_trigger_a_refill() {
    let dir = TempDir::new().unwrap();
    sim()
        .current_dir(dir.path())
        .args(["--drag", "150,0", "--drag", "-150,0"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "drag 1: card 1 -> commit right",
        ))
        .stdout(predicate::str::contains("overlay LIKE"))
        .stdout(predicate::str::contains("swiped Alice (#1) right"))
        .stdout(predicate::str::contains("swiped Bob (#2) left"))
        .stdout(predicate::str::contains("deck: 3 cards"))
        .stdout(predicate::str::contains(
            "3. User 5 (#5) https://randomuser.me/api/portraits/women/5.jpg",
        ));
}

#[test]
fn short_drag_cancels() {
    let dir = TempDir::new().unwrap();
    sim()
        .current_dir(dir.path())
        .args(["--drag", "40,-30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("drag 1: card 1 -> cancel"))
        .stdout(predicate::str::contains("swiped").not())
        .stdout(predicate::str::contains("deck: 4 cards"));
}

#[test]
fn exhausted_deck_shows_empty_state_and_accepts_filter_change() {
    let dir = TempDir::new().unwrap();
    sim()
        .current_dir(dir.path())
        .args(["--generate", "0", "--skip", "10", "--change-filters"])
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped Dave (#4)"))
        .stdout(predicate::str::contains("change filters requested"))
        .stdout(predicate::str::contains("deck empty (default icon)"));
}

#[test]
fn config_file_changes_behaviour() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("deck.toml");
    std::fs::write(
        &path,
        "[swipe]\nenabled_directions = [\"left\", \"up\"]\n",
    )
    .unwrap();

    sim()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&path)
        .args(["--drag", "200,0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("drag 1: card 1 -> cancel"));
}

#[test]
fn invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("deck.toml");
    std::fs::write(&path, "[gesture]\nswipe_threshold = 0.0\n").unwrap();

    sim()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("gesture.swipe_threshold"));
}

#[test]
fn print_config_emits_defaults() {
    let dir = TempDir::new().unwrap();
    sim()
        .current_dir(dir.path())
        .arg("--print-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("swipe_threshold = 100.0"))
        .stdout(predicate::str::contains("refill_threshold = 2"));
}

#[test]
fn json_report_lists_swipes() {
    let dir = TempDir::new().unwrap();
    let output = sim()
        .current_dir(dir.path())
        .args(["--json", "--drag", "0,-200"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["swipes"][0]["name"], "Alice");
    assert_eq!(report["swipes"][0]["direction"], "up");
    assert_eq!(report["deck"].as_array().unwrap().len(), 3);
}
