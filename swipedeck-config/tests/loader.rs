use std::collections::HashMap;
use std::fs;
use std::path::Path;

use swipedeck_config::{
    CONFIG_JSON_ENV, CONFIG_PATH_ENV, ConfigSource, load, load_from_file,
    load_with,
};
use swipedeck_core::{Easing, EmptyStatePresentation, SwipeDirection};
use tempfile::TempDir;

fn vars(pairs: &[(&str, String)]) -> impl Fn(&str) -> Option<String> + use<> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    move |key| map.get(key).cloned()
}

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn falls_back_to_defaults_when_nothing_is_configured() {
    let dir = TempDir::new().unwrap();
    let (config, source) = load_with(vars(&[]), dir.path()).unwrap();
    assert_eq!(source, ConfigSource::Default);
    assert_eq!(config, Default::default());
}

#[test]
fn path_variable_wins_over_inline_json_and_files() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "custom.toml",
        "[gesture]\nswipe_threshold = 64.0\n",
    );
    write(dir.path(), "swipedeck.toml", "[gesture]\nswipe_threshold = 1.0\n");

    let lookup = vars(&[
        (CONFIG_PATH_ENV, path.display().to_string()),
        (CONFIG_JSON_ENV, r#"{"gesture":{"swipe_threshold":2.0}}"#.into()),
    ]);
    let (config, source) = load_with(lookup, dir.path()).unwrap();
    assert_eq!(source, ConfigSource::EnvPath(path));
    assert_eq!(config.gesture.swipe_threshold, 64.0);
}

#[test]
fn blank_path_variable_is_ignored() {
    let dir = TempDir::new().unwrap();
    let lookup = vars(&[
        (CONFIG_PATH_ENV, "   ".into()),
        (CONFIG_JSON_ENV, r#"{"deck":{"refill_threshold":4}}"#.into()),
    ]);
    let (config, source) = load_with(lookup, dir.path()).unwrap();
    assert_eq!(source, ConfigSource::EnvInline);
    assert_eq!(config.deck.refill_threshold, 4);
}

#[test]
fn bad_inline_json_names_the_variable() {
    let dir = TempDir::new().unwrap();
    let lookup = vars(&[(CONFIG_JSON_ENV, "{not json".into())]);
    let err = load_with(lookup, dir.path()).unwrap_err();
    assert!(format!("{err:#}").contains(CONFIG_JSON_ENV));
}

#[test]
fn candidate_files_are_searched_in_order() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "config/swipedeck.json",
        r#"{"trajectory":{"cancel_duration_ms":120}}"#,
    );
    let (config, source) = load_with(vars(&[]), dir.path()).unwrap();
    assert_eq!(
        source,
        ConfigSource::File(dir.path().join("config/swipedeck.json"))
    );
    assert_eq!(config.trajectory.cancel_duration_ms, 120);

    write(
        dir.path(),
        "swipedeck.toml",
        "[trajectory]\ncancel_duration_ms = 450\n",
    );
    let (config, source) = load_with(vars(&[]), dir.path()).unwrap();
    assert_eq!(source, ConfigSource::File(dir.path().join("swipedeck.toml")));
    assert_eq!(config.trajectory.cancel_duration_ms, 450);
}

#[test]
fn full_toml_file_round_trips_every_section() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "deck.toml",
        r#"
[swipe]
enabled_directions = ["left", "up"]

[swipe.labels]
left = "PASS"
up = "STAR"

[swipe.empty_state]
animation = "empty.json"
image = "empty.png"

[deck]
refill_threshold = 3

[trajectory]
cancel_easing = "ease_out_cubic"
offscreen_factor = 2.0

[trajectory.viewport]
width = 1080.0
"#,
    );

    let config = load_from_file(&path).unwrap();
    assert!(config.swipe.is_enabled(SwipeDirection::Up));
    assert!(!config.swipe.is_enabled(SwipeDirection::Right));
    assert_eq!(config.swipe.label(SwipeDirection::Left), Some("PASS"));
    assert_eq!(config.swipe.label(SwipeDirection::Right), None);
    assert_eq!(
        config.swipe.empty_state.presentation(),
        EmptyStatePresentation::Animation("empty.json".into())
    );
    assert_eq!(config.deck.refill_threshold, 3);
    assert_eq!(config.trajectory.cancel_easing, Easing::EaseOutCubic);
    assert_eq!(config.trajectory.viewport.width, 1080.0);
    assert_eq!(config.trajectory.viewport.height, 915.0);
}

#[test]
fn unknown_extension_tries_toml_then_json() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "deck.conf", r#"{"deck":{"event_capacity":8}}"#);
    assert_eq!(load_from_file(&path).unwrap().deck.event_capacity, 8);
}

#[test]
fn missing_file_reports_the_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    let err = load_from_file(&path).unwrap_err();
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn explicit_file_is_validated() {
    let dir = TempDir::new().unwrap();
    let ok = write(
        dir.path(),
        "ok.toml",
        "[swipe]\nenabled_directions = [\"left\", \"right\", \"down\"]\n",
    );
    let loaded = load(Some(&ok)).unwrap();
    assert_eq!(loaded.source, ConfigSource::File(ok));
    assert!(!loaded.warnings.is_empty());

    let rejected = write(
        dir.path(),
        "bad.toml",
        "[gesture]\nswipe_threshold = -5.0\n",
    );
    let err = load(Some(&rejected)).unwrap_err();
    assert!(format!("{err:#}").contains("gesture.swipe_threshold"));
}
