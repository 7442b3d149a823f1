//! Locating and parsing deck config files.

use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, anyhow};
use swipedeck_core::SwipeDeckConfig;

/// Path to a TOML or JSON config file.
pub const CONFIG_PATH_ENV: &str = "SWIPEDECK_CONFIG_PATH";
/// Inline JSON config, used when no path is given.
pub const CONFIG_JSON_ENV: &str = "SWIPEDECK_CONFIG_JSON";

const CANDIDATES: &[&str] = &[
    "swipedeck.toml",
    "swipedeck.json",
    "config/swipedeck.toml",
    "config/swipedeck.json",
];

/// Source that produced the deck configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    /// Nothing found; built-in defaults.
    #[default]
    Default,
    /// File named by `$SWIPEDECK_CONFIG_PATH`.
    EnvPath(PathBuf),
    /// JSON held in `$SWIPEDECK_CONFIG_JSON`.
    EnvInline,
    /// An explicit or discovered file.
    File(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Default => f.write_str("built-in defaults"),
            ConfigSource::EnvPath(path) => {
                write!(f, "${CONFIG_PATH_ENV} ({})", path.display())
            }
            ConfigSource::EnvInline => write!(f, "${CONFIG_JSON_ENV}"),
            ConfigSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Load configuration overrides using environment variables.
/// Evaluation order:
/// 1) `$SWIPEDECK_CONFIG_PATH` (TOML or JSON file),
/// 2) `$SWIPEDECK_CONFIG_JSON` (inline JSON),
/// 3) the first of `swipedeck.toml`, `swipedeck.json`,
///    `config/swipedeck.toml`, `config/swipedeck.json` in the working
///    directory,
/// 4) defaults if none of the above exist.
pub fn load_from_env() -> anyhow::Result<(SwipeDeckConfig, ConfigSource)> {
    load_with(|key| env::var(key).ok(), Path::new("."))
}

/// [`load_from_env`] with the variable lookup and the directory searched for
/// candidate files supplied by the caller.
pub fn load_with<F>(
    lookup: F,
    search_root: &Path,
) -> anyhow::Result<(SwipeDeckConfig, ConfigSource)>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path_str) = lookup(CONFIG_PATH_ENV)
        && !path_str.trim().is_empty()
    {
        let path = PathBuf::from(path_str.trim());
        let config = load_from_file(&path)?;
        return Ok((config, ConfigSource::EnvPath(path)));
    }

    if let Some(raw) = lookup(CONFIG_JSON_ENV)
        && !raw.trim().is_empty()
    {
        let parsed = parse_json(&raw)
            .with_context(|| format!("failed to parse {CONFIG_JSON_ENV}"))?;
        return Ok((parsed, ConfigSource::EnvInline));
    }

    if let Some(path) = find_default_file(search_root) {
        let config = load_from_file(&path)?;
        return Ok((config, ConfigSource::File(path)));
    }

    Ok((SwipeDeckConfig::default(), ConfigSource::Default))
}

/// Read a config file. `.json` and `.toml` pick the format, anything else
/// tries TOML then JSON.
pub fn load_from_file(path: &Path) -> anyhow::Result<SwipeDeckConfig> {
    let contents = fs::read_to_string(path).with_context(|| {
        format!("failed to read deck config from {}", path.display())
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => parse_json(&contents)
            .with_context(|| format!("invalid deck config {}", path.display())),
        Some("toml") | Some("tml") => toml::from_str(&contents).map_err(|err| {
            anyhow!("invalid deck config {}: {}", path.display(), err)
        }),
        _ => parse_from_str(&contents, &path.display().to_string()),
    }
}

/// Parse `contents` as TOML, falling back to JSON. `origin` names the
/// source in error messages.
pub fn parse_from_str(
    contents: &str,
    origin: &str,
) -> anyhow::Result<SwipeDeckConfig> {
    // Try TOML first, then JSON for convenience.
    toml::from_str(contents).or_else(|toml_err| {
        serde_json::from_str(contents).map_err(|json_err| {
            anyhow!(
                "failed to parse deck config {}: toml error: {}; json error: {}",
                origin,
                toml_err,
                json_err
            )
        })
    })
}

/// Parse a JSON config.
pub fn parse_json(raw: &str) -> anyhow::Result<SwipeDeckConfig> {
    serde_json::from_str(raw)
        .map_err(|err| anyhow!("invalid deck config json: {err}"))
}

/// Render a config as TOML, the format `load_from_file` reads back.
pub fn to_toml_string(config: &SwipeDeckConfig) -> anyhow::Result<String> {
    toml::to_string_pretty(config).context("failed to render deck config")
}

fn find_default_file(root: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|path| path.is_file())
}
