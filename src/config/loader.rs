//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{KeepsyncError, KeepsyncResult};

use super::types::Config;

/// Project configuration file name
pub const CONFIG_FILE_NAME: &str = "keepsync.toml";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{suggestion}'?)")?;
        }
        Ok(())
    }
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> KeepsyncResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path).map_err(|e| KeepsyncError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| KeepsyncError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Config file to use: `keepsync.toml` in `cwd`, else the user config
pub fn discover(cwd: &Path) -> Option<PathBuf> {
    let project = cwd.join(CONFIG_FILE_NAME);
    if project.is_file() {
        return Some(project);
    }

    let user = dirs::config_dir()?.join("keepsync").join("config.toml");
    user.is_file().then_some(user)
}

/// Load the explicit file, or the discovered one, or defaults; then apply
/// environment overrides.
pub fn load_layered(
    explicit: Option<&Path>,
    cwd: &Path,
) -> KeepsyncResult<(Config, Vec<ConfigWarning>)> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => discover(cwd),
    };

    let (config, warnings) = match path {
        Some(path) => {
            debug!(config = %path.display(), "loading configuration");
            load_with_warnings(&path)?
        }
        None => (Config::default(), Vec::new()),
    };

    Ok((with_env_overrides(config), warnings))
}

/// Apply environment variable overrides (KEEPSYNC_* prefix)
pub fn with_env_overrides(config: Config) -> Config {
    with_overrides_from(config, |key| std::env::var(key).ok())
}

pub(crate) fn with_overrides_from(
    mut config: Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Config {
    // KEEPSYNC_CONCURRENCY
    if let Some(value) = lookup("KEEPSYNC_CONCURRENCY") {
        match value.trim().parse::<usize>() {
            Ok(n) if n > 0 => config.sync.concurrency = n,
            _ => debug!(value = %value, "ignoring invalid KEEPSYNC_CONCURRENCY"),
        }
    }

    // KEEPSYNC_DESTINATION
    if let Some(value) = lookup("KEEPSYNC_DESTINATION") {
        if !value.trim().is_empty() {
            config.destination = Some(PathBuf::from(value));
        }
    }

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "destination",
        "source",
        "provider",
        "repo",
        "ref",
        "path",
        "copy",
        "include",
        "exclude",
        "ignore",
        "archive",
        "enabled",
        "name",
        "sync",
        "concurrency",
        "clean",
    ];

    CANDIDATES
        .iter()
        .map(|c| (*c, levenshtein(unknown, c)))
        .min_by_key(|(_, dist)| *dist)
        .filter(|(_, dist)| *dist <= 2)
        .map(|(c, _)| c.to_string())
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = usize::from(ac != bc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
