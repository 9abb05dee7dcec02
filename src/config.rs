use anyhow::{Context, Result};
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

/// Environment variable naming an alternative configuration file.
pub const CONFIG_ENV: &str = "S3_CONFIG";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub prompt: PromptConfig,
}

/// Explicit limits replacing fixed-size buffers.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of tokens kept per command; the rest are dropped.
    pub max_args: usize,
    /// Maximum number of `;` segments in a line and `|` stages in a pipeline.
    pub max_segments: usize,
    /// Longest path remembered as the previous directory.
    pub max_dir_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_args: 128,
            max_segments: 64,
            max_dir_len: 4096,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PromptConfig {
    /// Prompt shown when the working directory cannot be read.
    pub fallback: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            fallback: "[s3]$ ".to_owned(),
        }
    }
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigOverlay {
    #[serde(default)]
    limits: LimitsOverlay,
    #[serde(default)]
    prompt: PromptOverlay,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct LimitsOverlay {
    max_args: Option<usize>,
    max_segments: Option<usize>,
    max_dir_len: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PromptOverlay {
    fallback: Option<String>,
}

impl Config {
    /// Parse the embedded defaults.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|e| {
            log::error!("embedded default config is invalid: {e}");
            Config::default()
        })
    }

    /// Defaults with the user's file merged on top, if there is one.
    ///
    /// A missing file is not an error. A file that cannot be read or parsed is
    /// reported as a warning and the defaults are used.
    pub fn load() -> Self {
        Self::load_or_default(user_config_path().as_deref())
    }

    fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default_config();
        };
        Self::load_from(path).unwrap_or_else(|e| {
            log::warn!("{e:#}; using defaults");
            Self::default_config()
        })
    }

    /// Defaults with the file at `path` merged on top.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::default_config();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        config
            .apply_overlay(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Merge a TOML overlay into this config. Unset keys keep their current value.
    pub fn apply_overlay(&mut self, text: &str) -> Result<()> {
        let overlay: ConfigOverlay = toml::from_str(text)?;
        let limits = overlay.limits;
        if let Some(v) = limits.max_args {
            self.limits.max_args = v;
        }
        if let Some(v) = limits.max_segments {
            self.limits.max_segments = v;
        }
        if let Some(v) = limits.max_dir_len {
            self.limits.max_dir_len = v;
        }
        if let Some(v) = overlay.prompt.fallback {
            self.prompt.fallback = v;
        }
        Ok(())
    }
}

fn user_config_path() -> Option<PathBuf> {
    config_path_from(std::env::var_os(CONFIG_ENV), std::env::var_os("HOME"))
}

fn config_path_from(explicit: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(PathBuf::from(path));
    }
    let path = Path::new(&home?).join(".config/s3/config.toml");
    path.is_file().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_match_builtin_defaults() {
        assert_eq!(Config::default_config(), Config::default());
    }

    #[test]
    fn overlay_changes_only_given_keys() {
        let mut config = Config::default_config();
        config
            .apply_overlay("[limits]\nmax_args = 8\n")
            .unwrap();
        assert_eq!(config.limits.max_args, 8);
        assert_eq!(config.limits.max_segments, 64);
        assert_eq!(config.prompt.fallback, "[s3]$ ");
    }

    #[test]
    fn overlay_sets_prompt() {
        let mut config = Config::default_config();
        config.apply_overlay("[prompt]\nfallback = \"$ \"\n").unwrap();
        assert_eq!(config.prompt.fallback, "$ ");
    }

    #[test]
    fn overlay_rejects_unknown_keys() {
        let mut config = Config::default_config();
        assert!(config.apply_overlay("[limits]\nmax_lines = 3\n").is_err());
        assert_eq!(config, Config::default_config());
    }

    #[test]
    fn empty_overlay_is_a_no_op() {
        let mut config = Config::default_config();
        config.apply_overlay("").unwrap();
        assert_eq!(config, Config::default());
    }

    fn write_config(dir: &Path, text: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn load_overlays_user_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[limits]\nmax_segments = 2\n");
        let config = Config::load_or_default(Some(&path));
        assert_eq!(config.limits.max_segments, 2);
        assert_eq!(config.limits.max_args, 128);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[limits\nmax_args = ");
        assert!(Config::load_from(&path).is_err());
        assert_eq!(Config::load_or_default(Some(&path)), Config::default_config());
    }

    #[test]
    fn unreadable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert_eq!(Config::load_or_default(Some(&path)), Config::default_config());
        assert_eq!(Config::load_or_default(None), Config::default_config());
    }

    #[test]
    fn missing_home_config_is_not_an_error() {
        let home = tempfile::tempdir().unwrap();
        assert_eq!(config_path_from(None, Some(home.path().into())), None);
        assert_eq!(config_path_from(None, None), None);
    }

    #[test]
    fn home_config_is_found() {
        let home = tempfile::tempdir().unwrap();
        let dir = home.path().join(".config/s3");
        std::fs::create_dir_all(&dir).unwrap();
        let path = write_config(&dir, "");
        assert_eq!(config_path_from(None, Some(home.path().into())), Some(path));
    }

    #[test]
    fn explicit_path_wins_over_home() {
        let home = tempfile::tempdir().unwrap();
        assert_eq!(
            config_path_from(Some("/dev/null".into()), Some(home.path().into())),
            Some(PathBuf::from("/dev/null"))
        );
    }
}
