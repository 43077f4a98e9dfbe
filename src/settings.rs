use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use tracing::warn;

const MIN_TICK_INTERVAL_MS: u64 = 15;
const MAX_TICK_INTERVAL_MS: u64 = 250;
const DEFAULT_TICK_INTERVAL_MS: u64 = 33;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Animation frame cadence. Timelines are sampled per tick, so this only
    /// affects smoothness, never the end state.
    pub tick_interval_ms: u64,
    /// Jump every animation straight to its end value.
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            reduced_motion: false,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("taskpulse");
        path.push("settings.toml");
        Some(path)
    }

    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(mut settings) => {
                    settings.validate();
                    settings
                }
                Err(error) => {
                    warn!(
                        "failed to parse settings config '{}': {}",
                        path.display(),
                        error
                    );
                    Self::default()
                }
            },
            Err(error) => {
                warn!(
                    "failed to read settings config '{}': {}",
                    path.display(),
                    error
                );
                Self::default()
            }
        }
    }

    pub fn save_to_path(&self, path: &Path) -> anyhow::Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow!("invalid settings config path"))?;
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory '{}'", parent.display()))?;

        let mut validated = self.clone();
        validated.validate();
        let contents =
            toml::to_string_pretty(&validated).context("failed to serialize settings to TOML")?;

        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow!("invalid settings config file name"))?
            .to_string_lossy()
            .to_string();
        let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));

        fs::write(&tmp_path, contents).with_context(|| {
            format!(
                "failed to write temporary settings file '{}'",
                tmp_path.display()
            )
        })?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "failed to atomically rename settings file '{}' to '{}'",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }

    fn validate(&mut self) {
        let clamped = self
            .tick_interval_ms
            .clamp(MIN_TICK_INTERVAL_MS, MAX_TICK_INTERVAL_MS);
        if clamped != self.tick_interval_ms {
            warn!(
                "tick_interval_ms {} outside {}..={}; clamping",
                self.tick_interval_ms, MIN_TICK_INTERVAL_MS, MAX_TICK_INTERVAL_MS
            );
            self.tick_interval_ms = clamped;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEMP_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

    struct TempDir {
        path: PathBuf,
    }

    impl TempDir {
        fn new() -> Self {
            let mut path = std::env::temp_dir();
            let timestamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("system time should be after unix epoch")
                .as_nanos();
            let id = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
            path.push(format!("taskpulse-settings-test-{timestamp}-{id}"));
            fs::create_dir_all(&path).expect("failed to create temp dir");
            Self { path }
        }

        fn path(&self) -> &Path {
            &self.path
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.path);
        }
    }

    fn settings_file_path(temp_dir: &TempDir) -> PathBuf {
        temp_dir.path().join("taskpulse").join("settings.toml")
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.tick_interval_ms, 33);
        assert!(!settings.reduced_motion);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new();
        let path = settings_file_path(&temp_dir);
        let settings = Settings::load_from_path(&path);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_malformed_toml() {
        let temp_dir = TempDir::new();
        let path = settings_file_path(&temp_dir);
        fs::create_dir_all(path.parent().expect("settings path should have parent"))
            .expect("failed to create config dir");
        fs::write(&path, "tick_interval_ms = [invalid")
            .expect("failed to write malformed settings");

        let settings = Settings::load_from_path(&path);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_partial_toml() {
        let temp_dir = TempDir::new();
        let path = settings_file_path(&temp_dir);
        fs::create_dir_all(path.parent().expect("settings path should have parent"))
            .expect("failed to create config dir");
        fs::write(&path, "reduced_motion = true").expect("failed to write partial settings");

        let settings = Settings::load_from_path(&path);
        assert!(settings.reduced_motion);
        assert_eq!(settings.tick_interval_ms, DEFAULT_TICK_INTERVAL_MS);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new();
        let path = settings_file_path(&temp_dir);
        let expected = Settings {
            tick_interval_ms: 50,
            reduced_motion: true,
        };

        expected
            .save_to_path(&path)
            .expect("failed to save settings for roundtrip test");
        let loaded = Settings::load_from_path(&path);

        assert_eq!(loaded, expected);
    }

    #[test]
    fn test_validate_clamps_tick_interval() {
        let temp_dir = TempDir::new();
        let path = settings_file_path(&temp_dir);

        let settings = Settings {
            tick_interval_ms: 1,
            reduced_motion: false,
        };
        settings
            .save_to_path(&path)
            .expect("failed to save settings");
        assert_eq!(
            Settings::load_from_path(&path).tick_interval_ms,
            MIN_TICK_INTERVAL_MS
        );

        let settings = Settings {
            tick_interval_ms: u64::MAX,
            reduced_motion: false,
        };
        settings
            .save_to_path(&path)
            .expect("failed to save settings");
        assert_eq!(
            Settings::load_from_path(&path).tick_interval_ms,
            MAX_TICK_INTERVAL_MS
        );
    }

    #[test]
    fn test_atomic_write_creates_dirs() {
        let temp_dir = TempDir::new();
        let path = settings_file_path(&temp_dir);

        Settings::default()
            .save_to_path(&path)
            .expect("failed to save settings to nested path");

        assert!(path.exists());
        assert!(
            path.parent()
                .expect("settings path should have parent")
                .exists()
        );
    }
}
