//! TOML-based application configuration.
//!
//! Stored at `~/.config/linguaverse/config.toml`. Every key is optional:
//!
//! ```text
//! data_dir = "/home/me/.local/share/linguaverse"
//!
//! [profile]
//! username = "Operative"
//! max_hearts = 5
//!
//! [review]
//! batch_size = 10
//! pass_grade = 4
//! encounter_grade = 4
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::progress::{GlobalProfile, LessonPolicy, DEFAULT_MAX_HEARTS};
use crate::srs::{Grade, DEFAULT_REVIEW_BATCH_SIZE};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Learner profile defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_max_hearts")]
    pub max_hearts: u32,
}

/// Review scheduling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Items pinned per review session
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Grade for every word of a passed review session
    #[serde(default = "default_grade")]
    pub pass_grade: i32,
    /// Grade when a lesson re-teaches a known word
    #[serde(default = "default_grade")]
    pub encounter_grade: i32,
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub review: ReviewConfig,
}

fn default_username() -> String {
    "Operative".to_string()
}
fn default_max_hearts() -> u32 {
    DEFAULT_MAX_HEARTS
}
fn default_batch_size() -> usize {
    DEFAULT_REVIEW_BATCH_SIZE
}
fn default_grade() -> i32 {
    Grade::GOOD.into()
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            max_hearts: default_max_hearts(),
        }
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            pass_grade: default_grade(),
            encounter_grade: default_grade(),
        }
    }
}

impl AppConfig {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("linguaverse").join("config.toml"))
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Reject values the scheduler cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.review.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "review.batch_size must be at least 1".to_string(),
            ));
        }
        self.pass_grade()?;
        self.lesson_policy()?;
        Ok(())
    }

    pub fn pass_grade(&self) -> Result<Grade, ConfigError> {
        Grade::new(self.review.pass_grade)
            .map_err(|e| ConfigError::Invalid(format!("review.pass_grade: {}", e)))
    }

    pub fn lesson_policy(&self) -> Result<LessonPolicy, ConfigError> {
        let encounter_grade = Grade::new(self.review.encounter_grade)
            .map_err(|e| ConfigError::Invalid(format!("review.encounter_grade: {}", e)))?;
        Ok(LessonPolicy {
            max_hearts: self.profile.max_hearts,
            encounter_grade,
        })
    }

    /// Profile for a learner with no saved state
    pub fn default_profile(&self) -> GlobalProfile {
        GlobalProfile {
            username: self.profile.username.clone(),
            hearts: self.profile.max_hearts,
            ..GlobalProfile::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::load(&temp.path().join("config.toml")).unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.review.batch_size, 10);
        assert_eq!(config.pass_grade().unwrap(), Grade::GOOD);
        assert_eq!(config.lesson_policy().unwrap(), LessonPolicy::default());
    }

    #[test]
    fn test_partial_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[review]\nbatch_size = 5\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.review.batch_size, 5);
        assert_eq!(config.review.pass_grade, 4);
        assert_eq!(config.profile.username, "Operative");
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_invalid_grade_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[review]\npass_grade = 7\n").unwrap();

        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_batch_rejected() {
        let config = AppConfig {
            review: ReviewConfig {
                batch_size: 0,
                ..ReviewConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.data_dir = Some(temp.path().join("data"));
        config.profile.username = "Neo".to_string();
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.default_profile().username, "Neo");
    }
}
