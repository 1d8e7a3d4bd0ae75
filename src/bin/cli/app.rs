use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use linguaverse_lib::config::AppConfig;
use linguaverse_lib::progress::{LessonPolicy, ProgressStorage, UserProgress};
use linguaverse_lib::srs::Grade;

/// Shared application state for CLI commands
pub struct App {
    pub config: AppConfig,
    pub storage: ProgressStorage,
}

impl App {
    /// Load config and open the learner's store
    ///
    /// `--data-dir` wins over the config file, which wins over the platform default.
    pub fn new(config_path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path.to_path_buf(),
            None => AppConfig::default_path().context("Failed to get config directory")?,
        };
        let config = AppConfig::load(&config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

        let data_dir = match data_dir.or_else(|| config.data_dir.clone()) {
            Some(dir) => dir,
            None => ProgressStorage::default_data_dir().context("Failed to get data directory")?,
        };

        let storage = ProgressStorage::new(data_dir).with_default_profile(config.default_profile());
        storage.init().context("Failed to initialize progress storage")?;

        Ok(Self { config, storage })
    }

    /// Progress for the active course
    pub fn progress(&self) -> Result<UserProgress> {
        self.storage
            .require_progress()
            .context("Failed to load progress (run `linguaverse-cli use <course>` first)")
    }

    pub fn lesson_policy(&self) -> Result<LessonPolicy> {
        self.config.lesson_policy().context("Invalid lesson settings")
    }

    pub fn pass_grade(&self) -> Result<Grade> {
        self.config.pass_grade().context("Invalid review settings")
    }
}
