use crate::models::UserConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use ::config::{Config, Environment, File, FileFormat};
use std::fs;

/// File name of the user settings inside the configuration directory.
pub const SETTINGS_FILE: &str = "DigiSModEditor Settings.yaml";

/// Prefix of environment variables that override settings (e.g. `DIGISMOD_DEBUG_MODE=true`).
pub const ENV_PREFIX: &str = "DIGISMOD";

/// Configuration manager for loading and saving the user settings file.
///
/// Settings are layered: values from `DigiSModEditor Settings.yaml` first, then
/// `DIGISMOD_*` environment variables on top. Missing keys fall back to
/// [`UserConfig`] defaults.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    user_config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing the settings file (e.g. `~/Documents/DigiSModEditor`)
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            user_config_path: config_dir.join(SETTINGS_FILE),
            config_dir,
        })
    }

    /// Load the user configuration with environment overrides.
    ///
    /// # Returns
    /// The loaded UserConfig, or defaults if the file doesn't exist
    pub fn load_user_config(&self) -> Result<UserConfig> {
        self.load_user_config_with(Environment::with_prefix(ENV_PREFIX))
    }

    /// Load the user configuration layering an explicit environment source.
    pub fn load_user_config_with(&self, environment: Environment) -> Result<UserConfig> {
        if !self.user_config_path.exists() {
            tracing::warn!(
                "User config file not found at {}, using defaults",
                self.user_config_path
            );
        }

        let settings = Config::builder()
            .add_source(
                File::with_name(self.user_config_path.as_str())
                    .format(FileFormat::Yaml)
                    .required(false),
            )
            .add_source(environment.try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read user config: {}", self.user_config_path))?;

        let config: UserConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse user config: {}", self.user_config_path))?;

        tracing::info!("Loaded user config from {}", self.user_config_path);
        Ok(config)
    }

    /// Save the user configuration file.
    ///
    /// # Arguments
    /// * `config` - The UserConfig to save
    pub fn save_user_config(&self, config: &UserConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize user config to YAML")?;

        fs::write(&self.user_config_path, yaml_string)
            .with_context(|| format!("Failed to write user config: {}", self.user_config_path))?;

        tracing::info!("Saved user config to {}", self.user_config_path);
        Ok(())
    }

    /// Create the project-mods, packed-mods and log directories of a configuration.
    pub fn ensure_directories(&self, config: &UserConfig) -> Result<()> {
        for dir in [
            &config.project_mods_dir,
            &config.packed_mods_dir,
            &config.log_dir,
        ] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir))?;
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Get the settings file path.
    pub fn user_config_path(&self) -> &Utf8Path {
        &self.user_config_path
    }
}
