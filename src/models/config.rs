use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// Name of the application directory under the user's Documents folder.
pub const APP_DIR_NAME: &str = "DigiSModEditor";

/// User configuration from `DigiSModEditor Settings.yaml`.
///
/// Contains the directories the editor works with and the scan cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    /// Source asset database last opened by the user
    #[serde(default)]
    pub database_dir: Option<Utf8PathBuf>,

    #[serde(default = "default_project_mods_dir")]
    pub project_mods_dir: Utf8PathBuf,

    #[serde(default = "default_packed_mods_dir")]
    pub packed_mods_dir: Utf8PathBuf,

    #[serde(default = "default_log_dir")]
    pub log_dir: Utf8PathBuf,

    /// Minimum seconds between two scans of the same directory
    #[serde(default = "default_rescan_cooldown_secs")]
    pub rescan_cooldown_secs: u64,

    /// Cadence at which the UI drains one queued asset group
    #[serde(default = "default_queue_poll_interval_ms")]
    pub queue_poll_interval_ms: u64,

    /// Overwrite existing files when transferring assets
    #[serde(default = "default_replace_existing")]
    pub replace_existing: bool,

    #[serde(default)]
    pub debug_mode: bool,
}

impl UserConfig {
    /// Derive the default directory layout from an application directory
    pub fn with_app_dir(app_dir: &Utf8Path) -> Self {
        Self {
            project_mods_dir: app_dir.join("ProjectMods"),
            packed_mods_dir: app_dir.join("PackedMods"),
            log_dir: app_dir.join("Logs"),
            ..Self::default()
        }
    }
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            database_dir: None,
            project_mods_dir: default_project_mods_dir(),
            packed_mods_dir: default_packed_mods_dir(),
            log_dir: default_log_dir(),
            rescan_cooldown_secs: default_rescan_cooldown_secs(),
            queue_poll_interval_ms: default_queue_poll_interval_ms(),
            replace_existing: default_replace_existing(),
            debug_mode: false,
        }
    }
}

/// `<home>/Documents/DigiSModEditor`, falling back to a relative directory
/// when no home directory is known.
pub fn default_app_dir() -> Utf8PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(|home| Utf8PathBuf::from(home).join("Documents").join(APP_DIR_NAME))
        .unwrap_or_else(|_| Utf8PathBuf::from(APP_DIR_NAME))
}

fn default_project_mods_dir() -> Utf8PathBuf {
    default_app_dir().join("ProjectMods")
}

fn default_packed_mods_dir() -> Utf8PathBuf {
    default_app_dir().join("PackedMods")
}

fn default_log_dir() -> Utf8PathBuf {
    default_app_dir().join("Logs")
}

fn default_rescan_cooldown_secs() -> u64 {
    120
}

fn default_queue_poll_interval_ms() -> u64 {
    50
}

fn default_replace_existing() -> bool {
    true
}
