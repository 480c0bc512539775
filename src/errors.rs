//! Error taxonomy for the mod engine.
//!
//! Directory and precondition failures are raised immediately as [`ModError`].
//! Expected per-file copy failures are *not* errors: they are reported as
//! [`CopyOutcome`](crate::services::transfer::CopyOutcome) values so a batch can
//! continue past them.

use camino::Utf8PathBuf;
use thiserror::Error;

const DATABASE_DIRECTORY_INFO: &str = "The directory does not contain any valid *.name file.";
const PROJECT_MOD_DIRECTORY_INFO: &str =
    "The directory does not contain a valid METADATA.json file and modfiles subdirectory.";
const GAME_DATA_DIRECTORY_INFO: &str =
    "The directory is not a valid game data directory (either Project mods or DSDB).";

/// Errors raised by the scanning, metadata and packaging engine.
#[derive(Error, Debug)]
pub enum ModError {
    #[error("Invalid directory path: {0}")]
    InvalidDirectoryPath(Utf8PathBuf),

    #[error("{0}. {info}", info = DATABASE_DIRECTORY_INFO)]
    InvalidDatabaseDirectory(String),

    #[error("{0}. {info}", info = PROJECT_MOD_DIRECTORY_INFO)]
    InvalidProjectModDirectory(String),

    #[error("{0}. {info}", info = GAME_DATA_DIRECTORY_INFO)]
    InvalidGameDataDirectory(String),

    /// A metadata mutator rejected its input
    #[error("{0}")]
    EditMetadata(String),

    /// Project creation rejected its input
    #[error("{0}")]
    CreateProject(String),

    /// Raised only by callers that choose to escalate a failed [`CopyOutcome`](crate::services::transfer::CopyOutcome)
    #[error("{0}")]
    CopyAsset(String),

    /// A named GUI widget could not be found
    #[error("Cannot find widget {0}")]
    WidgetNotFound(String),

    #[error("File does not exist: {0}")]
    FileNotFound(Utf8PathBuf),

    #[error("{0}")]
    Validation(String),

    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result alias for the library surface.
pub type Result<T> = std::result::Result<T, ModError>;
