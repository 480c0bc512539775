//! Directory classification predicates.
//!
//! Both predicates require `path` to be an existing directory and fail with
//! [`ModError::InvalidDirectoryPath`] otherwise.

use crate::errors::{ModError, Result};
use crate::models::{DESCRIPTION_FILE, METADATA_FILE, MODFILES_DIR, is_name_marker};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// A database directory must hold strictly more than this many name-marker files.
pub const DATABASE_NAME_FILE_THRESHOLD: usize = 2;

/// Fail unless `path` exists and is a directory
pub fn validate_directory(path: &Utf8Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ModError::InvalidDirectoryPath(path.to_path_buf()))
    }
}

/// True iff `path` directly contains more than two `.name` files.
pub fn is_asset_database_directory(path: &Utf8Path) -> Result<bool> {
    validate_directory(path)?;

    let mut found = 0usize;
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };

        if is_name_marker(file_name) {
            found += 1;
            if found > DATABASE_NAME_FILE_THRESHOLD {
                return Ok(true);
            }
        }
    }

    Ok(false)
}

/// True iff `modfiles/`, `METADATA.json` and `DESCRIPTION.html` all exist directly under `path`.
pub fn is_project_mod_directory(path: &Utf8Path) -> Result<bool> {
    validate_directory(path)?;

    Ok(path.join(MODFILES_DIR).exists()
        && path.join(METADATA_FILE).exists()
        && path.join(DESCRIPTION_FILE).exists())
}

/// Project mod directories directly under `root`, sorted by name.
pub fn list_project_mods(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    validate_directory(root)?;

    let mut mods = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let path = Utf8PathBuf::try_from(entry.path())
            .map_err(|e| ModError::NonUtf8Path(e.into_path_buf().display().to_string()))?;
        if is_project_mod_directory(&path)? {
            mods.push(path);
        }
    }

    mods.sort();
    tracing::debug!("Found {} project mods under {}", mods.len(), root);
    Ok(mods)
}
