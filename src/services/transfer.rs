//! Asset file transfer and mod packaging.
//!
//! [`copy_one`] copies a single file with crash-safe replace semantics: an
//! existing destination is staged as `<name>.old`, deleted after a successful
//! copy and restored after a failed one. Expected failures are reported as
//! [`CopyOutcome`] values, never as errors, so [`copy_many`] can continue past
//! individual files.
//!
//! [`pack`] zips a whole project mod directory, preserving paths relative to the
//! mod root.

use crate::errors::{ModError, Result};
use crate::services::classifier::is_project_mod_directory;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::{self, File};
use std::io;
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Result of one file-copy attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOutcome {
    pub success: bool,
    pub source: Utf8PathBuf,
    pub destination: Utf8PathBuf,
    pub message: String,
}

impl CopyOutcome {
    fn ok(source: Utf8PathBuf, destination: Utf8PathBuf) -> Self {
        let message = format!("Successfully copied {} to {}.", source, destination);
        Self {
            success: true,
            source,
            destination,
            message,
        }
    }

    fn failed(source: Utf8PathBuf, destination: Utf8PathBuf, message: String) -> Self {
        tracing::warn!("{}", message);
        Self {
            success: false,
            source,
            destination,
            message,
        }
    }

    /// Escalate a failed outcome into a [`ModError::CopyAsset`]
    pub fn into_result(self) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(ModError::CopyAsset(self.message))
        }
    }
}

/// The raw byte copy step, separated so failures can be injected.
#[cfg_attr(test, mockall::automock)]
pub trait FileCopier {
    fn copy_file(&self, source: &Utf8Path, destination: &Utf8Path) -> io::Result<()>;
}

/// [`FileCopier`] backed by [`std::fs::copy`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StdCopier;

impl FileCopier for StdCopier {
    fn copy_file(&self, source: &Utf8Path, destination: &Utf8Path) -> io::Result<()> {
        fs::copy(source, destination).map(|_| ())
    }
}

/// Backup name used while replacing `destination`
pub fn staged_backup_path(destination: &Utf8Path) -> Utf8PathBuf {
    let name = destination.file_name().unwrap_or_default();
    destination.with_file_name(format!("{name}.old"))
}

/// Copy `src_dir/filename` to `dest_dir/filename`.
pub fn copy_one(src_dir: &Utf8Path, dest_dir: &Utf8Path, filename: &str, replace: bool) -> CopyOutcome {
    copy_one_with(&StdCopier, src_dir, dest_dir, filename, replace)
}

/// [`copy_one`] with an explicit copy step.
pub fn copy_one_with(
    copier: &dyn FileCopier,
    src_dir: &Utf8Path,
    dest_dir: &Utf8Path,
    filename: &str,
    replace: bool,
) -> CopyOutcome {
    let source = src_dir.join(filename);
    let destination = dest_dir.join(filename);
    let backup = staged_backup_path(&destination);

    if !source.exists() {
        let message = format!("Source file {} does not exist", source);
        return CopyOutcome::failed(source, destination, message);
    }

    let mut staged = false;
    if destination.exists() {
        if !replace {
            let message = format!(
                "Destination file {} already exists. Use the replace option to overwrite.",
                destination
            );
            return CopyOutcome::failed(source, destination, message);
        }

        if let Err(e) = fs::rename(&destination, &backup) {
            let message = format!("Failed to stage {} for replacement: {}", destination, e);
            return CopyOutcome::failed(source, destination, message);
        }
        staged = true;
    }

    if let Err(e) = fs::create_dir_all(dest_dir) {
        restore_backup(&destination, &backup, staged);
        let message = format!("Failed to create destination directory {}: {}", dest_dir, e);
        return CopyOutcome::failed(source, destination, message);
    }

    match copier.copy_file(&source, &destination) {
        Ok(()) => {
            if staged {
                if let Err(e) = fs::remove_file(&backup) {
                    tracing::warn!("Failed to remove backup {}: {}", backup, e);
                }
            }
            tracing::debug!("Copied {} to {}", source, destination);
            CopyOutcome::ok(source, destination)
        }
        Err(e) => {
            restore_backup(&destination, &backup, staged);
            let message = format!("Failed to copy {} to {}: {}", source, destination, e);
            CopyOutcome::failed(source, destination, message)
        }
    }
}

/// Put the staged backup back in place of a missing or half-written destination
fn restore_backup(destination: &Utf8Path, backup: &Utf8Path, staged: bool) {
    if !staged {
        return;
    }

    if destination.exists() {
        if let Err(e) = fs::remove_file(destination) {
            tracing::error!("Failed to remove partial copy {}: {}", destination, e);
        }
    }
    if let Err(e) = fs::rename(backup, destination) {
        tracing::error!("Failed to restore {} from {}: {}", destination, backup, e);
    }
}

/// Copy each source file into `dest_dir`, lazily, one outcome per input in order.
pub fn copy_many<'a, I>(sources: I, dest_dir: &'a Utf8Path, replace: bool) -> impl Iterator<Item = CopyOutcome> + 'a
where
    I: IntoIterator<Item = Utf8PathBuf>,
    I::IntoIter: 'a,
{
    sources.into_iter().map(move |source| {
        let filename = source.file_name().unwrap_or_default().to_string();
        let src_dir = source.parent().unwrap_or(Utf8Path::new(""));
        copy_one(src_dir, dest_dir, &filename, replace)
    })
}

/// Zip every file under `mod_dir` into `dest_dir/zip_file_name`.
///
/// Entry names are relative to `mod_dir` with `/` separators.
///
/// # Errors
/// [`ModError::InvalidProjectModDirectory`] if `mod_dir` is not a project mod
/// directory; no zip file is created in that case.
pub fn pack(mod_dir: &Utf8Path, dest_dir: &Utf8Path, zip_file_name: &str) -> Result<Utf8PathBuf> {
    if !is_project_mod_directory(mod_dir)? {
        return Err(ModError::InvalidProjectModDirectory(format!(
            "Directory is not project mods directory: {}",
            mod_dir
        )));
    }

    fs::create_dir_all(dest_dir)?;
    let zip_path = dest_dir.join(zip_file_name);

    let result = write_archive(mod_dir, &zip_path);
    match result {
        Ok(entries) => {
            tracing::info!("Packed {} files from {} into {}", entries, mod_dir, zip_path);
            Ok(zip_path)
        }
        Err(e) => {
            let _ = fs::remove_file(&zip_path);
            Err(e)
        }
    }
}

fn write_archive(mod_dir: &Utf8Path, zip_path: &Utf8Path) -> Result<usize> {
    let file = File::create(zip_path)?;
    let mut zip = ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut entries = 0usize;
    for entry in WalkDir::new(mod_dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() || entry.path() == zip_path.as_std_path() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(mod_dir)
            .map_err(|e| ModError::Validation(e.to_string()))?;
        let archive_name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        zip.start_file(archive_name, options)?;
        let mut source = File::open(entry.path())?;
        io::copy(&mut source, &mut zip)?;
        entries += 1;
    }

    zip.finish()?;
    Ok(entries)
}
