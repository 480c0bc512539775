//! Project mod metadata store.
//!
//! A project mod directory holds `modfiles/`, `METADATA.json`
//! (`{"author", "version": [major, minor], "category"}`) and `DESCRIPTION.html`.
//! [`ProjectMod`] is a loaded mod with dirty tracking: setters validate their
//! input and mark the mod dirty only when the value actually changes, and
//! [`ProjectMod::save`] writes both files only when dirty.
//!
//! Writes are not transactional. A failure between writing the metadata and the
//! description leaves the pair inconsistent.

use crate::errors::{ModError, Result};
use crate::models::{DESCRIPTION_FILE, METADATA_FILE, MODFILES_DIR, ModMetadata, ModVersion};
use crate::services::classifier::{is_project_mod_directory, validate_directory};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Create `<dir>/<project_name>/modfiles/`. Idempotent.
///
/// # Returns
/// The project directory `<dir>/<project_name>`
pub fn create_project_structure(project_name: &str, dir: &Utf8Path) -> Result<Utf8PathBuf> {
    if project_name.is_empty() {
        return Err(ModError::Validation("Project name cannot be empty".to_string()));
    }

    let project_dir = dir.join(project_name);
    fs::create_dir_all(project_dir.join(MODFILES_DIR))?;
    Ok(project_dir)
}

/// Write `METADATA.json` into `project_dir`
pub fn write_metadata(metadata: &ModMetadata, project_dir: &Utf8Path) -> Result<()> {
    let json = serde_json::to_string(metadata)?;
    fs::write(project_dir.join(METADATA_FILE), json)?;
    Ok(())
}

/// Read a `METADATA.json` file
pub fn read_metadata(metadata_file: &Utf8Path) -> Result<ModMetadata> {
    if !metadata_file.exists() {
        return Err(ModError::FileNotFound(metadata_file.to_path_buf()));
    }

    let contents = fs::read_to_string(metadata_file)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Write `DESCRIPTION.html` into `project_dir`
pub fn write_description(description: &str, project_dir: &Utf8Path) -> Result<()> {
    fs::write(project_dir.join(DESCRIPTION_FILE), description)?;
    Ok(())
}

/// Read a `DESCRIPTION.html` file
pub fn read_description(description_file: &Utf8Path) -> Result<String> {
    if !description_file.exists() {
        return Err(ModError::FileNotFound(description_file.to_path_buf()));
    }

    Ok(fs::read_to_string(description_file)?)
}

/// Create a project mod under `dir` and write its metadata and description.
///
/// Safe to call when the project's subfolders already exist.
pub fn create_project_mod(
    dir: &Utf8Path,
    project_name: &str,
    author: &str,
    version: ModVersion,
    category: &str,
    description: &str,
) -> Result<Utf8PathBuf> {
    validate_directory(dir)?;

    let project_dir = create_project_structure(project_name, dir)?;
    tracing::info!("Project mods folder created: {}", project_dir);

    let metadata = ModMetadata {
        name: Some(project_name.to_string()),
        ..ModMetadata::new(author, version, category)
    };
    write_metadata(&metadata, &project_dir)?;
    write_description(description, &project_dir)?;

    Ok(project_dir)
}

/// Validate the project-creation form, then create the project mod.
///
/// # Errors
/// [`ModError::CreateProject`] if the title or author is empty, the version is
/// below 0.1 or has a negative component, or `<dir>/<title>` already exists.
pub fn create_new_project(
    dir: &Utf8Path,
    title: &str,
    author: &str,
    version: ModVersion,
    category: &str,
    description: &str,
) -> Result<Utf8PathBuf> {
    if title.trim().is_empty() {
        return Err(ModError::CreateProject("Title cannot be empty".to_string()));
    }
    if author.trim().is_empty() {
        return Err(ModError::CreateProject("Author cannot be empty".to_string()));
    }
    if version < ModVersion::MINIMUM || !version.is_non_negative() {
        return Err(ModError::CreateProject(format!(
            "Version must be at least {}",
            ModVersion::MINIMUM
        )));
    }
    if dir.join(title).exists() {
        return Err(ModError::CreateProject(format!(
            "Project mods already exists: {}",
            dir.join(title)
        )));
    }

    create_project_mod(dir, title, author, version, category, description)
}

/// A loaded project mod with dirty tracking.
#[derive(Debug, Clone)]
pub struct ProjectMod {
    root: Utf8PathBuf,
    metadata: ModMetadata,
    description: String,
    dirty: bool,
}

impl ProjectMod {
    /// Load a project mod directory.
    ///
    /// # Errors
    /// [`ModError::InvalidProjectModDirectory`] if the layout is incomplete, or
    /// the underlying read errors.
    pub fn load(root: &Utf8Path) -> Result<Self> {
        if !is_project_mod_directory(root)? {
            return Err(ModError::InvalidProjectModDirectory(format!(
                "Directory is not project mods directory: {}",
                root
            )));
        }

        let metadata = read_metadata(&root.join(METADATA_FILE))?;
        let description = read_description(&root.join(DESCRIPTION_FILE))?;

        tracing::debug!(
            "Loaded project mod {} (author={}, version={})",
            root,
            metadata.author,
            metadata.version
        );

        Ok(Self {
            root: root.to_path_buf(),
            metadata,
            description,
            dirty: false,
        })
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Directory holding the mod's asset files
    pub fn modfiles_dir(&self) -> Utf8PathBuf {
        self.root.join(MODFILES_DIR)
    }

    /// Project title: the stored name, or the directory name
    pub fn title(&self) -> &str {
        self.metadata
            .name
            .as_deref()
            .or_else(|| self.root.file_name())
            .unwrap_or_default()
    }

    pub fn metadata(&self) -> &ModMetadata {
        &self.metadata
    }

    pub fn author(&self) -> &str {
        &self.metadata.author
    }

    pub fn version(&self) -> ModVersion {
        self.metadata.version
    }

    pub fn category(&self) -> &str {
        &self.metadata.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_author(&mut self, author: &str) -> Result<()> {
        if author.is_empty() {
            return Err(ModError::EditMetadata("Author cannot be empty".to_string()));
        }
        if self.metadata.author != author {
            self.metadata.author = author.to_string();
            self.dirty = true;
        }
        Ok(())
    }

    pub fn set_category(&mut self, category: &str) -> Result<()> {
        if category.is_empty() {
            return Err(ModError::EditMetadata("Category cannot be empty".to_string()));
        }
        if self.metadata.category != category {
            self.metadata.category = category.to_string();
            self.dirty = true;
        }
        Ok(())
    }

    pub fn set_version(&mut self, version: ModVersion) -> Result<()> {
        if !version.is_non_negative() {
            return Err(ModError::EditMetadata(format!(
                "Version cannot be negative: {}",
                version
            )));
        }
        if self.metadata.version != version {
            self.metadata.version = version;
            self.dirty = true;
        }
        Ok(())
    }

    pub fn set_description(&mut self, description: &str) -> Result<()> {
        if description.is_empty() {
            return Err(ModError::EditMetadata("Description cannot be empty".to_string()));
        }
        if self.description != description {
            self.description = description.to_string();
            self.dirty = true;
        }
        Ok(())
    }

    /// Persist metadata and description if dirty.
    ///
    /// # Returns
    /// `true` if anything was written. The dirty flag is cleared only after both
    /// files were written.
    pub fn save(&mut self) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }

        write_metadata(&self.metadata, &self.root)?;
        write_description(&self.description, &self.root)?;
        self.dirty = false;

        tracing::info!("Saved project mod metadata: {}", self.root);
        Ok(true)
    }
}
