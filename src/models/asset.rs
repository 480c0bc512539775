use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Extension of the name-marker file that identifies an asset.
pub const NAME_MARKER_EXTENSION: &str = "name";

/// Extension synthesized for the geometry file of an asset.
pub const GEOMETRY_EXTENSION: &str = "geom";

/// Extension synthesized for the skeleton file of an asset.
pub const SKELETON_EXTENSION: &str = "skel";

/// Extension of animation files.
pub const ANIMATION_EXTENSION: &str = "anim";

/// Delimiter used to join sibling filenames. Asset filenames never contain it.
pub const SIBLING_DELIMITER: char = ';';

/// True if `filename` ends in `.name`, the marker that identifies an asset.
pub fn is_name_marker(filename: &str) -> bool {
    filename
        .strip_suffix(NAME_MARKER_EXTENSION)
        .is_some_and(|stem| stem.ends_with('.'))
}

/// File category within an asset group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Name,
    Geometry,
    Skeleton,
    Animation,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 4] = [
        Category::Name,
        Category::Geometry,
        Category::Skeleton,
        Category::Animation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Name => "Name",
            Category::Geometry => "Geometry",
            Category::Skeleton => "Skeleton",
            Category::Animation => "Animation",
        }
    }

    /// Parse a category from its display name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of files associated with one base name.
///
/// `categories` always preserves [`Category::ALL`] order when built by the matcher.
/// `directory` is the folder the group was discovered in; the matcher leaves it
/// unset and the scanner fills it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetGroup {
    pub base_name: String,
    pub categories: IndexMap<Category, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<Utf8PathBuf>,
}

impl AssetGroup {
    /// Create an empty group with every category present
    pub fn new(base_name: impl Into<String>) -> Self {
        let categories = Category::ALL
            .into_iter()
            .map(|category| (category, Vec::new()))
            .collect();

        Self {
            base_name: base_name.into(),
            categories,
            directory: None,
        }
    }

    /// Attach the directory the group was discovered in
    pub fn with_directory(mut self, directory: impl Into<Utf8PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Files in a category (empty slice if the category is absent)
    pub fn files(&self, category: Category) -> &[String] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every filename in the group, in category order
    pub fn all_files(&self) -> impl Iterator<Item = &str> {
        self.categories
            .values()
            .flat_map(|files| files.iter().map(String::as_str))
    }

    /// Absolute path of a file in this group, when the discovery directory is known
    pub fn path_of(&self, filename: &str) -> Option<Utf8PathBuf> {
        self.directory.as_deref().map(|dir: &Utf8Path| dir.join(filename))
    }

    /// Total number of files across categories
    pub fn file_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }
}
