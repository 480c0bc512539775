//! Filename pattern matching for asset groups.
//!
//! Given a name-marker file (`hero.name`) and every filename in the same directory
//! joined with `;`, [`match_asset_files`] returns the [`AssetGroup`] for that asset:
//!
//! - **Name**: the marker file itself
//! - **Geometry** / **Skeleton**: `<base>.geom` / `<base>.skel`, synthesized and
//!   never checked against the sibling list
//! - **Animation**: every `<base>.anim` or `<base>_XXNN.anim` token found in the
//!   sibling list, sorted
//!
//! # Examples
//!
//! ```
//! use digismod::models::Category;
//! use digismod::services::matcher::match_asset_files;
//!
//! let group = match_asset_files("hero.name", "hero.name;hero_ab01.anim;other.name");
//! assert_eq!(group.base_name, "hero");
//! assert_eq!(group.files(Category::Geometry), ["hero.geom"]);
//! assert_eq!(group.files(Category::Animation), ["hero_ab01.anim"]);
//! ```

use crate::models::asset::{
    ANIMATION_EXTENSION, AssetGroup, Category, GEOMETRY_EXTENSION, SIBLING_DELIMITER,
    SKELETON_EXTENSION,
};
use camino::Utf8Path;
use regex::Regex;

/// Suffix accepted between the base name and `.anim`: `_` + 2 word chars + 2 digits, or nothing
const ANIMATION_SUFFIX_PATTERN: &str = r"(_\w{2}\d{2}|)";

/// Strip the extension from a name-marker filename
pub fn base_name_of(name_file: &str) -> &str {
    Utf8Path::new(name_file).file_stem().unwrap_or(name_file)
}

/// Join sibling filenames with the `;` delimiter expected by [`match_asset_files`].
pub fn join_siblings<I, S>(filenames: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for (i, name) in filenames.into_iter().enumerate() {
        if i > 0 {
            joined.push(SIBLING_DELIMITER);
        }
        joined.push_str(name.as_ref());
    }
    joined
}

/// Build the animation regex for a base name.
///
/// The base name is embedded unescaped. If that does not form a valid pattern
/// the base name is matched literally instead.
fn animation_regex(base_name: &str) -> Regex {
    let raw = format!(r"({base_name}){ANIMATION_SUFFIX_PATTERN}\.({ANIMATION_EXTENSION})");
    Regex::new(&raw).unwrap_or_else(|_| {
        let escaped = format!(
            r"({}){ANIMATION_SUFFIX_PATTERN}\.({ANIMATION_EXTENSION})",
            regex::escape(base_name)
        );
        Regex::new(&escaped).expect("escaped base name always forms a valid pattern")
    })
}

/// Group the files related to `name_file` out of the `;`-joined sibling list.
///
/// Pure and deterministic. The caller guarantees no filename contains `;`.
pub fn match_asset_files(name_file: &str, siblings: &str) -> AssetGroup {
    let base_name = base_name_of(name_file);
    let mut group = AssetGroup::new(base_name);

    let mut animations: Vec<String> = animation_regex(base_name)
        .find_iter(siblings)
        .map(|m| m.as_str().to_string())
        .collect();
    animations.sort();

    group.categories.insert(Category::Name, vec![name_file.to_string()]);
    group
        .categories
        .insert(Category::Geometry, vec![format!("{base_name}.{GEOMETRY_EXTENSION}")]);
    group
        .categories
        .insert(Category::Skeleton, vec![format!("{base_name}.{SKELETON_EXTENSION}")]);
    group.categories.insert(Category::Animation, animations);

    group
}
