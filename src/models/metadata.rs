use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed name of the subdirectory holding a project mod's asset files.
pub const MODFILES_DIR: &str = "modfiles";

/// Fixed name of the structured metadata file.
pub const METADATA_FILE: &str = "METADATA.json";

/// Fixed name of the free-text description file.
pub const DESCRIPTION_FILE: &str = "DESCRIPTION.html";

/// Two-component mod version, stored on disk as `[major, minor]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct ModVersion {
    pub major: i32,
    pub minor: i32,
}

impl ModVersion {
    /// Smallest version a new project may be created with (0.1)
    pub const MINIMUM: ModVersion = ModVersion { major: 0, minor: 1 };

    pub const fn new(major: i32, minor: i32) -> Self {
        Self { major, minor }
    }

    /// Convert a spin-box float: integer part and first fractional digit.
    ///
    /// `1.25` becomes `(1, 2)` and `1.999` becomes `(1, 9)`. A small epsilon
    /// absorbs float representation error such as `0.7 == 0.6999999`.
    pub fn from_f32(value: f32) -> Self {
        let major = value.trunc() as i32;
        let tenths = ((value.fract().abs() * 10.0) + 1e-4).trunc() as i32;
        Self::new(major, tenths.min(9))
    }

    pub fn as_f32(&self) -> f32 {
        self.major as f32 + self.minor as f32 / 10.0
    }

    pub fn is_non_negative(&self) -> bool {
        self.major >= 0 && self.minor >= 0
    }
}

impl From<(i32, i32)> for ModVersion {
    fn from((major, minor): (i32, i32)) -> Self {
        Self::new(major, minor)
    }
}

impl From<ModVersion> for (i32, i32) {
    fn from(version: ModVersion) -> Self {
        (version.major, version.minor)
    }
}

impl fmt::Display for ModVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Structured fields of `METADATA.json`.
///
/// `name` is written on project creation and is optional on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub author: String,
    pub version: ModVersion,
    pub category: String,
}

impl ModMetadata {
    pub fn new(author: impl Into<String>, version: ModVersion, category: impl Into<String>) -> Self {
        Self {
            name: None,
            author: author.into(),
            version,
            category: category.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_serializes_as_array() {
        let metadata = ModMetadata::new("Digi", ModVersion::new(1, 2), "Characters");
        let json = serde_json::to_string(&metadata).unwrap();
        assert_eq!(json, r#"{"author":"Digi","version":[1,2],"category":"Characters"}"#);
    }

    #[test]
    fn test_version_float_bridge() {
        assert_eq!(ModVersion::from_f32(1.2), ModVersion::new(1, 2));
        assert_eq!(ModVersion::from_f32(0.3), ModVersion::new(0, 3));
        assert_eq!(ModVersion::from_f32(2.0), ModVersion::new(2, 0));
        assert!((ModVersion::new(1, 5).as_f32() - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_version_float_keeps_minor_single_digit() {
        assert_eq!(ModVersion::from_f32(1.999), ModVersion::new(1, 9));
        assert_eq!(ModVersion::from_f32(1.995), ModVersion::new(1, 9));
        assert_eq!(ModVersion::from_f32(1.95), ModVersion::new(1, 9));
        assert_eq!(ModVersion::from_f32(0.7), ModVersion::new(0, 7));
        assert_eq!(ModVersion::from_f32(1.99999), ModVersion::new(1, 9));

        let version = ModVersion::from_f32(1.999);
        assert!((version.as_f32() - 1.9).abs() < 1e-6);
    }

    #[test]
    fn test_version_ordering_against_minimum() {
        assert!(ModVersion::new(0, 0) < ModVersion::MINIMUM);
        assert!(ModVersion::new(0, 1) >= ModVersion::MINIMUM);
        assert!(ModVersion::new(1, 0) > ModVersion::MINIMUM);
    }

    #[test]
    fn test_version_display() {
        assert_eq!(ModVersion::new(3, 4).to_string(), "3.4");
    }
}
