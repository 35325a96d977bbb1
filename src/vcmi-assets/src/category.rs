//! Asset categories and the extension rules that select them.

use std::fmt;

/// Extension appended to references that carry none.
pub const DEFAULT_EXTENSION: &str = "def";

/// Legacy bitmap extension, rewritten to [`IMAGE_EXTENSION`].
pub const LEGACY_BITMAP_EXTENSION: &str = "bmp";

/// Canonical image extension.
pub const IMAGE_EXTENSION: &str = "png";

/// Extensions a reference may keep as-is.
pub const RECOGNIZED_EXTENSIONS: &[&str] = &["def", "wav", "mp3", "bmp", "png", "bik", "smk"];

/// Category folder an asset is installed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Sprites,
    Sounds,
    Music,
    Video,
    Data,
}

impl Category {
    /// Category for a file extension (without the dot), if it has one.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "def" => Some(Category::Sprites),
            "wav" => Some(Category::Sounds),
            "mp3" => Some(Category::Music),
            "bik" => Some(Category::Video),
            "png" => Some(Category::Data),
            _ => None,
        }
    }

    /// Category for a file name, looking at its last extension.
    pub fn from_file_name(name: &str) -> Option<Self> {
        extension(name).and_then(Self::from_extension)
    }

    pub fn folder(self) -> &'static str {
        match self {
            Category::Sprites => "Sprites",
            Category::Sounds => "Sounds",
            Category::Music => "Music",
            Category::Video => "Video",
            Category::Data => "Data",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder())
    }
}

/// Extension of the last path segment, without the dot.
///
/// A leading dot (`.hidden`) does not count as an extension.
pub fn extension(name: &str) -> Option<&str> {
    let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match file.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&file[idx + 1..]),
    }
}

/// True for extensions listed in [`RECOGNIZED_EXTENSIONS`], ignoring case.
pub fn is_recognized(ext: &str) -> bool {
    RECOGNIZED_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_extension() {
        assert_eq!(Category::from_extension("def"), Some(Category::Sprites));
        assert_eq!(Category::from_extension("WAV"), Some(Category::Sounds));
        assert_eq!(Category::from_extension("mp3"), Some(Category::Music));
        assert_eq!(Category::from_extension("bik"), Some(Category::Video));
        assert_eq!(Category::from_extension("png"), Some(Category::Data));
        assert_eq!(Category::from_extension("smk"), None);
        assert_eq!(Category::from_extension(""), None);
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("creatures/dragon.def"), Some("def"));
        assert_eq!(extension("creatures.v2/dragon"), None);
        assert_eq!(extension(r"a\b.PNG"), Some("PNG"));
        assert_eq!(extension(".hidden"), None);
        assert_eq!(extension("trailing."), Some(""));
    }

    #[test]
    fn test_is_recognized() {
        assert!(is_recognized("DEF"));
        assert!(is_recognized("smk"));
        assert!(!is_recognized("json"));
    }
}
