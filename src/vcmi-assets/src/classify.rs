//! Path classification.
//!
//! A reference found in `ModX/Content/config/units.json` is installed
//! relative to the mod that owns the document: the path is cut at the
//! document's `Content` segment and the category folder picked by the
//! reference's extension is appended, followed by the reference itself.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::reference::AssetReference;
use crate::relpath::RelPath;

/// Name of the segment that marks a mod's content root.
pub const CONTENT_SEGMENT: &str = "Content";

/// Where category folders are placed relative to the content root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentLayout {
    /// `ModX/Content/...` documents install into `ModX/<Category>/...`
    #[default]
    Flatten,
    /// `ModX/Content/...` documents install into `ModX/Content/<Category>/...`
    Nested,
}

impl ContentLayout {
    fn keeps_content_segment(self) -> bool {
        matches!(self, ContentLayout::Nested)
    }
}

impl std::str::FromStr for ContentLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flatten" => Ok(ContentLayout::Flatten),
            "nested" => Ok(ContentLayout::Nested),
            other => Err(format!("unknown content layout '{other}' (expected flatten or nested)")),
        }
    }
}

/// A reference together with its install location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedAsset {
    pub reference: AssetReference,
    /// Destination relative to the scanned mod folder.
    pub destination: RelPath,
    /// Basename looked up in the raw pool.
    pub source_file: String,
    pub category: Option<Category>,
}

/// The mod a document belongs to, derived from the document's path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModGroup {
    /// Mod directory (the parent of its `Content` folder).
    pub root: RelPath,
    /// The `Content` folder itself, as spelled on disk.
    pub content_dir: RelPath,
    /// Folder the category directories are created in.
    pub asset_root: RelPath,
}

impl ModGroup {
    /// Group for a document path, or `None` when the path has no `Content`
    /// segment.
    pub fn for_document(document: &RelPath, layout: ContentLayout) -> Option<Self> {
        let root = document.truncate_at_segment(CONTENT_SEGMENT, false)?;
        let content_dir = document.truncate_at_segment(CONTENT_SEGMENT, true)?;
        let asset_root = if layout.keeps_content_segment() {
            content_dir.clone()
        } else {
            root.clone()
        };

        Some(ModGroup {
            root,
            content_dir,
            asset_root,
        })
    }
}

/// Derive the destination of a reference.
///
/// Without a `Content` segment in the document path the reference is placed
/// next to the document, unmodified.
pub fn classify(reference: &AssetReference, layout: ContentLayout) -> ClassifiedAsset {
    let category = Category::from_extension(reference.extension());
    let source_file = reference.file_name().to_string();

    let destination = match ModGroup::for_document(&reference.document, layout) {
        Some(group) => {
            let mut base = group.asset_root;
            if let Some(category) = category {
                base.push(category.folder());
            }
            base.join(&reference.path())
        }
        None => reference.document.parent().join(&reference.path()),
    };

    ClassifiedAsset {
        reference: reference.clone(),
        destination,
        source_file,
        category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(document: &str, raw: &str) -> AssetReference {
        AssetReference::new(raw, RelPath::parse(document))
    }

    #[test]
    fn test_classify_sprite_without_extension() {
        let asset = classify(
            &reference("ModX/Content/sub/a.json", "creatures/dragon"),
            ContentLayout::Flatten,
        );
        assert_eq!(asset.destination.to_string(), "ModX/Sprites/creatures/dragon.def");
        assert_eq!(asset.source_file, "dragon.def");
        assert_eq!(asset.category, Some(Category::Sprites));
    }

    #[test]
    fn test_classify_nested_layout_keeps_content() {
        let asset = classify(
            &reference("ModX/content/config/deep/units.json", "creatures/dragon"),
            ContentLayout::Nested,
        );
        assert_eq!(
            asset.destination.to_string(),
            "ModX/content/Sprites/creatures/dragon.def"
        );
    }

    #[test]
    fn test_classify_categories() {
        let doc = "Mods/A/Content/config/x.json";
        let cases = [
            ("sounds/roar.wav", "Mods/A/Sounds/sounds/roar.wav"),
            ("music/theme.mp3", "Mods/A/Music/music/theme.mp3"),
            ("video/intro.bik", "Mods/A/Video/video/intro.bik"),
            ("ui/bg.bmp", "Mods/A/Data/ui/bg.png"),
            ("video/intro.smk", "Mods/A/video/intro.smk"),
        ];

        for (raw, expected) in cases {
            let asset = classify(&reference(doc, raw), ContentLayout::Flatten);
            assert_eq!(asset.destination.to_string(), expected, "for {raw}");
        }
    }

    #[test]
    fn test_classify_without_content_falls_back_to_document_dir() {
        let asset = classify(
            &reference("ModX/config/a.json", "creatures/dragon.def"),
            ContentLayout::Flatten,
        );
        assert_eq!(asset.destination.to_string(), "ModX/config/creatures/dragon.def");
        assert_eq!(asset.source_file, "dragon.def");
    }

    #[test]
    fn test_classify_nested_submod_uses_innermost_content() {
        let asset = classify(
            &reference("ModA/Content/Mods/ModB/Content/config/x.json", "heroes/h1"),
            ContentLayout::Flatten,
        );
        assert_eq!(
            asset.destination.to_string(),
            "ModA/Content/Mods/ModB/Sprites/heroes/h1.def"
        );
    }

    #[test]
    fn test_classify_parent_segments_stay_under_asset_root() {
        let asset = classify(
            &reference("ModX/Content/config/a.json", "../../../escaped"),
            ContentLayout::Flatten,
        );
        assert_eq!(asset.destination.to_string(), "ModX/Sprites/escaped.def");
        assert_eq!(asset.source_file, "escaped.def");

        let asset = classify(
            &reference("ModX/Content/config/a.json", r"creatures\..\..\ui\bg.bmp"),
            ContentLayout::Nested,
        );
        assert_eq!(asset.destination.to_string(), "ModX/Content/Data/ui/bg.png");
    }

    #[test]
    fn test_mod_group_for_document() {
        let group =
            ModGroup::for_document(&RelPath::parse("ModX/Content/config/a.json"), ContentLayout::Flatten)
                .unwrap();
        assert_eq!(group.root.to_string(), "ModX");
        assert_eq!(group.content_dir.to_string(), "ModX/Content");
        assert_eq!(group.asset_root.to_string(), "ModX");

        assert!(ModGroup::for_document(&RelPath::parse("ModX/a.json"), ContentLayout::Flatten).is_none());
    }

    #[test]
    fn test_content_layout_from_str() {
        assert_eq!("Nested".parse::<ContentLayout>().unwrap(), ContentLayout::Nested);
        assert_eq!("flatten".parse::<ContentLayout>().unwrap(), ContentLayout::Flatten);
        assert!("flat".parse::<ContentLayout>().is_err());
    }
}
