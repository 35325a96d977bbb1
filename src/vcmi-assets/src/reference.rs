//! Reference extraction.
//!
//! Walks a [`ConfigDocument`] depth-first and collects every string scalar
//! that looks like an asset reference, regardless of the key it sits under.

use crate::category::{
    extension, is_recognized, DEFAULT_EXTENSION, IMAGE_EXTENSION, LEGACY_BITMAP_EXTENSION,
};
use crate::document::{ConfigDocument, Node, Scalar};
use crate::relpath::RelPath;

/// An asset reference found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    /// The string exactly as it appeared in the document.
    pub raw: String,
    /// Normalized reference, always carrying a recognized extension.
    pub value: String,
    /// Path of the owning document.
    pub document: RelPath,
}

impl AssetReference {
    /// Build a reference from a raw document value.
    pub fn new(raw: impl Into<String>, document: RelPath) -> Self {
        let raw = raw.into();
        let value = normalize(&raw);
        AssetReference {
            raw,
            value,
            document,
        }
    }

    /// The reference as a path relative to its category folder.
    pub fn path(&self) -> RelPath {
        RelPath::parse(&self.value)
    }

    /// Basename of the reference, used as the lookup key into the raw pool.
    pub fn file_name(&self) -> &str {
        self.value.rsplit('/').next().unwrap_or(&self.value)
    }

    pub fn extension(&self) -> &str {
        extension(&self.value).unwrap_or(DEFAULT_EXTENSION)
    }
}

/// True when a string value plausibly names an asset.
///
/// A value qualifies if it contains a path separator or ends with a known
/// media extension. Anything containing `//` (URLs, commented-out text) is
/// rejected.
pub fn is_asset_like(value: &str) -> bool {
    if value.contains("//") {
        return false;
    }
    if value.contains(['/', '\\']) {
        return true;
    }
    extension(value).is_some_and(is_recognized)
}

/// Normalize a raw reference.
///
/// - separators become `/`
/// - a frame suffix after the extension (`dragon.def:3`) is cut off
/// - missing or unrecognized extensions get `.def` appended
/// - `.bmp` is rewritten to `.png`
pub fn normalize(raw: &str) -> String {
    let mut value = raw.trim().replace('\\', "/");

    if let Some(colon) = value.find(':') {
        if extension(&value[..colon]).is_some_and(is_recognized) {
            value.truncate(colon);
        }
    }

    let ext = extension(&value).map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some(LEGACY_BITMAP_EXTENSION) => {
            value.truncate(value.len() - LEGACY_BITMAP_EXTENSION.len());
            value.push_str(IMAGE_EXTENSION);
        }
        Some(ext) if is_recognized(ext) => {}
        _ => {
            let stem_len = value.trim_end_matches('.').len();
            value.truncate(stem_len);
            value.push('.');
            value.push_str(DEFAULT_EXTENSION);
        }
    }

    value
}

/// True when any scalar in the tree is asset-like.
pub fn has_asset_values(node: &Node) -> bool {
    match node {
        Node::Object(pairs) => pairs.iter().any(|(_, v)| has_asset_values(v)),
        Node::Sequence(items) => items.iter().any(has_asset_values),
        Node::Scalar(Scalar::String(s)) => is_asset_like(s),
        Node::Scalar(_) => false,
    }
}

/// Collect every asset reference in a document, in document order.
pub fn extract(document: &ConfigDocument) -> Vec<AssetReference> {
    let mut refs = Vec::new();
    collect(&document.root, &document.path, &mut refs);
    refs
}

fn collect(node: &Node, document: &RelPath, refs: &mut Vec<AssetReference>) {
    match node {
        Node::Object(pairs) => {
            for (_, value) in pairs {
                collect(value, document, refs);
            }
        }
        Node::Sequence(items) => {
            for item in items {
                collect(item, document, refs);
            }
        }
        Node::Scalar(Scalar::String(s)) if is_asset_like(s) => {
            refs.push(AssetReference::new(s.as_str(), document.clone()));
        }
        Node::Scalar(_) => {}
    }
}
