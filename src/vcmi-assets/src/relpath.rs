//! Separator-independent relative paths.
//!
//! Mod documents and artifacts mix `/` and `\` freely, so paths are kept as
//! plain segment lists and only turned into [`PathBuf`]s at the file-system
//! boundary.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A relative path stored as a list of segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelPath {
    segments: Vec<String>,
}

impl RelPath {
    /// Parse a path written with either separator.
    ///
    /// Empty and `.` segments are dropped and `..` removes the previous
    /// segment. A `..` at the root is dropped, so the result never climbs
    /// above where it is joined.
    pub fn parse(raw: &str) -> Self {
        let (segments, _) = resolve(raw);
        RelPath { segments }
    }

    /// Like [`RelPath::parse`], but `None` when a `..` would climb above the
    /// root.
    pub fn parse_contained(raw: &str) -> Option<Self> {
        match resolve(raw) {
            (segments, false) => Some(RelPath { segments }),
            (_, true) => None,
        }
    }

    /// Build from a file-system path, keeping only normal components.
    pub fn from_path(path: &Path) -> Self {
        let segments = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        RelPath { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Everything but the last segment.
    pub fn parent(&self) -> RelPath {
        let mut segments = self.segments.clone();
        segments.pop();
        RelPath { segments }
    }

    /// Append a single segment.
    pub fn push(&mut self, segment: impl Into<String>) {
        let segment = segment.into();
        if !segment.is_empty() {
            self.segments.push(segment);
        }
    }

    /// Append all segments of `other`.
    pub fn join(&self, other: &RelPath) -> RelPath {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        RelPath { segments }
    }

    /// Index of the last segment equal to `name`, ignoring ASCII case.
    pub fn rfind_segment(&self, name: &str) -> Option<usize> {
        self.segments
            .iter()
            .rposition(|s| s.eq_ignore_ascii_case(name))
    }

    /// Keep the segments before the last `name` segment.
    ///
    /// With `inclusive` the matched segment itself is kept as well. Returns
    /// `None` when no segment matches.
    pub fn truncate_at_segment(&self, name: &str, inclusive: bool) -> Option<RelPath> {
        let idx = self.rfind_segment(name)?;
        let end = if inclusive { idx + 1 } else { idx };
        Some(RelPath {
            segments: self.segments[..end].to_vec(),
        })
    }

    /// True when `self` is `other` or lies underneath it.
    pub fn starts_with(&self, other: &RelPath) -> bool {
        self.segments.len() >= other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a == b)
    }

    /// Resolve against a file-system root.
    pub fn to_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in &self.segments {
            path.push(segment);
        }
        path
    }
}

/// Segments of `raw` with `.` and `..` applied, and whether a `..` tried to
/// go past the root.
fn resolve(raw: &str) -> (Vec<String>, bool) {
    let mut segments: Vec<String> = Vec::new();
    let mut escaped = false;

    for segment in raw.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => escaped |= segments.pop().is_none(),
            s => segments.push(s.to_string()),
        }
    }

    (segments, escaped)
}

impl fmt::Display for RelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl From<&str> for RelPath {
    fn from(raw: &str) -> Self {
        RelPath::parse(raw)
    }
}
