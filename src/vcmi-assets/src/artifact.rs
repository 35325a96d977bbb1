//! Line grammar shared by mapping and override artifacts.
//!
//! ```text
//! // Source file: ModX/Content/config/creatures.json
//! "ModX/Sprites/creatures/dragon.def" : "dragon.def",
//! ```
//!
//! One entry per line, trailing comma optional. Blank lines and `//` comments
//! are kept verbatim and ignored by consumers.

use std::fs;
use std::path::{Path, PathBuf};

use crate::relpath::RelPath;
use crate::{Error, Result};

pub const PROVENANCE_PREFIX: &str = "// Source file:";

/// A `"<key>" : "<value>"` pair.
///
/// In a mapping artifact the key is the destination path and the value the
/// source filename. Override artifacts use the same shape with the relative
/// path of the protected file as key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MappingEntry {
    pub key: String,
    pub value: String,
}

impl MappingEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        MappingEntry {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Render as an artifact line, without the newline.
    pub fn to_line(&self) -> String {
        format!("\"{}\" : \"{}\",", self.key, self.value)
    }
}

/// One line of an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactLine {
    Blank,
    /// `// Source file: <path>`, holding the path.
    Provenance(String),
    /// Any other `//` comment, verbatim.
    Comment(String),
    Entry(MappingEntry),
    /// A line matching none of the above, verbatim.
    Invalid(String),
}

impl ArtifactLine {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return ArtifactLine::Blank;
        }
        if let Some(path) = trimmed.strip_prefix(PROVENANCE_PREFIX) {
            return ArtifactLine::Provenance(path.trim().to_string());
        }
        if trimmed.starts_with("//") {
            return ArtifactLine::Comment(trimmed.to_string());
        }
        match parse_entry(trimmed) {
            Some(entry) => ArtifactLine::Entry(entry),
            None => ArtifactLine::Invalid(trimmed.to_string()),
        }
    }

    /// Render back to text, without the newline.
    pub fn to_line(&self) -> String {
        match self {
            ArtifactLine::Blank => String::new(),
            ArtifactLine::Provenance(path) => provenance_line(path),
            ArtifactLine::Comment(text) | ArtifactLine::Invalid(text) => text.clone(),
            ArtifactLine::Entry(entry) => entry.to_line(),
        }
    }
}

pub fn provenance_line(path: &str) -> String {
    format!("{PROVENANCE_PREFIX} {path}")
}

fn parse_entry(line: &str) -> Option<MappingEntry> {
    let (key, rest) = quoted(line)?;
    let rest = rest.trim_start().strip_prefix(':')?;
    let (value, rest) = quoted(rest.trim_start())?;
    let rest = rest.trim_start();
    let rest = rest.strip_prefix(',').unwrap_or(rest);

    if !rest.trim().is_empty() || key.is_empty() || value.is_empty() {
        return None;
    }
    Some(MappingEntry::new(key, value))
}

fn quoted(text: &str) -> Option<(&str, &str)> {
    let body = text.strip_prefix('"')?;
    let end = body.find('"')?;
    Some((&body[..end], &body[end + 1..]))
}

/// Error for an entry whose key climbs above the folder it is resolved
/// against, or `None` when the key is contained.
pub(crate) fn escaping_key(path: &Path, line_no: usize, entry: &MappingEntry) -> Option<Error> {
    if RelPath::parse_contained(&entry.key).is_some() {
        return None;
    }
    let err = Error::InvalidArtifactLine {
        path: path.to_path_buf(),
        line_no,
        line: entry.to_line(),
    };
    tracing::warn!("{err}: destination leaves the mod folder");
    Some(err)
}

/// A fully read artifact file.
#[derive(Debug, Clone, Default)]
pub struct Artifact {
    pub path: PathBuf,
    pub lines: Vec<ArtifactLine>,
}

impl Artifact {
    /// Read an artifact, keeping every line.
    ///
    /// Lines that are not valid UTF-8 become [`ArtifactLine::Invalid`].
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let mut raw: Vec<&[u8]> = bytes.split(|b| *b == b'\n').collect();
        if raw.last().is_some_and(|line| line.is_empty()) {
            raw.pop();
        }

        let lines = raw
            .into_iter()
            .map(|line| {
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                match std::str::from_utf8(line) {
                    Ok(text) => ArtifactLine::parse(text),
                    Err(_) => ArtifactLine::Invalid(String::from_utf8_lossy(line).into_owned()),
                }
            })
            .collect();

        Ok(Artifact {
            path: path.to_path_buf(),
            lines,
        })
    }

    pub fn entries(&self) -> impl Iterator<Item = &MappingEntry> {
        self.lines.iter().filter_map(|line| match line {
            ArtifactLine::Entry(entry) => Some(entry),
            _ => None,
        })
    }

    /// Entries whose key stays inside the folder it is resolved against,
    /// plus an error for each one that does not.
    pub fn contained_entries(&self) -> (Vec<&MappingEntry>, Vec<Error>) {
        let mut entries = Vec::new();
        let mut errors = Vec::new();
        for (idx, line) in self.lines.iter().enumerate() {
            if let ArtifactLine::Entry(entry) = line {
                match escaping_key(&self.path, idx + 1, entry) {
                    Some(err) => errors.push(err),
                    None => entries.push(entry),
                }
            }
        }
        (entries, errors)
    }

    /// Errors for every line that did not match the grammar, logged as they
    /// are produced.
    pub fn invalid_lines(&self) -> Vec<Error> {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(idx, line)| match line {
                ArtifactLine::Invalid(text) => {
                    let err = Error::InvalidArtifactLine {
                        path: self.path.clone(),
                        line_no: idx + 1,
                        line: text.clone(),
                    };
                    tracing::warn!("{err}");
                    Some(err)
                }
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry_variants() {
        let expected = ArtifactLine::Entry(MappingEntry::new("ModX/Sprites/a.def", "a.def"));
        assert_eq!(ArtifactLine::parse(r#""ModX/Sprites/a.def" : "a.def","#), expected);
        assert_eq!(ArtifactLine::parse(r#"  "ModX/Sprites/a.def":"a.def"  "#), expected);
        assert_eq!(ArtifactLine::parse(r#""ModX/Sprites/a.def" : "a.def""#), expected);
    }

    #[test]
    fn test_parse_keeps_drive_letters_intact() {
        let line = ArtifactLine::parse(r#""C:\mods\ModX\Sprites\a.def" : "a.def","#);
        assert_eq!(
            line,
            ArtifactLine::Entry(MappingEntry::new(r"C:\mods\ModX\Sprites\a.def", "a.def"))
        );
    }

    #[test]
    fn test_parse_comments_and_blanks() {
        assert_eq!(ArtifactLine::parse("   "), ArtifactLine::Blank);
        assert_eq!(
            ArtifactLine::parse("// Source file: ModX/Content/a.json"),
            ArtifactLine::Provenance("ModX/Content/a.json".to_string())
        );
        assert_eq!(
            ArtifactLine::parse("// generated"),
            ArtifactLine::Comment("// generated".to_string())
        );
    }

    #[test]
    fn test_parse_invalid_lines() {
        for line in [
            r#""only-key""#,
            r#""a" : "b" : "c""#,
            r#"a : b"#,
            r#""" : "b""#,
            r#""a" : "b",,"#,
        ] {
            assert!(
                matches!(ArtifactLine::parse(line), ArtifactLine::Invalid(_)),
                "{line} should be invalid"
            );
        }
    }

    #[test]
    fn test_line_rendering() {
        let entry = MappingEntry::new("ModX/Sprites/a.def", "a.def");
        assert_eq!(entry.to_line(), r#""ModX/Sprites/a.def" : "a.def","#);
        assert_eq!(
            ArtifactLine::Provenance("x/y.json".into()).to_line(),
            "// Source file: x/y.json"
        );
    }

    #[test]
    fn test_read_reports_invalid_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.txt");
        std::fs::write(
            &path,
            "// Source file: A/Content/a.json\n\"A/Sprites/a.def\" : \"a.def\",\ngarbage\n\n",
        )
        .unwrap();

        let artifact = Artifact::read(&path).unwrap();
        assert_eq!(artifact.lines.len(), 4);
        assert_eq!(artifact.entries().count(), 1);

        let invalid = artifact.invalid_lines();
        assert_eq!(invalid.len(), 1);
        assert!(matches!(invalid[0], Error::InvalidArtifactLine { line_no: 3, .. }));
    }

    #[test]
    fn test_read_tolerates_undecodable_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overridden_assets.txt");
        let mut bytes = b"\"M/Sprites/a.def\" : \"a.def\",\r\n".to_vec();
        bytes.extend_from_slice(b"\"M/Sprites/\xff\xfe.def\" : \"x.def\",\n");
        bytes.extend_from_slice(b"\"M/Sprites/b.def\" : \"b.def\"");
        std::fs::write(&path, bytes).unwrap();

        let artifact = Artifact::read(&path).unwrap();
        assert_eq!(artifact.lines.len(), 3);
        let keys: Vec<_> = artifact.entries().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["M/Sprites/a.def", "M/Sprites/b.def"]);

        let invalid = artifact.invalid_lines();
        assert_eq!(invalid.len(), 1);
        assert!(matches!(invalid[0], Error::InvalidArtifactLine { line_no: 2, .. }));
    }

    #[test]
    fn test_contained_entries_rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overridden_assets.txt");
        std::fs::write(
            &path,
            "\"M/Sprites/a.def\" : \"a.def\",\n\"M/../../up.def\" : \"up.def\",\n",
        )
        .unwrap();

        let artifact = Artifact::read(&path).unwrap();
        let (entries, errors) = artifact.contained_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "M/Sprites/a.def");
        assert!(matches!(errors[0], Error::InvalidArtifactLine { line_no: 2, .. }));
    }
}
