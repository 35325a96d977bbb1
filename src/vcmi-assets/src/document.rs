//! Configuration documents.
//!
//! VCMI documents are JSON with `//` and `/* */` comments and the odd
//! trailing comma. Comments and trailing commas are stripped before the text
//! goes through `serde_json`, and the result is converted into a small
//! [`Node`] tree that the extractor walks.

use std::fs;
use std::path::Path;

use crate::relpath::RelPath;
use crate::{Error, Result};

/// Scalar leaf of a document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
    Null,
}

/// A node of a parsed document.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Key/value pairs in document order.
    Object(Vec<(String, Node)>),
    Sequence(Vec<Node>),
    Scalar(Scalar),
}

impl From<serde_json::Value> for Node {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Object(map) => Node::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
            Value::Array(items) => Node::Sequence(items.into_iter().map(Node::from).collect()),
            Value::String(s) => Node::Scalar(Scalar::String(s)),
            Value::Number(n) => Node::Scalar(Scalar::Number(n)),
            Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
            Value::Null => Node::Scalar(Scalar::Null),
        }
    }
}

/// A parsed configuration document, identified by its path relative to the
/// scanned mod folder.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    pub path: RelPath,
    pub root: Node,
}

impl ConfigDocument {
    /// Parse document text.
    ///
    /// `path` is only used for identification and error reporting.
    pub fn parse(path: RelPath, text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let cleaned = strip_comments(text);
        let value: serde_json::Value =
            serde_json::from_str(&cleaned).map_err(|source| Error::DocumentParse {
                path: path.to_path(Path::new("")),
                source,
            })?;

        Ok(ConfigDocument {
            path,
            root: value.into(),
        })
    }

    /// Read and parse `root/relative`.
    pub fn load(root: &Path, relative: &RelPath) -> Result<Self> {
        let full = relative.to_path(root);
        let bytes = fs::read(&full)?;
        let text = String::from_utf8(bytes).map_err(|source| Error::Encoding {
            path: full.clone(),
            source,
        })?;

        Self::parse(relative.clone(), &text).map_err(|e| match e {
            Error::DocumentParse { source, .. } => Error::DocumentParse { path: full, source },
            other => other,
        })
    }
}

/// Remove `//` and `/* */` comments and trailing commas outside of string
/// literals.
///
/// Newlines inside comments are kept so parser line numbers stay meaningful.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            '}' | ']' => {
                drop_trailing_comma(&mut out);
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}

fn drop_trailing_comma(out: &mut String) {
    let trimmed = out.trim_end_matches(char::is_whitespace);
    if trimmed.ends_with(',') {
        let comma = trimmed.len() - 1;
        out.remove(comma);
    }
}
