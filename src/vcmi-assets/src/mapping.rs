//! Mapping table construction and loading.
//!
//! [`scan_documents`] walks a mod folder, extracts and classifies references
//! from each document and streams them through a [`MappingWriter`] into the
//! mapping artifact. Each document's entries are flushed as soon as the
//! document is done, so an interrupted scan leaves a valid prefix behind.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use walkdir::WalkDir;

use crate::artifact::{escaping_key, provenance_line, Artifact, ArtifactLine, MappingEntry};
use crate::classify::{classify, ClassifiedAsset, ContentLayout, ModGroup};
use crate::document::ConfigDocument;
use crate::reference::{self, AssetReference};
use crate::relpath::RelPath;
use crate::{Error, Result};

/// Documents with these names describe a mod rather than its content.
pub const SKIPPED_DOCUMENTS: &[&str] = &["mod.json"];

/// Incremental writer for the mapping artifact.
///
/// Tracks which documents already got a provenance marker and which
/// destinations were already written during this run.
pub struct MappingWriter<W: Write> {
    out: W,
    marked: HashSet<RelPath>,
    destinations: HashMap<String, String>,
    entries_written: usize,
    duplicates: usize,
    conflicts: usize,
}

impl MappingWriter<BufWriter<File>> {
    /// Create (or truncate) the artifact at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> MappingWriter<W> {
    pub fn new(out: W) -> Self {
        MappingWriter {
            out,
            marked: HashSet::new(),
            destinations: HashMap::new(),
            entries_written: 0,
            duplicates: 0,
            conflicts: 0,
        }
    }

    /// Append the entries of one document and flush.
    ///
    /// The provenance marker is written only if at least one entry survives
    /// de-duplication, and at most once per document. Returns the number of
    /// entries written.
    pub fn write_document(&mut self, document: &RelPath, assets: &[ClassifiedAsset]) -> Result<usize> {
        let mut lines = Vec::new();

        for asset in assets {
            let destination = asset.destination.to_string();
            match self.destinations.get(&destination) {
                Some(existing) if *existing == asset.source_file => {
                    self.duplicates += 1;
                    continue;
                }
                Some(existing) => {
                    tracing::warn!(
                        "Conflicting mapping for {}: {} replaced by {} (from {})",
                        destination,
                        existing,
                        asset.source_file,
                        document
                    );
                    self.conflicts += 1;
                }
                None => {}
            }
            self.destinations
                .insert(destination.clone(), asset.source_file.clone());
            lines.push(MappingEntry::new(destination, asset.source_file.clone()).to_line());
        }

        if lines.is_empty() {
            return Ok(0);
        }

        if self.marked.insert(document.clone()) {
            writeln!(self.out, "{}", provenance_line(&document.to_string()))?;
        }
        for line in &lines {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()?;

        self.entries_written += lines.len();
        Ok(lines.len())
    }

    pub fn entries_written(&self) -> usize {
        self.entries_written
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Outcome of a document scan.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub documents_scanned: usize,
    pub documents_with_assets: usize,
    pub entries_written: usize,
    pub duplicates: usize,
    pub conflicts: usize,
    /// Documents that could not be read, decoded or parsed.
    pub skipped: Vec<Error>,
}

/// Scan every `.json` document under `folder` and write the mapping
/// artifact to `output`.
pub fn scan_documents(folder: &Path, output: &Path, layout: ContentLayout) -> Result<ScanReport> {
    if !folder.is_dir() {
        return Err(Error::DestinationMissing(folder.to_path_buf()));
    }

    let mut writer = MappingWriter::create(output)?;
    let mut report = ScanReport::default();

    for entry in WalkDir::new(folder)
        .sort_by_file_name()
        .into_iter()
        .filter_map(crate::readable)
        .filter(|e| e.file_type().is_file())
    {
        if !is_scanned_document(entry.path()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(folder) else {
            continue;
        };
        let relative = RelPath::from_path(relative);
        report.documents_scanned += 1;

        let document = match ConfigDocument::load(folder, &relative) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Skipping document: {e}");
                report.skipped.push(e);
                continue;
            }
        };

        if !reference::has_asset_values(&document.root) {
            tracing::debug!("No asset references in {}", relative);
            continue;
        }

        let assets: Vec<ClassifiedAsset> = reference::extract(&document)
            .iter()
            .map(|r| classify(r, layout))
            .collect();

        if writer.write_document(&relative, &assets)? > 0 {
            report.documents_with_assets += 1;
        }
    }

    report.entries_written = writer.entries_written;
    report.duplicates = writer.duplicates;
    report.conflicts = writer.conflicts;
    writer.finish()?;

    tracing::info!(
        "Scanned {} documents, {} with assets, {} entries written",
        report.documents_scanned,
        report.documents_with_assets,
        report.entries_written
    );
    Ok(report)
}

fn is_scanned_document(path: &Path) -> bool {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let skipped = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| SKIPPED_DOCUMENTS.iter().any(|s| n.eq_ignore_ascii_case(s)));
    is_json && !skipped
}

/// Outcome of re-classifying a raw artifact.
#[derive(Debug, Default)]
pub struct ReclassifyReport {
    pub entries: usize,
    /// Entries that appeared before any provenance line and were kept as-is.
    pub unowned: usize,
    pub invalid: Vec<Error>,
}

/// Rewrite a raw artifact (`"<reference>" : "<file>"` under provenance
/// lines) into a classified one.
///
/// Comments, blank lines and unparseable lines are carried over verbatim.
pub fn reclassify(input: &Path, output: &Path, layout: ContentLayout) -> Result<ReclassifyReport> {
    let artifact = Artifact::read(input)?;
    let mut report = ReclassifyReport {
        invalid: artifact.invalid_lines(),
        ..Default::default()
    };

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(output)?);
    let mut document: Option<RelPath> = None;

    for line in &artifact.lines {
        let rendered = match line {
            ArtifactLine::Provenance(path) => {
                document = Some(RelPath::parse(path));
                line.to_line()
            }
            ArtifactLine::Entry(entry) => match &document {
                Some(doc) => {
                    let asset = classify(&AssetReference::new(entry.key.as_str(), doc.clone()), layout);
                    report.entries += 1;
                    MappingEntry::new(asset.destination.to_string(), entry.value.clone()).to_line()
                }
                None => {
                    tracing::warn!("Entry without source document kept as-is: {}", entry.key);
                    report.unowned += 1;
                    line.to_line()
                }
            },
            _ => line.to_line(),
        };
        writeln!(out, "{rendered}")?;
    }
    out.flush()?;

    Ok(report)
}

/// A loaded mapping entry and the document it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRecord {
    pub entry: MappingEntry,
    pub document: Option<RelPath>,
}

/// A mapping artifact read back into memory.
#[derive(Debug, Default)]
pub struct MappingTable {
    pub records: Vec<MappingRecord>,
    pub invalid: Vec<Error>,
}

impl MappingTable {
    pub fn load(path: &Path) -> Result<Self> {
        let artifact = Artifact::read(path)?;
        let mut invalid = artifact.invalid_lines();
        let mut records = Vec::new();
        let mut document = None;

        for (idx, line) in artifact.lines.into_iter().enumerate() {
            match line {
                ArtifactLine::Provenance(p) => document = Some(RelPath::parse(&p)),
                ArtifactLine::Entry(entry) => match escaping_key(path, idx + 1, &entry) {
                    Some(err) => invalid.push(err),
                    None => records.push(MappingRecord {
                        entry,
                        document: document.clone(),
                    }),
                },
                _ => {}
            }
        }

        Ok(MappingTable { records, invalid })
    }

    /// Entries unique by destination.
    ///
    /// Order follows first appearance; when a destination is mapped to
    /// different source files the last one wins and a warning is logged.
    pub fn resolved(&self) -> Vec<MappingEntry> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut resolved: Vec<MappingEntry> = Vec::new();

        for record in &self.records {
            let entry = &record.entry;
            match index.get(entry.key.as_str()) {
                Some(&idx) => {
                    if resolved[idx].value != entry.value {
                        tracing::warn!(
                            "Conflicting mapping for {}: {} replaced by {}",
                            entry.key,
                            resolved[idx].value,
                            entry.value
                        );
                        resolved[idx].value = entry.value.clone();
                    }
                }
                None => {
                    index.insert(entry.key.as_str(), resolved.len());
                    resolved.push(entry.clone());
                }
            }
        }

        resolved
    }

    /// Declared source filenames per mod, grouped by the provenance of each
    /// entry. Entries whose document has no `Content` segment belong to no
    /// group.
    pub fn groups(&self, layout: ContentLayout) -> BTreeMap<ModGroup, BTreeSet<String>> {
        let mut groups: BTreeMap<ModGroup, BTreeSet<String>> = BTreeMap::new();

        for record in &self.records {
            let Some(group) = record
                .document
                .as_ref()
                .and_then(|doc| ModGroup::for_document(doc, layout))
            else {
                continue;
            };
            groups
                .entry(group)
                .or_default()
                .insert(record.entry.value.clone());
        }

        groups
    }
}
