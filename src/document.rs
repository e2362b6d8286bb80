//! Documents and the resolved-reference edges between them.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::types::{DEFAULT_PREFIX, DocIndex, DocumentId};

/// A directed edge from the owning document to a target document.
#[derive(Debug, Clone)]
pub struct Reference {
    /// Raw citation text that produced this edge. Empty after a decode.
    pub citation: String,
    /// Arena handle of the target in the owning graph.
    pub target: DocIndex,
    /// Identity of the target, kept alongside the handle for validation.
    pub target_id: DocumentId,
}

/// One scanned file and everything known about what it cites.
#[derive(Debug, Clone)]
pub struct Document {
    /// Identity parsed from the file name.
    id: DocumentId,
    /// Citations extracted from content and not yet resolved.
    parsed: Vec<String>,
    /// Location on disk. Not part of identity.
    path: PathBuf,
    /// Resolved edges, in the order they were added.
    references: Vec<Reference>,
    /// Lowercased citations with no matching document. Insertion order, no duplicates.
    unfound: Vec<String>,
}

impl Document {
    /// Create a document for a file whose name follows the default `REGS` pattern.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidNameFormat` if the file name does not parse.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, Error> {
        return Self::create_with_prefix(path, DEFAULT_PREFIX);
    }

    /// Create a document whose file name uses a custom prefix.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidNameFormat` if the file name does not parse.
    pub fn create_with_prefix(path: impl Into<PathBuf>, prefix: &str) -> Result<Self, Error> {
        let path = path.into();
        let Some(file_name) = path.file_name().and_then(|n| return n.to_str()) else {
            return Err(Error::InvalidNameFormat {
                file: path,
                reason: "path has no UTF-8 file name".to_string(),
            });
        };
        let id = DocumentId::from_file_name_with_prefix(file_name, prefix)
            .map_err(|e| return with_full_path(e, &path))?;
        return Ok(Self::from_parts(id, path));
    }

    /// Assemble a document from an already-known identity, e.g. while decoding.
    pub const fn from_parts(id: DocumentId, path: PathBuf) -> Self {
        return Self { id, parsed: Vec::new(), path, references: Vec::new(), unfound: Vec::new() };
    }

    /// Add an edge to `target`, unless one to that exact target already exists.
    ///
    /// On success any unfound citation matching `citation` case-insensitively is
    /// dropped, so a citation is never both resolved and unfound.
    pub fn add_resolved_reference(&mut self, target: DocIndex, target_id: DocumentId, citation: &str) -> bool {
        if self.has_reference_to(target) {
            return false;
        }
        let lowered = citation.to_lowercase();
        self.unfound.retain(|c| return *c != lowered);
        self.references.push(Reference { citation: citation.to_string(), target, target_id });
        return true;
    }

    /// Final component of the path, lossily converted.
    pub fn file_name(&self) -> String {
        return self.path.file_name().map_or_else(String::new, |n| return n.to_string_lossy().into_owned());
    }

    /// Whether an edge to `target` exists. Linear in the number of edges.
    pub fn has_reference_to(&self, target: DocIndex) -> bool {
        return self.references.iter().any(|r| return r.target == target);
    }

    /// Whether `citation` was marked unfound, ignoring case.
    pub fn has_unfound_citation(&self, citation: &str) -> bool {
        let lowered = citation.to_lowercase();
        return self.unfound.iter().any(|c| return *c == lowered);
    }

    /// Identity of this document.
    pub const fn id(&self) -> &DocumentId {
        return &self.id;
    }

    /// Record that no document matches `citation`. Stored lowercased. Empty
    /// strings, repeats, and citations an edge already carries are ignored.
    pub fn mark_unfound(&mut self, citation: &str) {
        if citation.is_empty() || self.is_settled(citation) {
            return;
        }
        self.unfound.push(citation.to_lowercase());
    }

    /// Document name from the identity.
    pub fn name(&self) -> &str {
        return &self.id.name;
    }

    /// Raw citations handed over by a content parser.
    pub fn parsed_citations(&self) -> &[String] {
        return &self.parsed;
    }

    /// Location of the file on disk.
    pub fn path(&self) -> &Path {
        return &self.path;
    }

    /// Resolved edges in insertion order.
    pub fn references(&self) -> &[Reference] {
        return &self.references;
    }

    /// Replace the parsed citations, e.g. after running a content parser.
    pub fn set_parsed_citations(&mut self, citations: Vec<String>) {
        self.parsed = citations;
    }

    /// Unfound citations in the order they were marked.
    pub fn unfound_citations(&self) -> &[String] {
        return &self.unfound;
    }

    /// Whether `citation` has already been handled: resolved on an edge, or marked unfound.
    pub fn is_settled(&self, citation: &str) -> bool {
        let lowered = citation.to_lowercase();
        return self.has_unfound_citation(citation)
            || self.references.iter().any(|r| return !r.citation.is_empty() && r.citation.to_lowercase() == lowered);
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        return self.id == other.id;
    }
}

impl Eq for Document {}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Document name: {}", self.id.name)?;
        writeln!(f, "Subsystem: {}", self.id.subsystem)?;
        writeln!(f, "Revision No.: {}", self.id.revision)?;
        let targets: Vec<&str> = self.references.iter().map(|r| return r.target_id.name.as_str()).collect();
        return write!(f, "References: {}", targets.join(", "));
    }
}

/// Replace the bare file name in a name-format error with the full path.
fn with_full_path(e: Error, path: &Path) -> Error {
    return match e {
        Error::InvalidNameFormat { reason, .. } => Error::InvalidNameFormat { file: path.to_path_buf(), reason },
        other => other,
    };
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;
    use crate::types::Subsystem;

    fn doc(file: &str) -> Document {
        return Document::create(PathBuf::from("library").join(file)).unwrap();
    }

    #[test]
    fn create_parses_identity_from_file_name() {
        let d = doc("REGS-3-R2-YagiMount.docx");
        assert_eq!(d.id().subsystem, Subsystem::Yagi);
        assert_eq!(d.id().revision, 2);
        assert_eq!(d.name(), "YagiMount.docx");
        assert_eq!(d.file_name(), "REGS-3-R2-YagiMount.docx");
    }

    #[test]
    fn create_reports_full_path_on_bad_name() {
        let err = Document::create("library/notes.txt").unwrap_err();
        let Error::InvalidNameFormat { file, .. } = err else {
            panic!("expected InvalidNameFormat");
        };
        assert_eq!(file, PathBuf::from("library/notes.txt"));
    }

    #[test]
    fn equality_is_identity_equality() {
        let a = Document::create("a/REGS-0-R1-Plan").unwrap();
        let b = Document::create("b/REGS-4-R1-Plan").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn duplicate_edge_is_rejected() {
        let mut source = doc("REGS-0-R1-Source");
        let target = doc("REGS-0-R1-Target");
        assert!(source.add_resolved_reference(DocIndex(1), target.id().clone(), "target"));
        assert!(!source.add_resolved_reference(DocIndex(1), target.id().clone(), "other text"));
        assert_eq!(source.references().len(), 1);
        assert!(source.has_reference_to(DocIndex(1)));
        assert!(!source.has_reference_to(DocIndex(2)));
    }

    #[test]
    fn resolving_clears_unfound_citation() {
        let mut source = doc("REGS-0-R1-Source");
        let target = doc("REGS-0-R1-Target");
        source.mark_unfound("Foo");
        assert!(source.has_unfound_citation("FOO"));

        source.add_resolved_reference(DocIndex(1), target.id().clone(), "foo");
        assert!(!source.has_unfound_citation("foo"));
        assert!(source.unfound_citations().is_empty());
    }

    #[test]
    fn resolved_citation_cannot_be_marked_unfound() {
        let mut source = doc("REGS-0-R1-Source");
        let target = doc("REGS-0-R1-Target");
        source.add_resolved_reference(DocIndex(1), target.id().clone(), "Foo");
        source.mark_unfound("foo");
        assert!(!source.has_unfound_citation("foo"));
        assert!(source.unfound_citations().is_empty());
        assert!(source.is_settled("FOO"));
    }

    #[test]
    fn mark_unfound_is_idempotent_and_lowercases() {
        let mut d = doc("REGS-0-R1-Source");
        d.mark_unfound("Antenna Spec");
        d.mark_unfound("ANTENNA SPEC");
        d.mark_unfound("");
        assert_eq!(d.unfound_citations(), ["antenna spec"]);
    }

    #[test]
    fn settled_covers_resolved_and_unfound() {
        let mut d = doc("REGS-0-R1-Source");
        d.mark_unfound("missing");
        d.add_resolved_reference(DocIndex(3), DocumentId::new(Subsystem::Goes, 1, "X"), "Found It");
        assert!(d.is_settled("MISSING"));
        assert!(d.is_settled("found it"));
        assert!(!d.is_settled("new citation"));
    }
}
