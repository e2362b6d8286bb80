//! Citation extraction from document content, dispatched on file extension.
//!
//! The graph never reads file content itself. Parsers registered here turn a
//! document's file into the raw citation strings the resolution workflow
//! works through. New formats are added by registering another
//! [`CitationParser`]; nothing else changes.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::document::Document;
use crate::error::Error;
use crate::graph::ReferenceGraph;
use crate::types::DocIndex;

/// `[[citation text]]`, the inline citation form of plain-text documents.
#[allow(clippy::expect_used, reason = "hardcoded regex is valid")]
static BRACKET_CITATION: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"\[\[([^\[\]]+)\]\]").expect("valid regex"));

/// Extracts raw citation strings from one file format.
pub trait CitationParser {
    /// Citations found in the file at `path`, in document order.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read.
    fn parse(&self, path: &Path) -> Result<Vec<String>, Error>;
}

/// Plain-text documents that cite others inline as `[[Document Name]]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BracketCitationParser;

impl BracketCitationParser {
    /// Citations in `content`, trimmed, empty ones dropped.
    pub fn extract(content: &str) -> Vec<String> {
        return BRACKET_CITATION
            .captures_iter(content)
            .filter_map(|cap| return cap.get(1))
            .map(|m| return m.as_str().trim().to_string())
            .filter(|c| return !c.is_empty())
            .collect();
    }
}

impl CitationParser for BracketCitationParser {
    fn parse(&self, path: &Path) -> Result<Vec<String>, Error> {
        let content = std::fs::read_to_string(path)?;
        return Ok(Self::extract(&content));
    }
}

/// Parsers keyed by lowercase file extension.
pub struct ParserRegistry {
    /// Extension (no dot) to parser.
    parsers: HashMap<String, Box<dyn CitationParser>>,
}

impl Default for ParserRegistry {
    /// Registry with the built-in plain-text parser for `.txt` and `.md`.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("txt", BracketCitationParser);
        registry.register("md", BracketCitationParser);
        return registry;
    }
}

impl ParserRegistry {
    /// Registry with no parsers.
    pub fn empty() -> Self {
        return Self { parsers: HashMap::new() };
    }

    /// Parse `doc` with the parser for its extension. `None` if no parser
    /// handles the extension.
    ///
    /// # Errors
    ///
    /// Propagates the parser's error.
    pub fn parse(&self, doc: &Document) -> Result<Option<Vec<String>>, Error> {
        let Some(parser) = self.parser_for(doc.path()) else {
            tracing::debug!(path = %doc.path().display(), "no citation parser for extension");
            return Ok(None);
        };
        return parser.parse(doc.path()).map(Some);
    }

    /// Run the matching parser over every document and store the results as
    /// parsed citations. Returns the number of documents parsed.
    ///
    /// # Errors
    ///
    /// Propagates the first parser error.
    pub fn parse_all(&self, graph: &mut ReferenceGraph) -> Result<usize, Error> {
        let mut parsed = 0_usize;
        for i in 0..graph.size() {
            let index = DocIndex(i);
            let Some(citations) = self.parse(graph.get(index)?)? else {
                continue;
            };
            tracing::debug!(document = %index, citations = citations.len(), "parsed citations");
            graph.get_mut(index)?.set_parsed_citations(citations);
            parsed = parsed.saturating_add(1);
        }
        return Ok(parsed);
    }

    /// Parser registered for the extension of `path`, compared case-insensitively.
    pub fn parser_for(&self, path: &Path) -> Option<&dyn CitationParser> {
        let ext = path.extension().and_then(|e| return e.to_str())?.to_ascii_lowercase();
        return self.parsers.get(&ext).map(|p| return &**p);
    }

    /// Register `parser` for files ending in `.{extension}`, replacing any
    /// previous parser for it.
    pub fn register(&mut self, extension: &str, parser: impl CitationParser + 'static) {
        let key = extension.trim_start_matches('.').to_ascii_lowercase();
        self.parsers.insert(key, Box::new(parser));
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    /// Parser that returns a fixed list, for dispatch tests.
    struct FixedParser(Vec<&'static str>);

    impl CitationParser for FixedParser {
        fn parse(&self, _path: &Path) -> Result<Vec<String>, Error> {
            return Ok(self.0.iter().map(|s| return (*s).to_string()).collect());
        }
    }

    #[test]
    fn extracts_bracket_citations_in_order() {
        let text = "Per [[Antenna Specification]] and [[ Ground Plan ]], see also [[]] and [single].";
        assert_eq!(BracketCitationParser::extract(text), ["Antenna Specification", "Ground Plan"]);
    }

    #[test]
    fn dispatches_on_extension_case_insensitively() {
        let mut registry = ParserRegistry::empty();
        registry.register(".DOCX", FixedParser(vec!["Power Budget"]));
        assert!(registry.parser_for(Path::new("a/REGS-0-R1-X.docx")).is_some());
        assert!(registry.parser_for(Path::new("a/REGS-0-R1-X.Docx")).is_some());
        assert!(registry.parser_for(Path::new("a/REGS-0-R1-X.pdf")).is_none());
        assert!(registry.parser_for(Path::new("a/REGS-0-R1-X")).is_none());
    }

    #[test]
    fn parse_all_fills_parsed_citations() {
        let dir = tempfile::tempdir().unwrap();
        let with_text = dir.path().join("REGS-0-R1-Plan.txt");
        std::fs::write(&with_text, "Uses [[Antenna Spec]].\nAnd [[Power Budget]].\n").unwrap();

        let mut graph = ReferenceGraph::default();
        graph.add_document(Document::create(&with_text).unwrap());
        graph.add_document(Document::create(dir.path().join("REGS-0-R1-Drawing.dwg")).unwrap());

        let parsed = ParserRegistry::default().parse_all(&mut graph).unwrap();
        assert_eq!(parsed, 1);
        assert_eq!(graph.get(DocIndex(0)).unwrap().parsed_citations(), ["Antenna Spec", "Power Budget"]);
        assert!(graph.get(DocIndex(1)).unwrap().parsed_citations().is_empty());
    }
}
