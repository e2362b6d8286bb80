//! The document arena and the operations that connect documents.

use crate::document::Document;
use crate::error::Error;
use crate::matcher;
use crate::types::{DocIndex, DocumentId};

/// A document proposed for a citation, with its prefix-match score.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'g> {
    /// The proposed document.
    pub document: &'g Document,
    /// Handle of the proposed document.
    pub index: DocIndex,
    /// Longest matched prefix length, always non-zero.
    pub score: usize,
}

/// A document proposed by bigram similarity instead of prefix matching.
#[derive(Debug, Clone, Copy)]
pub struct SimilarCandidate<'g> {
    /// The proposed document.
    pub document: &'g Document,
    /// Handle of the proposed document.
    pub index: DocIndex,
    /// Similarity in `(0, 1]`.
    pub similarity: f64,
}

/// Every document of one scan, in scan order.
///
/// Documents live in a single arena and edges point at arena positions, so
/// cycles need no shared ownership. Positions are stable: documents are only
/// ever appended. Callers that share a graph across threads must serialize
/// mutation themselves.
#[derive(Debug, Clone, Default)]
pub struct ReferenceGraph {
    /// Arena of documents, indexed by `DocIndex`.
    docs: Vec<Document>,
}

impl ReferenceGraph {
    /// Append a document and return its handle. Duplicate identities are not
    /// rejected here.
    pub fn add_document(&mut self, doc: Document) -> DocIndex {
        let index = DocIndex(self.docs.len());
        self.docs.push(doc);
        return index;
    }

    /// Record an edge from `source` to `target` produced by `citation`.
    /// Returns false if the edge already existed.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` if either handle is not in the graph.
    pub fn connect(&mut self, source: DocIndex, target: DocIndex, citation: &str) -> Result<bool, Error> {
        let target_id = self.get(target)?.id().clone();
        let source_doc = self.get_mut(source)?;
        return Ok(source_doc.add_resolved_reference(target, target_id, citation));
    }

    /// Look up a document by identity. Returns the first match in scan order.
    pub fn find_by_id(&self, id: &DocumentId) -> Option<DocIndex> {
        return self.docs.iter().position(|d| return d.id() == id).map(DocIndex);
    }

    /// Rank every document against `query`, best first.
    ///
    /// Documents whose name shares no prefix of at least `min_match_length`
    /// characters with the query are left out. Equal scores keep scan order.
    ///
    /// # Errors
    ///
    /// Returns `Error::Match` if the query is shorter than `min_match_length`
    /// or `min_match_length` is 0.
    pub fn find_candidates(&self, query: &str, min_match_length: usize) -> Result<Vec<Candidate<'_>>, Error> {
        let mut candidates = Vec::new();
        for (i, document) in self.docs.iter().enumerate() {
            let score = matcher::score(document.name(), query, min_match_length)?;
            if score > 0 {
                candidates.push(Candidate { document, index: DocIndex(i), score });
            }
        }
        // sort_by is stable, so ties stay in scan order.
        candidates.sort_by(|a, b| return b.score.cmp(&a.score));
        return Ok(candidates);
    }

    /// Rank every document by bigram similarity to `query`, best first.
    /// Documents at or below `min_similarity` are left out; ties keep scan order.
    pub fn find_similar(&self, query: &str, min_similarity: f64) -> Vec<SimilarCandidate<'_>> {
        let mut candidates: Vec<SimilarCandidate<'_>> = self
            .docs
            .iter()
            .enumerate()
            .map(|(i, document)| {
                return SimilarCandidate { document, index: DocIndex(i), similarity: matcher::similarity(document.name(), query) };
            })
            .filter(|c| return c.similarity > min_similarity)
            .collect();
        candidates.sort_by(|a, b| return b.similarity.total_cmp(&a.similarity));
        return candidates;
    }

    /// Document at `index`.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` if `index` is not in the graph.
    pub fn get(&self, index: DocIndex) -> Result<&Document, Error> {
        let size = self.docs.len();
        return self.docs.get(index.0).ok_or(Error::OutOfRange { index: index.0, size });
    }

    /// Mutable document at `index`.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` if `index` is not in the graph.
    pub fn get_mut(&mut self, index: DocIndex) -> Result<&mut Document, Error> {
        let size = self.docs.len();
        return self.docs.get_mut(index.0).ok_or(Error::OutOfRange { index: index.0, size });
    }

    /// Whether the graph holds no documents.
    pub fn is_empty(&self) -> bool {
        return self.docs.is_empty();
    }

    /// Documents with their handles, in scan order.
    pub fn iter(&self) -> impl Iterator<Item = (DocIndex, &Document)> {
        return self.docs.iter().enumerate().map(|(i, d)| return (DocIndex(i), d));
    }

    /// Record that no document in the graph matches `citation` for `source`.
    /// Ignored if one of `source`'s edges already carries the citation.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` if `source` is not in the graph.
    pub fn mark_unfound(&mut self, source: DocIndex, citation: &str) -> Result<(), Error> {
        self.get_mut(source)?.mark_unfound(citation);
        return Ok(());
    }

    /// Number of documents.
    pub fn size(&self) -> usize {
        return self.docs.len();
    }

    /// Handles of the documents `source` points at, in edge order.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` if `source` is not in the graph.
    pub fn targets_of(&self, source: DocIndex) -> Result<Vec<DocIndex>, Error> {
        return Ok(self.get(source)?.references().iter().map(|r| return r.target).collect());
    }

    /// Check that every edge points at a document in this graph with the
    /// identity the edge recorded.
    ///
    /// # Errors
    ///
    /// Returns `Error::CorruptStream` naming the first dangling edge.
    pub fn validate(&self) -> Result<(), Error> {
        for (source, doc) in self.iter() {
            for edge in doc.references() {
                let matches = self.docs.get(edge.target.0).is_some_and(|t| return *t.id() == edge.target_id);
                if !matches {
                    return Err(Error::CorruptStream {
                        reason: format!("dangling edge {source} -> {} ({})", edge.target, edge.target_id),
                    });
                }
            }
        }
        return Ok(());
    }
}
