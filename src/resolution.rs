//! Turning parsed citations into edges, one decision at a time.
//!
//! A [`ResolutionSession`] walks every document's parsed citations in scan
//! order and stops at each one that is not settled yet. Whoever drives the
//! session (an operator at a prompt, or [`AutoResolver`]) answers with a
//! [`Decision`], and the session records it on the graph with `connect` or
//! `mark_unfound`. Because the session holds only two cursors, it can be
//! paused after any decision and resumed later on the same graph.

use crate::document::Document;
use crate::error::Error;
use crate::graph::{Candidate, ReferenceGraph};
use crate::types::DocIndex;

/// Outcome chosen for one citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The citation refers to this document; record an edge.
    Accept(DocIndex),
    /// No document in the graph matches; record the citation as unfound.
    RejectAll,
    /// Leave this citation unresolved and move to the next one.
    SkipCitation,
    /// Leave the rest of this document's citations and move to the next document.
    SkipDocument,
}

/// Decides what a citation refers to, given the ranked candidates.
pub trait Resolver {
    /// Choose an outcome for `citation` found in `source`. `candidates` are
    /// best first and may be empty.
    fn decide(&mut self, source: &Document, citation: &str, candidates: &[Candidate<'_>]) -> Decision;
}

/// Accepts the best candidate when its score reaches `min_score`.
///
/// A citation with no candidates at all is rejected. A citation whose best
/// candidate scores too low is skipped so an operator can look at it.
#[derive(Debug, Clone, Copy)]
pub struct AutoResolver {
    /// Lowest score accepted without asking.
    pub min_score: usize,
}

impl Resolver for AutoResolver {
    fn decide(&mut self, _source: &Document, _citation: &str, candidates: &[Candidate<'_>]) -> Decision {
        return match candidates.first() {
            None => Decision::RejectAll,
            Some(best) if best.score >= self.min_score => Decision::Accept(best.index),
            Some(_) => Decision::SkipCitation,
        };
    }
}

/// The citation a session is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCitation {
    /// Citation text as parsed.
    pub citation: String,
    /// Document the citation was found in.
    pub source: DocIndex,
}

/// What [`ResolutionSession::apply`] recorded for one citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The accepted target was already referenced; no edge was added and the
    /// citation stays unsettled.
    AlreadyConnected,
    /// A new edge now carries the citation.
    Connected,
    /// The citation was recorded as unfound.
    MarkedUnfound,
    /// The citation was left unresolved.
    SkippedCitation,
    /// The rest of the document was left unresolved.
    SkippedDocument,
}

/// Counts of what a [`ResolutionSession::run`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    /// Citations turned into new edges.
    pub accepted: usize,
    /// Citations accepted for a target the document already referenced.
    pub already_connected: usize,
    /// Citations recorded as unfound.
    pub rejected: usize,
    /// Citations left unresolved.
    pub skipped_citations: usize,
    /// Documents whose remaining citations were left unresolved.
    pub skipped_documents: usize,
}

impl ResolutionSummary {
    /// Count one applied decision.
    fn record(&mut self, applied: Applied) {
        let counter = match applied {
            Applied::AlreadyConnected => &mut self.already_connected,
            Applied::Connected => &mut self.accepted,
            Applied::MarkedUnfound => &mut self.rejected,
            Applied::SkippedCitation => &mut self.skipped_citations,
            Applied::SkippedDocument => &mut self.skipped_documents,
        };
        *counter = counter.saturating_add(1);
    }
}

/// Cursor over the unsettled citations of a graph.
#[derive(Debug, Clone)]
pub struct ResolutionSession {
    /// Position within the current document's parsed citations.
    citation: usize,
    /// Arena position of the current document.
    document: usize,
    /// Citations shorter than this cannot be matched and are passed over.
    min_match_length: usize,
}

impl ResolutionSession {
    /// Session positioned at the first citation of the first document.
    pub const fn new(min_match_length: usize) -> Self {
        return Self { citation: 0, document: 0, min_match_length };
    }

    /// Apply `decision` to the pending citation and advance. `None` if
    /// nothing was pending.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` if an accepted target is not in the graph.
    pub fn apply(&mut self, graph: &mut ReferenceGraph, decision: Decision) -> Result<Option<Applied>, Error> {
        let Some(pending) = self.current(graph) else {
            return Ok(None);
        };

        let applied = match decision {
            Decision::Accept(target) => {
                if graph.connect(pending.source, target, &pending.citation)? {
                    tracing::info!(source = %pending.source, %target, citation = %pending.citation, "resolved citation");
                    Applied::Connected
                } else {
                    tracing::warn!(source = %pending.source, %target, citation = %pending.citation, "target already referenced, citation not recorded");
                    Applied::AlreadyConnected
                }
            },
            Decision::RejectAll => {
                graph.mark_unfound(pending.source, &pending.citation)?;
                tracing::info!(source = %pending.source, citation = %pending.citation, "citation not found");
                Applied::MarkedUnfound
            },
            Decision::SkipCitation => {
                tracing::debug!(source = %pending.source, citation = %pending.citation, "skipped citation");
                Applied::SkippedCitation
            },
            Decision::SkipDocument => {
                tracing::debug!(source = %pending.source, "skipped rest of document");
                Applied::SkippedDocument
            },
        };

        if applied == Applied::SkippedDocument {
            self.next_document();
        } else {
            self.next_citation();
        }
        return Ok(Some(applied));
    }

    /// The next unsettled citation, moving the cursors past settled and
    /// too-short ones. `None` once every document has been worked through.
    pub fn current(&mut self, graph: &ReferenceGraph) -> Option<PendingCitation> {
        loop {
            let source = DocIndex(self.document);
            let doc = graph.get(source).ok()?;
            let Some(citation) = doc.parsed_citations().get(self.citation) else {
                self.next_document();
                continue;
            };

            if doc.is_settled(citation) {
                self.next_citation();
                continue;
            }
            if citation.chars().count() < self.min_match_length {
                tracing::debug!(%source, %citation, "citation too short to match");
                self.next_citation();
                continue;
            }
            return Some(PendingCitation { citation: citation.clone(), source });
        }
    }

    /// Move to the next citation of the current document.
    const fn next_citation(&mut self) {
        self.citation = self.citation.saturating_add(1);
    }

    /// Move to the first citation of the next document.
    const fn next_document(&mut self) {
        self.document = self.document.saturating_add(1);
        self.citation = 0;
    }

    /// Ask `resolver` about every remaining citation and apply its decisions.
    ///
    /// # Errors
    ///
    /// Returns `Error::Match` if the session's minimum match length is 0, or
    /// `Error::OutOfRange` if the resolver accepts a handle not in the graph.
    pub fn run(&mut self, graph: &mut ReferenceGraph, resolver: &mut dyn Resolver) -> Result<ResolutionSummary, Error> {
        let mut summary = ResolutionSummary::default();
        while let Some(pending) = self.current(graph) {
            let candidates = graph.find_candidates(&pending.citation, self.min_match_length)?;
            let decision = resolver.decide(graph.get(pending.source)?, &pending.citation, &candidates);
            if let Some(applied) = self.apply(graph, decision)? {
                summary.record(applied);
            }
        }
        return Ok(summary);
    }
}
