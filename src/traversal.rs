//! Cycle-safe breadth-first and depth-first walks over resolved references.

use std::collections::{HashSet, VecDeque};

use crate::document::Document;
use crate::error::Error;
use crate::graph::ReferenceGraph;
use crate::types::{DocIndex, DocumentId};

/// Which end of the frontier the next document is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// FIFO frontier: all targets of a document before their targets.
    BreadthFirst,
    /// LIFO frontier: follow the most recently discovered target first.
    DepthFirst,
}

/// Lazy walk from a root document along resolved references.
///
/// Each document is yielded at most once. Visited documents are tracked by
/// identity, so two handles to documents with the same name and revision
/// count as one. A traversal borrows its graph and is consumed as it runs;
/// start a new one to walk again.
#[derive(Debug)]
pub struct Traversal<'g> {
    /// Next document to yield before the frontier is touched.
    current: Option<DocIndex>,
    /// Discovered but not yet yielded documents.
    frontier: VecDeque<DocIndex>,
    /// Graph being walked.
    graph: &'g ReferenceGraph,
    /// Frontier discipline.
    order: Order,
    /// Identities already yielded or queued.
    visited: HashSet<&'g DocumentId>,
}

impl<'g> Traversal<'g> {
    /// Start a walk at `root`. `None` yields nothing.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` if `root` is not in the graph, or
    /// `Error::CorruptStream` if the graph holds a dangling edge.
    pub fn new(graph: &'g ReferenceGraph, root: Option<DocIndex>, order: Order) -> Result<Self, Error> {
        graph.validate()?;
        let mut walk = Self { current: None, frontier: VecDeque::new(), graph, order, visited: HashSet::new() };
        let Some(root) = root else {
            return Ok(walk);
        };

        let root_doc = graph.get(root)?;
        walk.visited.insert(root_doc.id());
        walk.current = Some(root);
        walk.enqueue_targets_of(root_doc);
        return Ok(walk);
    }

    /// Queue every target of `doc` not seen yet, marking it visited now so a
    /// second path to the same document cannot queue it again.
    fn enqueue_targets_of(&mut self, doc: &'g Document) {
        let graph = self.graph;
        for edge in doc.references() {
            // The graph was validated in `new` and is borrowed for the whole walk.
            let Ok(target) = graph.get(edge.target) else {
                continue;
            };
            if self.visited.insert(target.id()) {
                self.frontier.push_back(edge.target);
            }
        }
    }

    /// Take the next handle according to the traversal order.
    fn pop(&mut self) -> Option<DocIndex> {
        return match self.order {
            Order::BreadthFirst => self.frontier.pop_front(),
            Order::DepthFirst => self.frontier.pop_back(),
        };
    }
}

impl<'g> Iterator for Traversal<'g> {
    type Item = &'g Document;

    fn next(&mut self) -> Option<Self::Item> {
        let graph = self.graph;
        // The root's targets were queued at construction, so it is yielded as is.
        if let Some(root) = self.current.take() {
            return graph.get(root).ok();
        }

        let index = self.pop()?;
        let doc = graph.get(index).ok()?;
        self.enqueue_targets_of(doc);
        return Some(doc);
    }
}

impl ReferenceGraph {
    /// Breadth-first walk from `root`.
    ///
    /// # Errors
    ///
    /// Same as [`Traversal::new`].
    pub fn bfs(&self, root: DocIndex) -> Result<Traversal<'_>, Error> {
        return Traversal::new(self, Some(root), Order::BreadthFirst);
    }

    /// Depth-first walk from `root`.
    ///
    /// # Errors
    ///
    /// Same as [`Traversal::new`].
    pub fn dfs(&self, root: DocIndex) -> Result<Traversal<'_>, Error> {
        return Traversal::new(self, Some(root), Order::DepthFirst);
    }

    /// Walk from `root` in the given order. `None` yields nothing.
    ///
    /// # Errors
    ///
    /// Same as [`Traversal::new`].
    pub fn traverse(&self, root: Option<DocIndex>, order: Order) -> Result<Traversal<'_>, Error> {
        return Traversal::new(self, root, order);
    }
}
