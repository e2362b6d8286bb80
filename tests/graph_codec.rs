use std::path::Path;

use docgraph::codec;
use docgraph::config::Config;
use docgraph::parsers::ParserRegistry;
use docgraph::resolution::{AutoResolver, ResolutionSession};
use docgraph::traversal::Order;
use docgraph::{DocIndex, Document, Error, ReferenceGraph};

fn write(root: &Path, name: &str, content: &str) {
    std::fs::write(root.join(name), content).unwrap();
}

/// A small library where the plan cites the antenna spec, which cites the
/// plan back, and one citation matches nothing.
fn library(root: &Path) {
    write(root, "REGS-0-R1-SystemPlan.txt", "See [[AntennaSpecification]] and [[Quartz Oscillator]].");
    write(root, "REGS-3-R2-AntennaSpecification.txt", "Derived from [[SystemPlan rev 1]].");
    write(root, "REGS-4-R1-Receiver.md", "Nothing cited here.");
}

fn names(graph: &ReferenceGraph, root: usize, order: Order) -> Vec<String> {
    return graph
        .traverse(Some(DocIndex(root)), order)
        .unwrap()
        .map(|d| return d.name().to_string())
        .collect();
}

#[test]
fn scan_resolve_persist_and_walk() {
    let dir = tempfile::tempdir().unwrap();
    library(dir.path());

    let config = Config::default();
    let mut graph = docgraph::scanner::scan(dir.path(), &config).unwrap().graph;
    assert_eq!(graph.size(), 3);
    ParserRegistry::default().parse_all(&mut graph).unwrap();

    let mut resolver = AutoResolver { min_score: config.auto_accept_score };
    let summary = ResolutionSession::new(config.min_match_length).run(&mut graph, &mut resolver).unwrap();
    assert_eq!(summary.accepted, 2);
    assert_eq!(summary.rejected, 1);

    let decoded = codec::from_bytes(&codec::to_bytes(&graph).unwrap()).unwrap();
    assert_eq!(decoded.size(), graph.size());
    for ((_, before), (_, after)) in graph.iter().zip(decoded.iter()) {
        assert_eq!(before.id(), after.id());
        assert_eq!(before.path(), after.path());
        assert_eq!(before.unfound_citations(), after.unfound_citations());
        let targets_before: Vec<DocIndex> = before.references().iter().map(|r| return r.target).collect();
        let targets_after: Vec<DocIndex> = after.references().iter().map(|r| return r.target).collect();
        assert_eq!(targets_before, targets_after);
    }

    // Scan order is by file name: SystemPlan, AntennaSpecification, Receiver.
    assert_eq!(names(&decoded, 0, Order::BreadthFirst), ["SystemPlan.txt", "AntennaSpecification.txt"]);
    assert_eq!(names(&decoded, 1, Order::DepthFirst), ["AntennaSpecification.txt", "SystemPlan.txt"]);
    assert_eq!(names(&decoded, 2, Order::BreadthFirst), ["Receiver.md"]);
    assert_eq!(decoded.get(DocIndex(0)).unwrap().unfound_citations(), ["quartz oscillator"]);
}

#[test]
fn citation_text_is_not_persisted() {
    let mut graph = ReferenceGraph::default();
    let a = graph.add_document(Document::create("lib/REGS-0-R1-Alpha").unwrap());
    let b = graph.add_document(Document::create("lib/REGS-1-R1-Beta").unwrap());
    graph.connect(a, b, "Beta as cited").unwrap();

    let decoded = codec::from_bytes(&codec::to_bytes(&graph).unwrap()).unwrap();
    let edge = decoded.get(a).unwrap().references().first().unwrap();
    assert_eq!(edge.target, b);
    assert!(edge.citation.is_empty());
}

#[test]
fn any_prefix_of_a_stream_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    library(dir.path());
    let mut graph = docgraph::scanner::scan(dir.path(), &Config::default()).unwrap().graph;
    graph.connect(DocIndex(0), DocIndex(2), "").unwrap();
    graph.mark_unfound(DocIndex(1), "Ground Station").unwrap();

    let bytes = codec::to_bytes(&graph).unwrap();
    for len in 0..bytes.len() {
        let result = codec::from_bytes(bytes.get(..len).unwrap());
        assert!(matches!(result, Err(Error::CorruptStream { .. })), "prefix of {len} bytes decoded");
    }
}

#[test]
fn non_ascii_names_round_trip() {
    let mut graph = ReferenceGraph::default();
    graph.add_document(Document::create("bibliothèque/REGS-2-R7-Spécification Antenne ✓").unwrap());
    let decoded = codec::from_bytes(&codec::to_bytes(&graph).unwrap()).unwrap();
    let doc = decoded.get(DocIndex(0)).unwrap();
    assert_eq!(doc.name(), "Spécification Antenne ✓");
    assert_eq!(doc.path(), Path::new("bibliothèque/REGS-2-R7-Spécification Antenne ✓"));
}
