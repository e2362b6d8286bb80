//! CLI commands for docgraph: scan, show, suggest, similar, traverse.

use std::path::Path;

use serde::Serialize;

use docgraph::codec;
use docgraph::config::Config;
use docgraph::error::Error;
use docgraph::graph::ReferenceGraph;
use docgraph::parsers::ParserRegistry;
use docgraph::resolution::{AutoResolver, ResolutionSession};
use docgraph::scanner;
use docgraph::traversal::Order;
use docgraph::types::DocIndex;

/// Read and decode a graph file.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be opened, or `Error::CorruptStream`
/// if it does not decode.
fn load_graph(file: &Path) -> Result<ReferenceGraph, Error> {
    let reader = std::fs::File::open(file)?;
    let graph = codec::decode(reader)?;
    tracing::debug!(path = %file.display(), documents = graph.size(), "loaded graph");
    return Ok(graph);
}

// ── scan ──────────────────────────────────────────────────────────────

/// Scan `dir`, parse citations, optionally auto-resolve, and write the graph.
///
/// The graph is encoded in memory first, so a failed encode leaves no file.
///
/// # Errors
///
/// Returns errors from config loading, scanning, parsing, resolution, or writing.
pub fn cmd_scan(dir: &Path, output: &Path, resolve: bool) -> Result<(), Error> {
    let config = Config::load(dir)?;
    let report = scanner::scan(dir, &config)?;
    for skipped in &report.skipped {
        eprintln!("skipped {}: {}", skipped.path.display(), skipped.error);
    }

    let mut graph = report.graph;
    let parsed = ParserRegistry::default().parse_all(&mut graph)?;
    tracing::info!(parsed, "parsed citations");

    if resolve {
        let mut resolver = AutoResolver { min_score: config.auto_accept_score };
        let summary = ResolutionSession::new(config.min_match_length).run(&mut graph, &mut resolver)?;
        println!(
            "Resolved {} citations, {} not found, {} left for review, {} already linked",
            summary.accepted, summary.rejected, summary.skipped_citations, summary.already_connected
        );
    }

    let bytes = codec::to_bytes(&graph)?;
    std::fs::write(output, bytes)?;
    println!("Wrote {} documents to {}", graph.size(), output.display());
    return Ok(());
}

// ── show ──────────────────────────────────────────────────────────────

/// One document in `show --json` output.
#[derive(Serialize)]
struct DocumentJson {
    /// Arena position.
    index: usize,
    /// Document name.
    name: String,
    /// Path recorded at scan time.
    path: String,
    /// Arena positions of resolved targets, in edge order.
    references: Vec<usize>,
    /// Revision number.
    revision: u8,
    /// Subsystem label.
    subsystem: String,
    /// Lowercased unfound citations.
    unfound: Vec<String>,
}

/// Print every document with its references and unfound citations.
///
/// # Errors
///
/// Returns errors from loading the graph.
pub fn cmd_show(file: &Path, json: bool) -> Result<(), Error> {
    let graph = load_graph(file)?;

    if json {
        let docs: Vec<DocumentJson> = graph
            .iter()
            .map(|(index, doc)| {
                return DocumentJson {
                    index: index.0,
                    name: doc.name().to_string(),
                    path: doc.path().display().to_string(),
                    references: doc.references().iter().map(|r| return r.target.0).collect(),
                    revision: doc.id().revision,
                    subsystem: doc.id().subsystem.to_string(),
                    unfound: doc.unfound_citations().to_vec(),
                };
            })
            .collect();
        match serde_json::to_string_pretty(&docs) {
            Ok(out) => println!("{out}"),
            Err(e) => return Err(Error::Unencodable { reason: e.to_string() }),
        }
        return Ok(());
    }

    if graph.is_empty() {
        println!("No documents");
        return Ok(());
    }
    for (index, doc) in graph.iter() {
        println!("{index} {}", doc.id());
        println!("    path: {}", doc.path().display());
        for edge in doc.references() {
            println!("    -> {} {}", edge.target, edge.target_id);
        }
        for citation in doc.unfound_citations() {
            println!("    ?  {citation}");
        }
    }
    return Ok(());
}

// ── suggest / similar ─────────────────────────────────────────────────

/// Print documents ranked by longest-prefix score against `query`.
///
/// # Errors
///
/// Returns errors from loading the graph, or `Error::Match` if the query is
/// shorter than `min`.
pub fn cmd_suggest(file: &Path, query: &str, min: usize) -> Result<(), Error> {
    let graph = load_graph(file)?;
    let candidates = graph.find_candidates(query, min)?;
    if candidates.is_empty() {
        println!("No candidates for `{query}`");
        return Ok(());
    }
    for c in &candidates {
        println!("{:>4}  {}  {}", c.score, c.index, c.document.id());
    }
    return Ok(());
}

/// Print documents ranked by bigram similarity to `query`.
///
/// # Errors
///
/// Returns errors from loading the graph.
pub fn cmd_similar(file: &Path, query: &str, threshold: f64) -> Result<(), Error> {
    let graph = load_graph(file)?;
    let candidates = graph.find_similar(query, threshold);
    if candidates.is_empty() {
        println!("No candidates for `{query}`");
        return Ok(());
    }
    for c in &candidates {
        println!("{:.3}  {}  {}", c.similarity, c.index, c.document.id());
    }
    return Ok(());
}

// ── traverse ──────────────────────────────────────────────────────────

/// Print the documents reachable from `root`, one per line, in walk order.
///
/// # Errors
///
/// Returns errors from loading the graph, or `Error::OutOfRange` if `root`
/// is not in it.
pub fn cmd_traverse(file: &Path, root: usize, depth_first: bool) -> Result<(), Error> {
    let graph = load_graph(file)?;
    let order = if depth_first { Order::DepthFirst } else { Order::BreadthFirst };
    for doc in graph.traverse(Some(DocIndex(root)), order)? {
        println!("{}", doc.id());
    }
    return Ok(());
}
