mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use docgraph::diagnostics;
use docgraph::matcher::DEFAULT_MIN_MATCH_LENGTH;

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "docgraph", about = "Citation graph for controlled documents")]
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Scan a directory of controlled documents and write the graph file
    Scan {
        /// Directory to scan.
        dir: PathBuf,
        /// Graph file to write.
        #[arg(short, long, default_value = "docgraph.bin")]
        output: PathBuf,
        /// Accept high-scoring candidates and mark citations with no candidates unfound.
        #[arg(long)]
        resolve: bool,
    },
    /// List documents, their references, and unfound citations
    Show {
        /// Graph file to read.
        file: PathBuf,
        /// Output JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Rank documents by bigram similarity to a citation
    Similar {
        /// Graph file to read.
        file: PathBuf,
        /// Citation text to match.
        query: String,
        /// Candidates at or below this similarity are left out.
        #[arg(long, default_value_t = 0.0)]
        threshold: f64,
    },
    /// Rank documents by longest matching prefix of a citation
    Suggest {
        /// Graph file to read.
        file: PathBuf,
        /// Shortest prefix, in characters, that counts as a match.
        #[arg(long, default_value_t = DEFAULT_MIN_MATCH_LENGTH)]
        min: usize,
        /// Citation text to match.
        query: String,
    },
    /// Print the documents reachable from one document
    Traverse {
        /// Walk depth-first instead of breadth-first.
        #[arg(long)]
        dfs: bool,
        /// Graph file to read.
        file: PathBuf,
        /// Index of the starting document, as listed by `show`.
        index: usize,
    },
}

fn main() -> ExitCode {
    // stdout carries command output, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| return "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Scan { dir, output, resolve } => commands::cmd_scan(dir, output, *resolve),
        Commands::Show { file, json } => commands::cmd_show(file, *json),
        Commands::Similar { file, query, threshold } => commands::cmd_similar(file, query, *threshold),
        Commands::Suggest { file, min, query } => commands::cmd_suggest(file, query, *min),
        Commands::Traverse { dfs, file, index } => commands::cmd_traverse(file, *index, *dfs),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    }
}
