use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where the user can
/// act on it, how to fix it.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::CorruptStream { reason } => render_corrupt_stream(reason),
        Error::InvalidNameFormat { file, reason } => render_invalid_name(&file.display().to_string(), reason),
        Error::Match { min_match_length, query } => render_match(query, *min_match_length),
        Error::OutOfRange { index, size } => render_out_of_range(*index, *size),
        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}

## Fix

Correct `.docgraph.toml`, or delete it to use the defaults.
"),
        Error::Unencodable { reason } => format!("\
# Error: Cannot Encode Graph

{reason}
"),
    }
}

fn render_corrupt_stream(reason: &str) -> String {
    format!("\
# Error: Corrupt Graph File

{reason}

## Fix

Regenerate the graph file:

    docgraph scan <dir> -o <file>
")
}

fn render_invalid_name(file: &str, reason: &str) -> String {
    format!("\
# Error: Invalid Document Name

`{file}`: {reason}

## Fix

Rename the file to `PREFIX-<subsystem>-R<revision>-<name>`, or set `prefix`
in `.docgraph.toml` if the documents use a different prefix.
")
}

fn render_match(query: &str, min_match_length: usize) -> String {
    if min_match_length == 0 {
        return format!("\
# Error: Invalid Minimum Match Length

The minimum match length for `{query}` is 0. It must be at least 1.

## Fix

Pass a positive minimum:

    docgraph suggest <file> <query> --min <n>
");
    }
    format!("\
# Error: Query Too Short

`{query}` has fewer than {min_match_length} characters.

## Fix

Use a longer query, or lower the minimum:

    docgraph suggest <file> <query> --min <n>
")
}

fn render_out_of_range(index: usize, size: usize) -> String {
    let valid = match size {
        0 => "The graph has no documents.".to_string(),
        n => format!("Valid indices are 0 to {}.", n.saturating_sub(1)),
    };
    format!("\
# Error: No Such Document

Index {index} is out of range. {valid}

## Fix

List the documents and their indices:

    docgraph show <file>
")
}
