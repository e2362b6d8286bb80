//! Directory scanning: one document per file whose name carries an identity.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;
use crate::document::Document;
use crate::error::Error;
use crate::graph::ReferenceGraph;

/// A file the scan could not turn into a document.
#[derive(Debug)]
pub struct SkippedFile {
    /// Why it was skipped, usually `Error::InvalidNameFormat`.
    pub error: Error,
    /// The file that was skipped.
    pub path: PathBuf,
}

/// Result of a scan: the populated graph and every file left out of it.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// One document per accepted file, in scan order.
    pub graph: ReferenceGraph,
    /// Files whose names did not parse or could not be read.
    pub skipped: Vec<SkippedFile>,
}

/// Walk `root` recursively and add a document for every regular file whose
/// name matches the configured identity pattern.
///
/// Files are visited in file-name order within each directory, so the same
/// tree always yields the same document order. The config's include/exclude
/// filters apply to paths relative to `root`. A file whose name does not
/// parse is reported in `skipped` and the scan continues.
///
/// # Errors
///
/// Returns `Error::Io` if `root` does not exist or is not a directory.
pub fn scan(root: &Path, config: &Config) -> Result<ScanReport, Error> {
    if !std::fs::metadata(root)?.is_dir() {
        let reason = format!("{} is not a directory", root.display());
        return Err(Error::Io(std::io::Error::new(std::io::ErrorKind::NotADirectory, reason)));
    }
    let mut report = ScanReport::default();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                tracing::warn!(path = %path.display(), "unreadable directory entry");
                report.skipped.push(SkippedFile { error: Error::Io(e.into()), path });
                continue;
            },
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if !config.should_scan(&relative.to_string_lossy()) {
            continue;
        }

        match Document::create_with_prefix(path, &config.prefix) {
            Ok(doc) => {
                let index = report.graph.add_document(doc);
                tracing::debug!(document = %index, path = %path.display(), "added document");
            },
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "skipping file");
                report.skipped.push(SkippedFile { error, path: path.to_path_buf() });
            },
        }
    }

    tracing::info!(documents = report.graph.size(), skipped = report.skipped.len(), "scan complete");
    return Ok(report);
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;
    use crate::types::DocIndex;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, "").unwrap();
    }

    #[test]
    fn scans_in_stable_order_and_reports_bad_names() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b/REGS-1-R1-Beta.txt");
        touch(dir.path(), "a/REGS-0-R2-Alpha.txt");
        touch(dir.path(), "a/notes.txt");
        touch(dir.path(), "a/REGS-9-R1-BadSubsystem.txt");

        let report = scan(dir.path(), &Config::default()).unwrap();
        let names: Vec<&str> = report.graph.iter().map(|(_, d)| return d.name()).collect();
        assert_eq!(names, ["Alpha.txt", "Beta.txt"]);

        let skipped: Vec<String> = report
            .skipped
            .iter()
            .map(|s| return s.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(skipped, ["REGS-9-R1-BadSubsystem.txt", "notes.txt"]);
        assert!(report.skipped.iter().all(|s| return matches!(s.error, Error::InvalidNameFormat { .. })));
    }

    #[test]
    fn honours_include_exclude_and_prefix() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "controlled/SPEC-0-R1-Kept.txt");
        touch(dir.path(), "controlled/archive/SPEC-0-R1-Old.txt");
        touch(dir.path(), "drafts/SPEC-0-R1-Draft.txt");

        let config = Config::parse(
            "prefix = \"SPEC\"\ninclude = [\"controlled\"]\nexclude = [\"controlled/archive\"]\n",
        )
        .unwrap();
        let report = scan(dir.path(), &config).unwrap();
        assert_eq!(report.graph.size(), 1);
        assert_eq!(report.graph.get(DocIndex(0)).unwrap().name(), "Kept.txt");
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(scan(&dir.path().join("absent"), &Config::default()), Err(Error::Io(_))));
    }

    #[test]
    fn file_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "REGS-0-R1-Alone.txt");
        let result = scan(&dir.path().join("REGS-0-R1-Alone.txt"), &Config::default());
        assert!(matches!(result, Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotADirectory));
    }
}
