/// Core identity types: subsystems, document identities, and arena handles.
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;

/// File name prefix used when no other prefix is configured.
pub const DEFAULT_PREFIX: &str = "REGS";

/// Pattern for the default prefix, compiled once.
static DEFAULT_PATTERN: LazyLock<NamePattern> = LazyLock::new(|| return NamePattern::new(DEFAULT_PREFIX));

/// The subsystems a controlled document can belong to. The ordinal is the
/// number embedded in the file name and the byte written to the wire.
#[allow(clippy::arbitrary_source_item_ordering, reason = "variants follow their wire ordinals")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subsystem {
    /// Ordinal 0.
    Systems,
    /// Ordinal 1.
    Goes,
    /// Ordinal 2.
    Qfh,
    /// Ordinal 3.
    Yagi,
    /// Ordinal 4.
    AdsB,
    /// Ordinal 5.
    Atc,
}

impl Subsystem {
    /// All subsystems in ordinal order.
    pub const ALL: [Self; 6] = [Self::Systems, Self::Goes, Self::Qfh, Self::Yagi, Self::AdsB, Self::Atc];

    /// Look up a subsystem by ordinal. `None` past the last known subsystem.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        return Self::ALL.get(usize::from(ordinal)).copied();
    }

    /// The ordinal used in file names and on the wire.
    pub const fn ordinal(self) -> u8 {
        return match self {
            Self::Systems => 0,
            Self::Goes => 1,
            Self::Qfh => 2,
            Self::Yagi => 3,
            Self::AdsB => 4,
            Self::Atc => 5,
        };
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Systems => "Systems",
            Self::Goes => "GOES",
            Self::Qfh => "QFH",
            Self::Yagi => "Yagi",
            Self::AdsB => "ADS-B",
            Self::Atc => "ATC",
        };
        return f.write_str(label);
    }
}

/// Identity of a document within a graph.
///
/// Equality and hashing use `name` and `revision` only. The subsystem is
/// carried for display and persistence but two identities that differ only
/// in subsystem are the same document.
#[derive(Debug, Clone)]
pub struct DocumentId {
    /// Document name: everything after the revision segment of the file name.
    pub name: String,
    /// Revision number from the `R{n}` segment.
    pub revision: u8,
    /// Subsystem the document belongs to.
    pub subsystem: Subsystem,
}

impl DocumentId {
    /// Build an identity directly from its parts.
    pub fn new(subsystem: Subsystem, revision: u8, name: impl Into<String>) -> Self {
        return Self { name: name.into(), revision, subsystem };
    }

    /// Parse an identity from a file name using the default `REGS` prefix.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidNameFormat` if the name does not match the
    /// pattern, the subsystem is unknown, or the revision exceeds 255.
    pub fn from_file_name(file_name: &str) -> Result<Self, Error> {
        return DEFAULT_PATTERN.parse(file_name);
    }

    /// Parse an identity from a file name with a custom prefix.
    ///
    /// # Errors
    ///
    /// Same as [`DocumentId::from_file_name`].
    pub fn from_file_name_with_prefix(file_name: &str, prefix: &str) -> Result<Self, Error> {
        if prefix == DEFAULT_PREFIX {
            return DEFAULT_PATTERN.parse(file_name);
        }
        return NamePattern::new(prefix).parse(file_name);
    }
}

impl PartialEq for DocumentId {
    fn eq(&self, other: &Self) -> bool {
        return self.name == other.name && self.revision == other.revision;
    }
}

impl Eq for DocumentId {}

impl Hash for DocumentId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.revision.hash(state);
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{} rev {} ({})", self.name, self.revision, self.subsystem);
    }
}

/// Handle to a document inside a [`crate::graph::ReferenceGraph`]. It is the
/// document's insertion position, which is also its index on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocIndex(
    /// Zero-based insertion position.
    pub usize,
);

impl fmt::Display for DocIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "#{}", self.0);
    }
}

/// Compiled `PREFIX-{subsystem}-R{revision}-{name}` matcher.
struct NamePattern {
    /// Literal prefix the file name must start with.
    prefix: String,
    /// Anchored regex with three captures: subsystem, revision, name.
    regex: Regex,
}

impl NamePattern {
    /// Compile the pattern for a prefix. The prefix is escaped, so any text is accepted.
    ///
    /// # Panics
    ///
    /// Panics if the generated regex is invalid (cannot happen for an escaped prefix).
    #[allow(clippy::expect_used, reason = "escaped prefix always yields a valid regex")]
    fn new(prefix: &str) -> Self {
        let source = format!(r"^{}-(\d+)-R(\d+)-(.+)$", regex::escape(prefix));
        return Self { prefix: prefix.to_string(), regex: Regex::new(&source).expect("valid regex") };
    }

    /// Split a file name into an identity.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidNameFormat` on any pattern or range violation.
    fn parse(&self, file_name: &str) -> Result<DocumentId, Error> {
        let invalid = |reason: String| {
            return Error::InvalidNameFormat { file: Path::new(file_name).to_path_buf(), reason };
        };

        let Some(caps) = self.regex.captures(file_name) else {
            return Err(invalid(format!("expected `{}-{{subsystem}}-R{{revision}}-{{name}}`", self.prefix)));
        };

        // Digits that overflow u8 are out of range for both fields.
        let subsystem = caps[1]
            .parse::<u8>()
            .ok()
            .and_then(Subsystem::from_ordinal)
            .ok_or_else(|| return invalid(format!("unknown subsystem number {}", &caps[1])))?;
        let revision = caps[2]
            .parse::<u8>()
            .map_err(|_err| return invalid(format!("revision {} exceeds 255", &caps[2])))?;

        return Ok(DocumentId { name: caps[3].to_string(), revision, subsystem });
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn parses_default_prefix() {
        let id = DocumentId::from_file_name("REGS-2-R1-AntennaSpec.docx").unwrap();
        assert_eq!(id.subsystem, Subsystem::Qfh);
        assert_eq!(id.revision, 1);
        assert_eq!(id.name, "AntennaSpec.docx");
    }

    #[test]
    fn rejects_missing_revision_segment() {
        let err = DocumentId::from_file_name("REGS-2-AntennaSpec.docx").unwrap_err();
        assert!(matches!(err, Error::InvalidNameFormat { .. }));
        assert!(err.to_string().contains("REGS-{subsystem}-R{revision}-{name}"));
    }

    #[test]
    fn rejects_unknown_subsystem() {
        assert!(DocumentId::from_file_name("REGS-6-R1-Foo").is_err());
        assert!(DocumentId::from_file_name("REGS-999999999999-R1-Foo").is_err());
        assert!(DocumentId::from_file_name("REGS-5-R1-Foo").is_ok());
    }

    #[test]
    fn rejects_revision_beyond_a_byte() {
        assert!(DocumentId::from_file_name("REGS-0-R256-Foo").is_err());
        assert!(DocumentId::from_file_name("REGS-0-R255-Foo").is_ok());
    }

    #[test]
    fn custom_prefix_is_escaped() {
        let id = DocumentId::from_file_name_with_prefix("A.B-1-R3-Plan", "A.B").unwrap();
        assert_eq!(id.subsystem, Subsystem::Goes);
        assert!(DocumentId::from_file_name_with_prefix("AxB-1-R3-Plan", "A.B").is_err());
    }

    #[test]
    fn equality_ignores_subsystem() {
        let a = DocumentId::new(Subsystem::Systems, 4, "Plan");
        let b = DocumentId::new(Subsystem::Atc, 4, "Plan");
        let c = DocumentId::new(Subsystem::Systems, 5, "Plan");
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<DocumentId> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn subsystem_ordinals_round_trip() {
        for subsystem in Subsystem::ALL {
            assert_eq!(Subsystem::from_ordinal(subsystem.ordinal()), Some(subsystem));
        }
        assert_eq!(Subsystem::from_ordinal(6), None);
        assert_eq!(Subsystem::AdsB.to_string(), "ADS-B");
    }
}
