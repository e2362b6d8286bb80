use std::path::Path;

use crate::error::Error;
use crate::matcher::DEFAULT_MIN_MATCH_LENGTH;
use crate::types::DEFAULT_PREFIX;

/// Project configuration loaded from `.docgraph.toml`.
/// Include/exclude patterns are path prefixes applied to scanned files.
#[derive(Debug, Clone)]
pub struct Config {
    /// Lowest prefix score the automatic resolver accepts.
    pub auto_accept_score: usize,
    /// Path prefixes to skip.
    exclude: Vec<String>,
    /// Path prefixes to scan; empty means everything.
    include: Vec<String>,
    /// Shortest prefix that counts as a match when suggesting documents.
    pub min_match_length: usize,
    /// File name prefix of controlled documents.
    pub prefix: String,
}

/// Raw TOML structure for `.docgraph.toml`.
#[derive(serde::Deserialize)]
struct DocgraphTomlConfig {
    auto_accept_score: Option<usize>,
    #[serde(default)]
    exclude: Vec<String>,
    #[serde(default)]
    include: Vec<String>,
    min_match_length: Option<usize>,
    prefix: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            auto_accept_score: DEFAULT_MIN_MATCH_LENGTH,
            exclude: Vec::new(),
            include: Vec::new(),
            min_match_length: DEFAULT_MIN_MATCH_LENGTH,
            prefix: DEFAULT_PREFIX.to_string(),
        };
    }
}

impl Config {
    /// Load config from `.docgraph.toml` in the given root directory.
    /// Returns the defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; a config the
    /// user wrote is never silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(".docgraph.toml");
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };
        return Self::parse(&content);
    }

    /// Parse config from TOML text, filling unset fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: DocgraphTomlConfig = toml::from_str(content)?;
        let defaults = Self::default();
        return Ok(Self {
            auto_accept_score: raw.auto_accept_score.unwrap_or(defaults.auto_accept_score),
            exclude: raw.exclude,
            include: raw.include,
            min_match_length: raw.min_match_length.unwrap_or(defaults.min_match_length),
            prefix: raw.prefix.unwrap_or(defaults.prefix),
        });
    }

    /// Check whether a file path, relative to the scan root, should be scanned.
    ///
    /// A path is included if no include patterns are set (scan everything),
    /// or if the path starts with at least one include pattern.
    /// An included path is then excluded if it starts with any exclude pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| return relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        return !self.exclude.iter().any(|p| return relative_path.starts_with(p.as_str()));
    }
}
