use crate::domain::errors::DiscoveryError;
use crate::domain::sample::LoadLevel;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// `results_<N>users.csv`. The capture is validated separately so that a
/// non-numeric middle segment is reported instead of silently skipped.
static RESULT_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^results_(.*)users\.csv$").expect("result file pattern is a valid regex")
});

/// A result file and the load level encoded in its name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DiscoveredSource {
    pub load_level: LoadLevel,
    pub path: PathBuf,
}

pub struct FileDiscovery;

impl FileDiscovery {
    /// Lists matching files in `dir`, sorted by load level then path.
    ///
    /// An empty result means "no data" and is not an error.
    pub fn discover(dir: &Path) -> Result<Vec<DiscoveredSource>, DiscoveryError> {
        let entries = fs::read_dir(dir).map_err(|source| DiscoveryError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut sources = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| DiscoveryError::ReadDir {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(load_level) = Self::parse_file_name(file_name)? {
                debug!("Discovered {} ({} users)", file_name, load_level);
                sources.push(DiscoveredSource { load_level, path });
            }
        }

        sources.sort();
        Ok(sources)
    }

    /// `Ok(None)` for names outside the convention, an error for names that
    /// match the prefix and suffix around something other than an integer.
    pub fn parse_file_name(file_name: &str) -> Result<Option<LoadLevel>, DiscoveryError> {
        let Some(captures) = RESULT_FILE.captures(file_name) else {
            return Ok(None);
        };
        let segment = captures.get(1).map_or("", |m| m.as_str());

        let invalid = || DiscoveryError::InvalidLoadLevel {
            file_name: file_name.to_string(),
            segment: segment.to_string(),
        };

        // `u32::from_str` would also accept a leading '+'
        if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        segment.parse::<LoadLevel>().map(Some).map_err(|_| invalid())
    }
}
