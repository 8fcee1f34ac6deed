//! Version selection among files sharing a base name.
//!
//! `반A.xlsx`, `반A-1.xlsx` and `반A_v2.xlsx` are three revisions of the
//! same roster; only the highest one is consolidated.

use indexmap::IndexMap;
use regex::Regex;
use std::path::{Path, PathBuf};

fn version_patterns() -> &'static [Regex] {
    static RE: std::sync::OnceLock<Vec<Regex>> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        [
            r"^(.+)-(\d+)$",
            r"^(.+)_v(\d+)$",
            r"^(.+)_ver(\d+)$",
            r"^(.+)\((\d+)\)$",
            r"^(.+)_(\d+)$",
            r"^(.+)-v(\d+)$",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
    })
}

/// An input file with its parsed version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub base_name: String,
    /// 0 when the name carries no version marker
    pub version: u64,
}

impl VersionedFile {
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (base_name, version) = parse_version(&stem);
        Self {
            path: path.to_path_buf(),
            file_name,
            base_name,
            version,
        }
    }
}

/// Result of [`select_latest`].
#[derive(Debug, Clone, Default)]
pub struct VersionSelection {
    /// One file per base name, in first-seen group order
    pub selected: Vec<VersionedFile>,
    /// Lower versions superseded by a selected file
    pub excluded: Vec<VersionedFile>,
    /// Files tying the selected file's version
    pub duplicates: Vec<VersionedFile>,
}

impl VersionSelection {
    /// The selected file sharing `file`'s base name
    #[must_use]
    pub fn winner_for(&self, file: &VersionedFile) -> Option<&VersionedFile> {
        self.selected.iter().find(|s| s.base_name == file.base_name)
    }
}

/// Split a file stem into base name and version number.
///
/// ```
/// use rollbook_merge::parse_version;
///
/// assert_eq!(parse_version("반A-2"), ("반A".to_string(), 2));
/// assert_eq!(parse_version("반A(3)"), ("반A".to_string(), 3));
/// assert_eq!(parse_version("반A"), ("반A".to_string(), 0));
/// ```
#[must_use]
pub fn parse_version(stem: &str) -> (String, u64) {
    for pattern in version_patterns() {
        let Some(caps) = pattern.captures(stem) else {
            continue;
        };
        let (Some(base), Some(digits)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        if let Ok(version) = digits.as_str().parse::<u64>() {
            return (base.as_str().to_string(), version);
        }
    }
    (stem.to_string(), 0)
}

/// Keep the highest version of each base name.
#[must_use]
pub fn select_latest(files: &[PathBuf]) -> VersionSelection {
    let mut groups: IndexMap<String, Vec<VersionedFile>> = IndexMap::new();
    for path in files {
        let file = VersionedFile::from_path(path);
        groups.entry(file.base_name.clone()).or_default().push(file);
    }

    let mut selection = VersionSelection::default();
    for (base_name, members) in groups {
        let Some(best) = members.iter().map(|f| f.version).max() else {
            continue;
        };
        let mut winner: Option<VersionedFile> = None;
        for file in members {
            if file.version < best {
                selection.excluded.push(file);
            } else if winner.is_none() {
                winner = Some(file);
            } else {
                selection.duplicates.push(file);
            }
        }
        if let Some(winner) = winner {
            tracing::info!(
                "Selected {} (version {}) for base name '{}'",
                winner.file_name,
                winner.version,
                base_name
            );
            selection.selected.push(winner);
        }
    }

    for file in &selection.excluded {
        tracing::info!("Excluded older version {}", file.file_name);
    }
    selection
}
