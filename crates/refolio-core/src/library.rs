//! Filesystem collection loader.
//!
//! A collection is one folder of `.bib` files. Files are read in file-name
//! order so the concatenated record list (and therefore sort tie-breaks) is
//! deterministic across platforms. A missing folder is an empty collection,
//! not an error; a file that fails to read or parse is logged and skipped
//! so the rest of the folder still renders.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::LibraryError;
use crate::record::Reference;

/// One loaded folder of references.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Folder name the references came from.
    pub name: String,
    pub references: Vec<Reference>,
}

impl Collection {
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }
}

/// List the `.bib` files in a folder, sorted by file name.
///
/// A missing or unreadable folder yields an empty list.
pub fn bib_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("bib"))
        })
        .collect();
    files.sort();
    files
}

/// Parse one `.bib` file into references.
pub fn parse_file(path: &Path) -> Result<Vec<Reference>, LibraryError> {
    let content = fs::read_to_string(path).map_err(|source| LibraryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entries = refolio_bibtex::parse(&content).map_err(|source| LibraryError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(entries.into_iter().map(Reference::from).collect())
}

/// Load every `.bib` file in a folder into one collection.
pub fn load_collection(dir: &Path) -> Collection {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut references = Vec::new();
    for path in bib_files(dir) {
        match parse_file(&path) {
            Ok(mut parsed) => {
                debug!(file = %path.display(), count = parsed.len(), "loaded bib file");
                references.append(&mut parsed);
            }
            Err(err) => {
                warn!(file = %path.display(), error = %err, "skipping bib file");
            }
        }
    }

    Collection { name, references }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_folder_is_empty() {
        let collection = load_collection(Path::new("/no/such/folder"));
        assert!(collection.is_empty());
        assert_eq!(collection.len(), 0);
    }
}
