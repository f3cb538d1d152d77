//! Error type for collection loading.

use std::path::PathBuf;

use refolio_bibtex::ParseError;

/// Why a single `.bib` file yielded no references.
///
/// The collection loader logs these and moves on; `refolio check` surfaces
/// them per file.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("could not read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}
