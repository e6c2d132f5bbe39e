use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the optimize pipeline. All of them abort the run.
#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("compilation database not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("failed to read {}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed compilation database {}", .path.display())]
    MalformedJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("entry #{index} in {} has neither `arguments` nor `command`", .path.display())]
    MalformedEntry { path: PathBuf, index: usize },

    #[error("failed to walk project tree")]
    Walk(#[from] ignore::Error),

    #[error("failed to write {}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize {}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
