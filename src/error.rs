use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading contacts or building the lookup table.
#[derive(Debug, Error)]
pub enum ContactsError {
    /// The contacts export does not exist.
    #[error("contacts file not found: {}", .0.display())]
    Missing(PathBuf),

    /// The contacts export exists but could not be read.
    #[error("failed to read contacts file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row could not be decoded, or a required column is absent.
    #[error("failed to parse contacts file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Two contacts claim the same key under `ConflictPolicy::Reject`.
    #[error("key {key:?} maps to both {existing:?} and {incoming:?}")]
    Conflict {
        key: String,
        existing: String,
        incoming: String,
    },
}
