use std::{io, path::PathBuf};

/// Errors raised while building or driving a [`LogSession`](crate::LogSession).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The log file or its directory cannot be created or opened.
    #[error("Log file unavailable at {}: {source}", path.display())]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A row could not be written to the sink. Row 0 is the header.
    #[error("Failed to write row {row}: {source}")]
    WriteFailure {
        row: u64,
        #[source]
        source: io::Error,
    },
    #[error("Invalid field order: {0}")]
    InvalidFieldOrder(#[from] FieldOrderError),
    #[error("Log session is already closed.")]
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldOrderError {
    #[error("no fields declared")]
    Empty,
    #[error("field {0:?} listed more than once")]
    DuplicateField(String),
    #[error("column label {0:?} used more than once")]
    DuplicateLabel(String),
    #[error("field order declared more than once")]
    DeclaredTwice,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
