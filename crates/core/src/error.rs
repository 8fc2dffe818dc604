//! Error types for Libris
//!
//! Every failing catalog or circulation operation reports one of four kinds:
//! - **DuplicateKey**: an add targeted an id that is already taken
//! - **NotFound**: an operation targeted a missing book or reader
//! - **RuleViolation**: a circulation rule refused the request
//! - **Io**: the data file could not be read or written
//!
//! None of them is fatal; the state is left as it was before the call.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Broad classification of a [`LibraryError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DuplicateKey,
    NotFound,
    RuleViolation,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateKey => write!(f, "Duplicate key"),
            Self::NotFound => write!(f, "Not found"),
            Self::RuleViolation => write!(f, "Rule violation"),
            Self::Io => write!(f, "I/O failure"),
        }
    }
}

/// Main error type for Libris
#[derive(Error, Debug)]
pub enum LibraryError {
    // ===== Catalog Errors =====
    #[error("Book already exists: {0}")]
    DuplicateBook(String),

    #[error("Reader already exists: {0}")]
    DuplicateReader(String),

    #[error("Book not found: {0}")]
    BookNotFound(String),

    #[error("Reader not found: {0}")]
    ReaderNotFound(String),

    // ===== Circulation Errors =====
    #[error("No copies of {0} are available")]
    NoCopiesAvailable(String),

    #[error("Every copy of {book} is already on the shelf (reader {reader})")]
    NothingToReturn { reader: String, book: String },

    #[error("Reader {reader} has no open loan of {book}")]
    NoActiveLoan { reader: String, book: String },

    #[error("Book {0} cannot be reserved: copies are available or it is already reserved")]
    ReservationUnavailable(String),

    // ===== Persistence Errors =====
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not determine data directory: {0}")]
    PathResolution(String),
}

impl LibraryError {
    /// Returns the classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateBook(_) | Self::DuplicateReader(_) => ErrorKind::DuplicateKey,
            Self::BookNotFound(_) | Self::ReaderNotFound(_) => ErrorKind::NotFound,
            Self::NoCopiesAvailable(_)
            | Self::NothingToReturn { .. }
            | Self::NoActiveLoan { .. }
            | Self::ReservationUnavailable(_) => ErrorKind::RuleViolation,
            Self::Io { .. } | Self::PathResolution(_) => ErrorKind::Io,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_rule_violation(&self) -> bool {
        self.kind() == ErrorKind::RuleViolation
    }

    /// Returns a short message suitable for the presentation layer
    pub fn user_message(&self) -> String {
        match self {
            Self::DuplicateBook(id) => format!("A book with ID {} already exists.", id),
            Self::DuplicateReader(id) => format!("A reader with ID {} already exists.", id),
            Self::BookNotFound(id) => format!("No book with ID {}.", id),
            Self::ReaderNotFound(id) => format!("No reader with ID {}.", id),
            Self::NoCopiesAvailable(_) => {
                "All copies are on loan. The book can be reserved instead.".to_string()
            }
            Self::NothingToReturn { .. } | Self::NoActiveLoan { .. } => {
                "There is no matching loan to return.".to_string()
            }
            Self::ReservationUnavailable(_) => {
                "Only books with no copy on the shelf can be reserved.".to_string()
            }
            Self::Io { path, .. } => format!("Could not access {}.", path.display()),
            Self::PathResolution(_) => "Could not locate the application data folder.".to_string(),
        }
    }

    /// Wraps an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience type alias for Results using LibraryError
pub type LibraryResult<T> = std::result::Result<T, LibraryError>;
