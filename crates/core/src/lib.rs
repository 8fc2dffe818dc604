//! Libris core domain types
//!
//! Value types shared by the library-state engine, the settings store and the
//! command line shell: books, readers, loans, reservations and statistics.

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{ErrorKind, LibraryError, LibraryResult};
pub use types::{
    format_date, parse_date, Book, BookCategory, BookStatus, BorrowRecord, LibraryStats, Reader,
    Reservation, Validator, DATE_FORMAT, LOAN_PERIOD_DAYS,
};
