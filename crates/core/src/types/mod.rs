//! Domain types for Libris
//!
//! This module contains all domain models organized by responsibility:
//! - `book`: Book, category and circulation status
//! - `reader`: Library patrons
//! - `record`: Borrow records and reservations
//! - `stats`: Library statistics
//! - `common`: Date helpers and the validation trait

mod book;
mod common;
mod reader;
mod record;
mod stats;

// Re-export all public types
pub use book::{Book, BookCategory, BookStatus};
pub use common::{format_date, parse_date, Validator, DATE_FORMAT};
pub use reader::Reader;
pub use record::{BorrowRecord, Reservation, LOAN_PERIOD_DAYS};
pub use stats::LibraryStats;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_all_types_are_exported() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let _book = Book::new("B1", "T", "A", BookCategory::Other, 1, 1);
        let _reader = Reader::new("R1", "N", "D", "P", date);
        let _record = BorrowRecord::new("R1", "B1", date);
        let _reservation = Reservation::new("R1", "B1");
        let _stats = LibraryStats::default();
    }

    #[test]
    fn test_date_helpers_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2023, 11, 30).unwrap();
        assert_eq!(parse_date(&format_date(date)), Some(date));
    }
}
