//! Loan and reservation records

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Length of a loan in days
pub const LOAN_PERIOD_DAYS: u64 = 30;

/// One loan of one copy of a book to a reader.
///
/// Dates are fixed at creation; the only mutation is closing the loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowRecord {
    reader_id: String,
    book_id: String,
    borrow_date: NaiveDate,
    due_date: NaiveDate,
    return_date: Option<NaiveDate>,
}

impl BorrowRecord {
    /// Opens a loan on `borrow_date`, due [`LOAN_PERIOD_DAYS`] later
    pub fn new(
        reader_id: impl Into<String>,
        book_id: impl Into<String>,
        borrow_date: NaiveDate,
    ) -> Self {
        let due_date = borrow_date
            .checked_add_days(Days::new(LOAN_PERIOD_DAYS))
            .unwrap_or(NaiveDate::MAX);
        Self::from_parts(reader_id, book_id, borrow_date, due_date, None)
    }

    /// Rebuilds a record with explicit dates (used when loading)
    pub fn from_parts(
        reader_id: impl Into<String>,
        book_id: impl Into<String>,
        borrow_date: NaiveDate,
        due_date: NaiveDate,
        return_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            reader_id: reader_id.into(),
            book_id: book_id.into(),
            borrow_date,
            due_date,
            return_date,
        }
    }

    pub fn reader_id(&self) -> &str {
        &self.reader_id
    }

    pub fn book_id(&self) -> &str {
        &self.book_id
    }

    pub fn borrow_date(&self) -> NaiveDate {
        self.borrow_date
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn return_date(&self) -> Option<NaiveDate> {
        self.return_date
    }

    pub fn is_returned(&self) -> bool {
        self.return_date.is_some()
    }

    /// True when the loan is still open and was due before `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_returned() && self.due_date < today
    }

    /// True when this is an open loan of `book_id` to `reader_id`
    pub fn is_open_loan(&self, reader_id: &str, book_id: &str) -> bool {
        !self.is_returned() && self.reader_id == reader_id && self.book_id == book_id
    }

    /// Days past the due date as of `today`, zero when not overdue
    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        if self.is_overdue(today) {
            (today - self.due_date).num_days()
        } else {
            0
        }
    }

    /// Closes the loan
    pub fn mark_returned(&mut self, date: NaiveDate) {
        self.return_date = Some(date);
    }
}

/// A reader's claim on a book that had no copy on the shelf
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reservation {
    pub reader_id: String,
    pub book_id: String,
}

impl Reservation {
    pub fn new(reader_id: impl Into<String>, book_id: impl Into<String>) -> Self {
        Self {
            reader_id: reader_id.into(),
            book_id: book_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_due_date_is_thirty_days_out() {
        let record = BorrowRecord::new("R1", "B1", date(2024, 1, 10));
        assert_eq!(record.due_date(), date(2024, 2, 9));
        assert!(!record.is_returned());
    }

    #[test]
    fn test_overdue_is_strictly_after_due_date() {
        let record = BorrowRecord::new("R1", "B1", date(2024, 1, 1));
        let due = record.due_date();

        assert!(!record.is_overdue(due));
        assert!(record.is_overdue(due.succ_opt().unwrap()));
        assert_eq!(record.days_overdue(date(2024, 2, 10)), 10);
        assert_eq!(record.days_overdue(due), 0);
    }

    #[test]
    fn test_returned_record_is_never_overdue() {
        let mut record = BorrowRecord::new("R1", "B1", date(2024, 1, 1));
        record.mark_returned(date(2024, 3, 1));

        assert!(record.is_returned());
        assert_eq!(record.return_date(), Some(date(2024, 3, 1)));
        assert!(!record.is_overdue(date(2025, 1, 1)));
    }

    #[test]
    fn test_is_open_loan() {
        let mut record = BorrowRecord::new("R1", "B1", date(2024, 1, 1));
        assert!(record.is_open_loan("R1", "B1"));
        assert!(!record.is_open_loan("R2", "B1"));
        assert!(!record.is_open_loan("R1", "B2"));

        record.mark_returned(date(2024, 1, 2));
        assert!(!record.is_open_loan("R1", "B1"));
    }

    #[test]
    fn test_due_date_saturates() {
        let record = BorrowRecord::new("R1", "B1", NaiveDate::MAX);
        assert_eq!(record.due_date(), NaiveDate::MAX);
    }
}
