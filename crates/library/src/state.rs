//! The library-state engine
//!
//! [`LibraryState`] owns every book, reader, loan record and reservation,
//! enforces the borrowing protocol and tells its observers about changes.

use crate::clock::SimulatedClock;
use crate::observers::{LibraryEvent, LibraryObserver, ObserverRegistry, SubscriptionId};
use crate::query::BookQuery;
use chrono::NaiveDate;
use libris_core::{
    Book, BookCategory, BorrowRecord, LibraryError, LibraryResult, LibraryStats, Reader,
    Reservation,
};
use log::{debug, info};
use std::collections::BTreeMap;

/// In-memory library: catalog, readers, circulation history and clock
#[derive(Debug, Default)]
pub struct LibraryState {
    pub(crate) books: BTreeMap<String, Book>,
    pub(crate) readers: BTreeMap<String, Reader>,
    pub(crate) borrow_records: Vec<BorrowRecord>,
    pub(crate) reservations: Vec<Reservation>,
    pub(crate) clock: SimulatedClock,
    observers: ObserverRegistry,
}

impl LibraryState {
    /// Creates an empty library on the real clock
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty library using `clock`
    pub fn with_clock(clock: SimulatedClock) -> Self {
        Self {
            clock,
            ..Self::default()
        }
    }

    // ===== Books =====

    pub fn add_book(&mut self, book: Book) -> LibraryResult<()> {
        if self.books.contains_key(&book.id) {
            return Err(LibraryError::DuplicateBook(book.id));
        }
        debug!("Adding book {}", book.id);
        self.books.insert(book.id.clone(), book);
        self.notify_changed();
        Ok(())
    }

    /// Removes a book and returns it. Loan records that mention it are kept.
    pub fn remove_book(&mut self, id: &str) -> LibraryResult<Book> {
        let book = self
            .books
            .remove(id)
            .ok_or_else(|| LibraryError::BookNotFound(id.to_string()))?;
        debug!("Removed book {}", id);
        self.notify_changed();
        Ok(book)
    }

    /// Replaces the stored book that has the same id
    pub fn update_book(&mut self, book: Book) -> LibraryResult<()> {
        let slot = self
            .books
            .get_mut(&book.id)
            .ok_or_else(|| LibraryError::BookNotFound(book.id.clone()))?;
        debug!("Updating book {}", book.id);
        *slot = book;
        self.notify_changed();
        Ok(())
    }

    pub fn find_book(&self, id: &str) -> LibraryResult<&Book> {
        self.books
            .get(id)
            .ok_or_else(|| LibraryError::BookNotFound(id.to_string()))
    }

    /// All books, ordered by id
    pub fn books(&self) -> impl Iterator<Item = &Book> + '_ {
        self.books.values()
    }

    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    pub fn search_books(&self, query: &BookQuery) -> Vec<&Book> {
        self.books.values().filter(|book| query.matches(book)).collect()
    }

    // ===== Readers =====

    pub fn add_reader(&mut self, reader: Reader) -> LibraryResult<()> {
        if self.readers.contains_key(&reader.id) {
            return Err(LibraryError::DuplicateReader(reader.id));
        }
        debug!("Adding reader {}", reader.id);
        self.readers.insert(reader.id.clone(), reader);
        self.notify_changed();
        Ok(())
    }

    /// Adds a reader registered on the library's current date
    pub fn register_reader(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        dept: impl Into<String>,
        phone: impl Into<String>,
    ) -> LibraryResult<()> {
        let reader = Reader::new(id, name, dept, phone, self.current_date());
        self.add_reader(reader)
    }

    /// Removes a reader and returns it. Loan records and reservations are kept.
    pub fn remove_reader(&mut self, id: &str) -> LibraryResult<Reader> {
        let reader = self
            .readers
            .remove(id)
            .ok_or_else(|| LibraryError::ReaderNotFound(id.to_string()))?;
        debug!("Removed reader {}", id);
        self.notify_changed();
        Ok(reader)
    }

    pub fn update_reader(&mut self, reader: Reader) -> LibraryResult<()> {
        let slot = self
            .readers
            .get_mut(&reader.id)
            .ok_or_else(|| LibraryError::ReaderNotFound(reader.id.clone()))?;
        debug!("Updating reader {}", reader.id);
        *slot = reader;
        self.notify_changed();
        Ok(())
    }

    pub fn find_reader(&self, id: &str) -> LibraryResult<&Reader> {
        self.readers
            .get(id)
            .ok_or_else(|| LibraryError::ReaderNotFound(id.to_string()))
    }

    /// All readers, ordered by id
    pub fn readers(&self) -> impl Iterator<Item = &Reader> + '_ {
        self.readers.values()
    }

    pub fn search_readers(&self, keyword: &str) -> Vec<&Reader> {
        self.readers
            .values()
            .filter(|reader| reader.matches_keyword(keyword))
            .collect()
    }

    // ===== Circulation =====

    /// Lends one copy of `book_id` to `reader_id`.
    ///
    /// The loan starts on `date`, or on the current date when `None`, and is
    /// due [`libris_core::LOAN_PERIOD_DAYS`] later.
    pub fn borrow_book(
        &mut self,
        reader_id: &str,
        book_id: &str,
        date: Option<NaiveDate>,
    ) -> LibraryResult<BorrowRecord> {
        let borrow_date = date.unwrap_or_else(|| self.current_date());
        let book = self
            .books
            .get_mut(book_id)
            .ok_or_else(|| LibraryError::BookNotFound(book_id.to_string()))?;

        if !book.borrow_copy() {
            return Err(LibraryError::NoCopiesAvailable(book_id.to_string()));
        }

        let record = BorrowRecord::new(reader_id, book_id, borrow_date);
        debug!(
            "Reader {} borrowed {} on {}, due {}",
            reader_id,
            book_id,
            borrow_date,
            record.due_date()
        );
        self.borrow_records.push(record.clone());
        self.notify_changed();
        Ok(record)
    }

    /// Takes back one copy and closes the oldest open loan of that book to that reader
    pub fn return_book(
        &mut self,
        reader_id: &str,
        book_id: &str,
        date: Option<NaiveDate>,
    ) -> LibraryResult<BorrowRecord> {
        let return_date = date.unwrap_or_else(|| self.current_date());
        let book = self
            .books
            .get_mut(book_id)
            .ok_or_else(|| LibraryError::BookNotFound(book_id.to_string()))?;

        if book.available_copies() >= book.total_copies() {
            return Err(LibraryError::NothingToReturn {
                reader: reader_id.to_string(),
                book: book_id.to_string(),
            });
        }

        let record = self
            .borrow_records
            .iter_mut()
            .find(|record| record.is_open_loan(reader_id, book_id))
            .ok_or_else(|| LibraryError::NoActiveLoan {
                reader: reader_id.to_string(),
                book: book_id.to_string(),
            })?;

        book.return_copy();
        record.mark_returned(return_date);
        let closed = record.clone();

        debug!("Reader {} returned {} on {}", reader_id, book_id, return_date);
        self.notify_changed();
        Ok(closed)
    }

    /// Reserves a book that has no copy on the shelf.
    ///
    /// The reservation is recorded permanently; returning a copy later does
    /// not consume it.
    pub fn reserve_book(&mut self, reader_id: &str, book_id: &str) -> LibraryResult<()> {
        let book = self
            .books
            .get_mut(book_id)
            .ok_or_else(|| LibraryError::BookNotFound(book_id.to_string()))?;

        if !book.reserve() {
            return Err(LibraryError::ReservationUnavailable(book_id.to_string()));
        }

        debug!("Reader {} reserved {}", reader_id, book_id);
        self.reservations.push(Reservation::new(reader_id, book_id));
        self.notify_changed();
        Ok(())
    }

    // ===== Records =====

    /// Every loan record, in the order the loans were made
    pub fn borrow_records(&self) -> &[BorrowRecord] {
        &self.borrow_records
    }

    pub fn records_for_book(&self, book_id: &str) -> Vec<&BorrowRecord> {
        self.borrow_records
            .iter()
            .filter(|record| record.book_id() == book_id)
            .collect()
    }

    pub fn records_for_reader(&self, reader_id: &str) -> Vec<&BorrowRecord> {
        self.borrow_records
            .iter()
            .filter(|record| record.reader_id() == reader_id)
            .collect()
    }

    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    /// Ids of the readers who reserved `book_id`, in reservation order
    pub fn reservers_for_book(&self, book_id: &str) -> Vec<&str> {
        self.reservations
            .iter()
            .filter(|reservation| reservation.book_id == book_id)
            .map(|reservation| reservation.reader_id.as_str())
            .collect()
    }

    /// Open loans whose due date is before the current date
    pub fn overdue_records(&self) -> Vec<&BorrowRecord> {
        let today = self.current_date();
        self.borrow_records
            .iter()
            .filter(|record| record.is_overdue(today))
            .collect()
    }

    // ===== Clock =====

    /// The simulated date when one is set, otherwise the local calendar date
    pub fn current_date(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn set_current_date(&mut self, date: NaiveDate) {
        info!("Library clock set to {}", date);
        self.clock.set(date);
        self.notify_date_changed();
    }

    pub fn reset_to_real_time(&mut self) {
        info!("Library clock reset to real time");
        self.clock.reset();
        self.notify_date_changed();
    }

    pub fn is_using_custom_time(&self) -> bool {
        self.clock.is_overridden()
    }

    pub fn custom_date(&self) -> Option<NaiveDate> {
        self.clock.override_date()
    }

    pub fn clock(&self) -> &SimulatedClock {
        &self.clock
    }

    // ===== Statistics =====

    pub fn total_copies(&self) -> u64 {
        self.books.values().map(|b| u64::from(b.total_copies())).sum()
    }

    pub fn available_copies(&self) -> u64 {
        self.books.values().map(|b| u64::from(b.available_copies())).sum()
    }

    pub fn borrowed_copies(&self) -> u64 {
        self.total_copies() - self.available_copies()
    }

    /// Total copies per category; every category is present
    pub fn category_totals(&self) -> BTreeMap<BookCategory, u64> {
        let mut totals: BTreeMap<BookCategory, u64> =
            BookCategory::ALL.iter().map(|c| (*c, 0)).collect();
        for book in self.books.values() {
            *totals.entry(book.category).or_insert(0) += u64::from(book.total_copies());
        }
        totals
    }

    /// Number of categories holding at least one copy
    pub fn categories_in_use(&self) -> usize {
        self.category_totals().values().filter(|n| **n > 0).count()
    }

    pub fn reader_count(&self) -> usize {
        self.readers.len()
    }

    pub fn stats(&self) -> LibraryStats {
        let category_totals = self.category_totals();
        let categories_in_use = category_totals.values().filter(|n| **n > 0).count();
        let total_copies = self.total_copies();
        let available_copies = self.available_copies();

        LibraryStats {
            total_copies,
            available_copies,
            borrowed_copies: total_copies - available_copies,
            category_totals,
            categories_in_use,
            reader_count: self.readers.len(),
        }
    }

    // ===== Lifecycle =====

    /// Discards all data and the clock override
    pub fn clear_all_data(&mut self) {
        info!("Clearing all library data");
        self.reset_contents();
        self.notify_changed();
    }

    /// Registers an observer; the returned id unsubscribes it
    pub fn subscribe(&mut self, observer: impl LibraryObserver + 'static) -> SubscriptionId {
        self.observers.subscribe(Box::new(observer))
    }

    /// Returns false when `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn reset_contents(&mut self) {
        self.books.clear();
        self.readers.clear();
        self.borrow_records.clear();
        self.reservations.clear();
        self.clock.reset();
    }

    pub(crate) fn notify_changed(&self) {
        self.observers.notify(LibraryEvent::DataChanged);
    }

    fn notify_date_changed(&self) {
        self.observers
            .notify(LibraryEvent::CurrentDateChanged(self.current_date()));
        self.notify_changed();
    }
}
