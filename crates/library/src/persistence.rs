//! Tagged-section text format for the library data file
//!
//! ```text
//! #BOOKS
//! <count>
//! id,title,author,categoryIndex,totalCopies,availableCopies,statusIndex
//! #READERS
//! <count>
//! id,name,dept,phone,registerDate,isValid(0|1)
//! #BORROWS
//! <count>
//! readerId,bookId,borrowDate,dueDate,returnDate(empty when open)
//! #RESERVATIONS
//! <count>
//! readerId,bookId
//! #SETTINGS
//! <0|1>
//! [customDate]
//! ```
//!
//! Fields are joined by commas without escaping. Reading is lenient: bad
//! counts read as zero and malformed rows are skipped.

use crate::state::LibraryState;
use chrono::NaiveDate;
use directories::ProjectDirs;
use libris_core::{
    format_date, parse_date, Book, BookCategory, BookStatus, BorrowRecord, LibraryError,
    LibraryResult, Reader, Reservation,
};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::iter::Peekable;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File name of the data file inside the data directory
pub const DATA_FILE_NAME: &str = "library_data.lib";

const BOOKS_MARKER: &str = "#BOOKS";
const READERS_MARKER: &str = "#READERS";
const BORROWS_MARKER: &str = "#BORROWS";
const RESERVATIONS_MARKER: &str = "#RESERVATIONS";
const SETTINGS_MARKER: &str = "#SETTINGS";

const BOOK_FIELDS: usize = 7;
const READER_FIELDS: usize = 6;
const BORROW_FIELDS: usize = 5;
const RESERVATION_FIELDS: usize = 2;

/// Everything a data file holds, before it is applied to a [`LibraryState`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryContents {
    pub books: Vec<Book>,
    pub readers: Vec<Reader>,
    pub borrow_records: Vec<BorrowRecord>,
    pub reservations: Vec<Reservation>,
    pub custom_date: Option<NaiveDate>,
}

/// Returns the platform data directory for Libris
pub fn default_data_dir() -> LibraryResult<PathBuf> {
    ProjectDirs::from("", "", "libris")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            LibraryError::PathResolution("Could not determine user data directory".to_string())
        })
}

/// Returns `<data dir>/library_data.lib`
pub fn default_data_path() -> LibraryResult<PathBuf> {
    Ok(default_data_dir()?.join(DATA_FILE_NAME))
}

/// Renders the state in the data file format
pub fn encode(state: &LibraryState) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "{}", BOOKS_MARKER);
    let _ = writeln!(out, "{}", state.book_count());
    for book in state.books() {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{}",
            book.id,
            book.title,
            book.author,
            book.category.index(),
            book.total_copies(),
            book.available_copies(),
            book.status().index()
        );
    }

    let _ = writeln!(out, "{}", READERS_MARKER);
    let _ = writeln!(out, "{}", state.reader_count());
    for reader in state.readers() {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{}",
            reader.id,
            reader.name,
            reader.dept,
            reader.phone,
            format_date(reader.register_date),
            if reader.is_valid { 1 } else { 0 }
        );
    }

    let _ = writeln!(out, "{}", BORROWS_MARKER);
    let _ = writeln!(out, "{}", state.borrow_records().len());
    for record in state.borrow_records() {
        let _ = writeln!(
            out,
            "{},{},{},{},{}",
            record.reader_id(),
            record.book_id(),
            format_date(record.borrow_date()),
            format_date(record.due_date()),
            record.return_date().map(format_date).unwrap_or_default()
        );
    }

    let _ = writeln!(out, "{}", RESERVATIONS_MARKER);
    let _ = writeln!(out, "{}", state.reservations().len());
    for reservation in state.reservations() {
        let _ = writeln!(out, "{},{}", reservation.reader_id, reservation.book_id);
    }

    let _ = writeln!(out, "{}", SETTINGS_MARKER);
    match state.custom_date() {
        Some(date) => {
            let _ = writeln!(out, "1");
            let _ = writeln!(out, "{}", format_date(date));
        }
        None => {
            let _ = writeln!(out, "0");
        }
    }

    out
}

/// Parses data file text, skipping whatever cannot be read
pub fn decode(text: &str) -> LibraryContents {
    let mut contents = LibraryContents::default();
    let mut lines = text.lines().peekable();

    while let Some(line) = lines.next() {
        match line.trim() {
            "" => continue,
            BOOKS_MARKER => {
                for row in section_rows(&mut lines) {
                    match parse_book(row) {
                        Some(book) => contents.books.push(book),
                        None => log::warn!("Skipping malformed book row: {}", row),
                    }
                }
            }
            READERS_MARKER => {
                for row in section_rows(&mut lines) {
                    match parse_reader(row) {
                        Some(reader) => contents.readers.push(reader),
                        None => log::warn!("Skipping malformed reader row: {}", row),
                    }
                }
            }
            BORROWS_MARKER => {
                for row in section_rows(&mut lines) {
                    match parse_borrow_record(row) {
                        Some(record) => contents.borrow_records.push(record),
                        None => log::warn!("Skipping malformed borrow row: {}", row),
                    }
                }
            }
            RESERVATIONS_MARKER => {
                for row in section_rows(&mut lines) {
                    match parse_reservation(row) {
                        Some(reservation) => contents.reservations.push(reservation),
                        None => log::warn!("Skipping malformed reservation row: {}", row),
                    }
                }
            }
            SETTINGS_MARKER => {
                let enabled = lines
                    .next_if(|line| !is_marker(line))
                    .map(|flag| flag.trim() == "1")
                    .unwrap_or(false);
                if enabled {
                    contents.custom_date = lines
                        .next_if(|line| !is_marker(line))
                        .and_then(parse_date);
                }
            }
            other => log::debug!("Ignoring unexpected line: {}", other),
        }
    }

    contents
}

/// True only for the five section headers; ids may themselves start with `#`
fn is_marker(line: &str) -> bool {
    matches!(
        line.trim(),
        BOOKS_MARKER | READERS_MARKER | BORROWS_MARKER | RESERVATIONS_MARKER | SETTINGS_MARKER
    )
}

/// Reads a section's count line and yields up to that many rows.
///
/// Stops early at a section header so a short section cannot swallow it.
fn section_rows<'a, I>(lines: &mut Peekable<I>) -> Vec<&'a str>
where
    I: Iterator<Item = &'a str>,
{
    let count = lines
        .next_if(|line| !is_marker(line))
        .and_then(|line| line.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let mut rows = Vec::new();
    while rows.len() < count {
        match lines.next_if(|line| !is_marker(line)) {
            Some(row) => rows.push(row),
            None => break,
        }
    }
    rows
}

fn parse_count(field: &str) -> u32 {
    field.trim().parse().unwrap_or(0)
}

fn parse_book(row: &str) -> Option<Book> {
    let fields: Vec<&str> = row.split(',').collect();
    if fields.len() < BOOK_FIELDS {
        return None;
    }

    let category = fields[3]
        .trim()
        .parse::<u8>()
        .ok()
        .and_then(BookCategory::from_index)
        .unwrap_or(BookCategory::Other);

    let book = Book::new(
        fields[0],
        fields[1],
        fields[2],
        category,
        parse_count(fields[4]),
        parse_count(fields[5]),
    );

    let status = fields[6].trim().parse::<u8>().ok().and_then(BookStatus::from_index);
    Some(match status {
        Some(status) => book.with_status(status),
        None => book,
    })
}

fn parse_reader(row: &str) -> Option<Reader> {
    let fields: Vec<&str> = row.split(',').collect();
    if fields.len() < READER_FIELDS {
        return None;
    }

    let register_date = parse_date(fields[4])?;
    let mut reader = Reader::new(fields[0], fields[1], fields[2], fields[3], register_date);
    reader.is_valid = fields[5].trim() == "1";
    Some(reader)
}

fn parse_borrow_record(row: &str) -> Option<BorrowRecord> {
    let fields: Vec<&str> = row.split(',').collect();
    if fields.len() < BORROW_FIELDS {
        return None;
    }

    Some(BorrowRecord::from_parts(
        fields[0],
        fields[1],
        parse_date(fields[2])?,
        parse_date(fields[3])?,
        parse_date(fields[4]),
    ))
}

fn parse_reservation(row: &str) -> Option<Reservation> {
    let fields: Vec<&str> = row.split(',').collect();
    if fields.len() < RESERVATION_FIELDS {
        return None;
    }
    Some(Reservation::new(fields[0], fields[1]))
}

/// Writes `content` to `path` through a temporary file in the same directory
fn write_atomic(path: &Path, content: &str) -> LibraryResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| LibraryError::io(dir, e))?;
    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| LibraryError::io(path, e))?;
    temp_file.flush().map_err(|e| LibraryError::io(path, e))?;
    temp_file
        .persist(path)
        .map_err(|e| LibraryError::io(path, e.error))?;

    Ok(())
}

impl LibraryState {
    /// Saves the whole state to `path`; the state itself is not modified
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> LibraryResult<()> {
        let path = path.as_ref();
        write_atomic(path, &encode(self))?;
        log::info!("Library data saved to {}", path.display());
        Ok(())
    }

    /// Replaces the state with the contents of `path`.
    ///
    /// The file is read before anything is cleared, so an unreadable file
    /// leaves the state as it was.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> LibraryResult<()> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| LibraryError::io(path, e))?;
        self.apply_contents(decode(&text));
        log::info!("Library data loaded from {}", path.display());
        Ok(())
    }

    /// Saves to the default data path, creating its directory if needed
    pub fn save_to_default(&self) -> LibraryResult<PathBuf> {
        let path = default_data_path()?;
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| LibraryError::io(dir, e))?;
                log::info!("Created data directory: {}", dir.display());
            }
        }
        self.save_to_file(&path)?;
        Ok(path)
    }

    /// Loads from the default data path.
    ///
    /// Returns `Ok(false)` and leaves the state alone when no data file exists yet.
    pub fn load_from_default(&mut self) -> LibraryResult<bool> {
        let path = default_data_path()?;
        if !path.exists() {
            log::info!("No data file at {}, starting empty", path.display());
            return Ok(false);
        }
        self.load_from_file(&path)?;
        Ok(true)
    }

    /// Replaces the state with parsed file contents.
    ///
    /// Copy counts are reconciled with the open loans and reservations are
    /// re-applied to books with no copy on the shelf. Observers see a single
    /// change event.
    pub fn apply_contents(&mut self, contents: LibraryContents) {
        self.reset_contents();

        for book in contents.books {
            self.books.insert(book.id.clone(), book);
        }
        for reader in contents.readers {
            self.readers.insert(reader.id.clone(), reader);
        }

        let mut outstanding: BTreeMap<&str, u32> = BTreeMap::new();
        for record in contents.borrow_records.iter().filter(|r| !r.is_returned()) {
            *outstanding.entry(record.book_id()).or_insert(0) += 1;
        }
        for (book_id, open_loans) in outstanding {
            if let Some(book) = self.books.get_mut(book_id) {
                let on_shelf = book.total_copies().saturating_sub(open_loans);
                let available = book.available_copies().min(on_shelf);
                book.set_available_copies(available);
            }
        }
        self.borrow_records = contents.borrow_records;

        for reservation in &contents.reservations {
            if let Some(book) = self.books.get_mut(&reservation.book_id) {
                if book.available_copies() == 0 {
                    book.reserve();
                }
            }
        }
        self.reservations = contents.reservations;

        if let Some(date) = contents.custom_date {
            self.clock.set(date);
        }

        log::debug!(
            "Applied {} books, {} readers, {} records, {} reservations",
            self.books.len(),
            self.readers.len(),
            self.borrow_records.len(),
            self.reservations.len()
        );
        self.notify_changed();
    }
}
