//! Book domain model

use crate::types::common::{check_text_field, Validator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subject category of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BookCategory {
    Science,
    Technology,
    Literature,
    History,
    Art,
    Other,
}

impl BookCategory {
    /// Every category, in index order
    pub const ALL: [BookCategory; 6] = [
        BookCategory::Science,
        BookCategory::Technology,
        BookCategory::Literature,
        BookCategory::History,
        BookCategory::Art,
        BookCategory::Other,
    ];

    /// Stable index used by the data file
    pub fn index(self) -> u8 {
        match self {
            Self::Science => 0,
            Self::Technology => 1,
            Self::Literature => 2,
            Self::History => 3,
            Self::Art => 4,
            Self::Other => 5,
        }
    }

    /// Looks a category up by its data file index
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Human-readable name
    pub fn label(self) -> &'static str {
        match self {
            Self::Science => "Science",
            Self::Technology => "Technology",
            Self::Literature => "Literature",
            Self::History => "History",
            Self::Art => "Art",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for BookCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BookCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown category '{}'", wanted))
    }
}

/// Circulation status of a book.
///
/// This is a projection of the copy counts plus the reserved/lost markers;
/// [`Book`] recomputes it on every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookStatus {
    Available,
    Borrowed,
    Reserved,
    Lost,
}

impl BookStatus {
    /// Stable index used by the data file
    pub fn index(self) -> u8 {
        match self {
            Self::Available => 0,
            Self::Borrowed => 1,
            Self::Reserved => 2,
            Self::Lost => 3,
        }
    }

    /// Looks a status up by its data file index
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Available),
            1 => Some(Self::Borrowed),
            2 => Some(Self::Reserved),
            3 => Some(Self::Lost),
            _ => None,
        }
    }

    /// Human-readable name
    pub fn label(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Borrowed => "Borrowed",
            Self::Reserved => "Reserved",
            Self::Lost => "Lost",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A catalog entry with its copy counts.
///
/// Copy counts are private so that `available_copies <= total_copies`
/// holds for every value reachable through the API. For the same reason
/// there is no `Deserialize`: loading goes through [`Book::new`] and
/// [`Book::with_status`], which clamp and reconcile the stored values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub category: BookCategory,
    total_copies: u32,
    available_copies: u32,
    status: BookStatus,
}

impl Book {
    /// Creates a book; `available_copies` is clamped to `total_copies`
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        category: BookCategory,
        total_copies: u32,
        available_copies: u32,
    ) -> Self {
        let available_copies = available_copies.min(total_copies);
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            category,
            total_copies,
            available_copies,
            status: Self::status_for(available_copies),
        }
    }

    /// Applies a stored status, keeping it only where the counts allow it
    pub fn with_status(mut self, status: BookStatus) -> Self {
        self.status = status;
        self.refresh_status();
        self
    }

    pub fn total_copies(&self) -> u32 {
        self.total_copies
    }

    pub fn available_copies(&self) -> u32 {
        self.available_copies
    }

    /// Copies currently out on loan
    pub fn borrowed_copies(&self) -> u32 {
        self.total_copies - self.available_copies
    }

    pub fn status(&self) -> BookStatus {
        self.status
    }

    /// Sets the total number of copies, shrinking the available count if needed
    pub fn set_total_copies(&mut self, total: u32) {
        self.total_copies = total;
        self.available_copies = self.available_copies.min(total);
        self.refresh_status();
    }

    /// Sets the available number of copies, clamped to the total
    pub fn set_available_copies(&mut self, available: u32) {
        self.available_copies = available.min(self.total_copies);
        self.refresh_status();
    }

    /// Flags the book as lost; cleared by the next borrow or return
    pub fn mark_lost(&mut self) {
        self.status = BookStatus::Lost;
    }

    /// Takes one copy off the shelf
    ///
    /// Returns false when no copy is available.
    pub fn borrow_copy(&mut self) -> bool {
        if self.available_copies == 0 {
            return false;
        }
        self.available_copies -= 1;
        self.status = Self::status_for(self.available_copies);
        true
    }

    /// Puts one copy back on the shelf
    ///
    /// Returns false when every copy is already in.
    pub fn return_copy(&mut self) -> bool {
        if self.available_copies >= self.total_copies {
            return false;
        }
        self.available_copies += 1;
        self.status = BookStatus::Available;
        true
    }

    /// Marks the book as reserved
    ///
    /// Only possible while no copy is available and the book is not reserved yet.
    pub fn reserve(&mut self) -> bool {
        if self.available_copies == 0 && self.status != BookStatus::Reserved {
            self.status = BookStatus::Reserved;
            true
        } else {
            false
        }
    }

    fn status_for(available_copies: u32) -> BookStatus {
        if available_copies > 0 {
            BookStatus::Available
        } else {
            BookStatus::Borrowed
        }
    }

    fn refresh_status(&mut self) {
        self.status = match self.status {
            BookStatus::Lost => BookStatus::Lost,
            BookStatus::Reserved if self.available_copies == 0 => BookStatus::Reserved,
            _ => Self::status_for(self.available_copies),
        };
    }
}

impl Validator for Book {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        check_text_field(&mut errors, "Book ID", &self.id, true);
        check_text_field(&mut errors, "Title", &self.title, true);
        check_text_field(&mut errors, "Author", &self.author, false);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
