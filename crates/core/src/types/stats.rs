//! Library statistics

use crate::types::BookCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Library-wide statistics.
///
/// Copy counts are sums over the catalog, not counts of loan records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryStats {
    pub total_copies: u64,
    pub available_copies: u64,
    pub borrowed_copies: u64,
    /// Total copies per category; every category is present
    pub category_totals: BTreeMap<BookCategory, u64>,
    /// Number of categories holding at least one copy
    pub categories_in_use: usize,
    pub reader_count: usize,
}

impl LibraryStats {
    /// Creates empty statistics
    pub fn empty() -> Self {
        Self {
            total_copies: 0,
            available_copies: 0,
            borrowed_copies: 0,
            category_totals: BookCategory::ALL.iter().map(|c| (*c, 0)).collect(),
            categories_in_use: 0,
            reader_count: 0,
        }
    }

    /// Copies held in `category`
    pub fn copies_in(&self, category: BookCategory) -> u64 {
        self.category_totals.get(&category).copied().unwrap_or(0)
    }

    /// Returns the percentage of copies currently on the shelf
    pub fn available_percentage(&self) -> f64 {
        if self.total_copies == 0 {
            return 0.0;
        }
        (self.available_copies as f64 / self.total_copies as f64) * 100.0
    }

    /// Returns the percentage of copies currently on loan
    pub fn borrowed_percentage(&self) -> f64 {
        if self.total_copies == 0 {
            return 0.0;
        }
        (self.borrowed_copies as f64 / self.total_copies as f64) * 100.0
    }
}

impl Default for LibraryStats {
    fn default() -> Self {
        Self::empty()
    }
}
