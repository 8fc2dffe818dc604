//! Catalog search criteria

use libris_core::{Book, BookCategory};

/// Filter for [`crate::LibraryState::search_books`].
///
/// An empty keyword matches every book; `category: None` means any category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookQuery {
    pub keyword: String,
    pub category: Option<BookCategory>,
    pub by_title: bool,
    pub by_author: bool,
}

impl Default for BookQuery {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            category: None,
            by_title: true,
            by_author: true,
        }
    }
}

impl BookQuery {
    /// Matches `keyword` against title and author
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: BookCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn title_only(mut self) -> Self {
        self.by_title = true;
        self.by_author = false;
        self
    }

    pub fn author_only(mut self) -> Self {
        self.by_title = false;
        self.by_author = true;
        self
    }

    pub fn matches(&self, book: &Book) -> bool {
        if let Some(category) = self.category {
            if book.category != category {
                return false;
            }
        }

        if self.keyword.is_empty() {
            return true;
        }

        let needle = self.keyword.to_lowercase();
        (self.by_title && book.title.to_lowercase().contains(&needle))
            || (self.by_author && book.author.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str, author: &str, category: BookCategory) -> Book {
        Book::new("B1", title, author, category, 1, 1)
    }

    #[test]
    fn test_default_matches_everything() {
        let query = BookQuery::default();
        assert!(query.matches(&book("Dune", "Herbert", BookCategory::Literature)));
        assert!(query.matches(&book("SICP", "Abelson", BookCategory::Technology)));
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        let query = BookQuery::keyword("dUnE");
        assert!(query.matches(&book("Dune Messiah", "Herbert", BookCategory::Literature)));
        assert!(!query.matches(&book("Foundation", "Asimov", BookCategory::Literature)));
    }

    #[test]
    fn test_title_and_author_switches() {
        let b = book("Cosmos", "Carl Sagan", BookCategory::Science);

        assert!(BookQuery::keyword("sagan").matches(&b));
        assert!(!BookQuery::keyword("sagan").title_only().matches(&b));
        assert!(BookQuery::keyword("sagan").author_only().matches(&b));
        assert!(!BookQuery::keyword("cosmos").author_only().matches(&b));
    }

    #[test]
    fn test_category_filter() {
        let science = book("Cosmos", "Sagan", BookCategory::Science);
        let other = book("Cosmos", "Sagan", BookCategory::Other);

        let query = BookQuery::default().with_category(BookCategory::Other);
        assert!(!query.matches(&science));
        assert!(query.matches(&other));

        let query = BookQuery::keyword("cos").with_category(BookCategory::Science);
        assert!(query.matches(&science));
        assert!(!query.matches(&other));
    }

    #[test]
    fn test_neither_field_selected_matches_nothing_with_keyword() {
        let query = BookQuery {
            keyword: "dune".to_string(),
            by_title: false,
            by_author: false,
            ..Default::default()
        };
        assert!(!query.matches(&book("Dune", "Herbert", BookCategory::Literature)));
    }
}
